//! CLI surface: argument parsing and command dispatch

mod annotate;
mod context;
mod log;
mod merge;
mod push;
mod style;

use clap::{Parser, Subcommand, ValueEnum};
use git_pr_chain::error::Result;
use git_pr_chain::types::MergeMethod;
use std::path::PathBuf;

/// Manage chains of dependent GitHub pull requests
#[derive(Debug, Parser)]
#[command(name = "git-pr-chain", version, about)]
pub struct Cli {
    /// Repository path (defaults to the current directory)
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Show what would be done without making changes
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

/// CLI merge method choices
#[derive(Debug, Clone, Copy, ValueEnum)]
enum MergeMethodArg {
    /// Create a merge commit
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto the base branch
    Rebase,
}

impl From<MergeMethodArg> for MergeMethod {
    fn from(arg: MergeMethodArg) -> Self {
        match arg {
            MergeMethodArg::Merge => Self::Merge,
            MergeMethodArg::Squash => Self::Squash,
            MergeMethodArg::Rebase => Self::Rebase,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List commits in the chain
    Log,
    /// Annotate HEAD with a fresh link name
    New {
        /// Link (branch) name for the new link
        name: String,
    },
    /// Append a STOP marker so HEAD and later commits stay local
    EndChain,
    /// Create and update chain branches and PRs on GitHub
    Push {
        /// Overwrite remote branches we have no record of managing
        #[arg(long)]
        force: bool,
    },
    /// Merge the front PR of the chain and retarget its dependents
    Merge {
        /// Merge method
        #[arg(long, value_enum, default_value_t = MergeMethodArg::Merge)]
        method: MergeMethodArg,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Don't pull after a successful merge
        #[arg(long)]
        no_pull: bool,
    },
}

impl Cli {
    /// Whether verbose logging was requested
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Dispatch the parsed command
    pub async fn run(self) -> Result<()> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        match self.command {
            Commands::Log => log::run_log(&path),
            Commands::New { ref name } => annotate::run_new(&path, name),
            Commands::EndChain => annotate::run_end_chain(&path),
            Commands::Push { force } => {
                push::run_push_cmd(
                    &path,
                    push::PushOptions {
                        dry_run: self.dry_run,
                        force,
                    },
                )
                .await
            }
            Commands::Merge {
                method,
                yes,
                no_pull,
            } => {
                merge::run_merge_cmd(
                    &path,
                    merge::MergeOptions {
                        method: method.into(),
                        dry_run: self.dry_run,
                        yes,
                        no_pull,
                    },
                )
                .await
            }
        }
    }
}
