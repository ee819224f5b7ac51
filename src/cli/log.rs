//! Log command - print the parsed chain

use crate::cli::context::CommandContext;
use crate::cli::style::Stylize;
use anstream::println;
use git_pr_chain::error::Result;
use git_pr_chain::types::Commit;
use std::path::Path;

/// Run the log command
pub fn run_log(path: &Path) -> Result<()> {
    let ctx = CommandContext::new(path)?;
    let chain = ctx.build_chain()?;

    let total: usize =
        chain.links.iter().map(|l| l.commits.len()).sum::<usize>() + chain.stopped.len();
    if total == 0 {
        println!(
            "{}",
            "No commits in branch. Is the upstream branch set correctly \
             (git branch --set-upstream-to)?"
                .muted()
        );
        return Ok(());
    }

    println!(
        "Current branch is downstream from {}, {} commit(s) ahead.\n",
        chain.upstream.accent(),
        total
    );

    for link in &chain.links {
        println!("{} {}", "Github branch".emphasis(), link.branch.accent());
        for commit in &link.commits {
            print_shortdesc(commit);
        }
    }

    if !chain.stopped.is_empty() {
        println!(
            "{}",
            "Will not be pushed; remove git-pr-chain: STOP to push.".warn()
        );
        for commit in &chain.stopped {
            print_shortdesc(commit);
        }
    }

    Ok(())
}

fn print_shortdesc(commit: &Commit) {
    println!("  {} {}", commit.short_sha().muted(), commit.subject());
}
