//! Merge command - retire the front link(s) and cascade

use crate::cli::context::CommandContext;
use crate::cli::style::{check, Stylize};
use anstream::println;
use dialoguer::Confirm;
use git_pr_chain::error::{Error, Result};
use git_pr_chain::merge::{execute_cascade, plan_cascade};
use git_pr_chain::sync::{fetch_remote_state, run_push, SyncOptions};
use git_pr_chain::types::MergeMethod;
use std::path::Path;

/// Options for the merge command
#[derive(Debug, Clone, Copy)]
pub struct MergeOptions {
    /// Merge method to use
    pub method: MergeMethod,
    /// Show what would be merged without making changes
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub yes: bool,
    /// Don't pull/rebase after a successful merge
    pub no_pull: bool,
}

/// Run the merge command
pub async fn run_merge_cmd(path: &Path, options: MergeOptions) -> Result<()> {
    let ctx = CommandContext::new(path)?;
    let chain = ctx.build_chain()?;

    if chain.links.is_empty() {
        return Err(Error::Config("no chain links; nothing to merge".to_string()));
    }

    let ctx = ctx.with_platform()?;

    // Converge first. Without this, bases may be stale and we could merge
    // into the previous feature branch instead of the upstream.
    if !options.dry_run {
        run_push(
            &chain,
            &ctx.pusher,
            ctx.platform.as_ref(),
            SyncOptions::default(),
        )
        .await?;
    }

    let remote = fetch_remote_state(&chain, ctx.platform.as_ref()).await?;
    let plan = plan_cascade(&chain, &remote, options.method)?;

    println!(
        "Will merge PR {} ({}) with method {}",
        format!("#{}", plan.target.number).accent(),
        plan.target.title,
        plan.target.method.accent()
    );
    let front = &chain.links[0];
    for commit in &front.commits {
        println!("  {} {}", commit.short_sha().muted(), commit.subject());
    }

    if options.dry_run {
        println!("{}", "Dry run: not merging.".muted());
        return Ok(());
    }

    if !options.yes {
        let proceed = Confirm::new()
            .with_prompt("Continue?")
            .default(false)
            .interact()
            .map_err(|e| Error::Internal(format!("failed to read confirmation: {e}")))?;
        if !proceed {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
    }

    let outcome = execute_cascade(&plan, &ctx.pusher, ctx.platform.as_ref()).await?;

    println!(
        "{} Merged {}{}",
        check().success(),
        outcome.merged_branch.accent(),
        outcome
            .merge_sha
            .as_deref()
            .map(|sha| format!(" ({})", &sha[..sha.len().min(12)]))
            .unwrap_or_default()
    );
    for (number, base) in &outcome.retargeted {
        println!("  retargeted PR #{number} onto {}", base.accent());
    }

    if options.no_pull {
        println!(
            "{}",
            "Skipping pull; run `git pull --rebase` and `git-pr-chain push` \
             to refresh the remaining chain."
                .muted()
        );
        return Ok(());
    }

    // Pull the merged changes, then re-sync the shortened chain so
    // descriptions stop referencing the retired link.
    println!("Pulling merged changes...");
    ctx.local.repo.pull_rebase(&chain.upstream)?;

    let chain = ctx.local.build_chain()?;
    if chain.links.is_empty() {
        println!("{}", "Chain fully merged.".success());
        return Ok(());
    }

    println!("Updating remaining PRs...");
    run_push(
        &chain,
        &ctx.pusher,
        ctx.platform.as_ref(),
        SyncOptions::default(),
    )
    .await?;

    println!("{} Merge complete", check().success());
    Ok(())
}
