//! Push command - run the fetch/reconcile/execute pipeline

use crate::cli::context::CommandContext;
use crate::cli::style::{check, Stylize};
use anstream::println;
use git_pr_chain::error::Result;
use git_pr_chain::sync::{preview_push, run_push, SyncOptions, SyncPlan};
use std::path::Path;

/// Options for the push command
#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    /// Show the plan without making changes
    pub dry_run: bool,
    /// Overwrite remote branches we have no record of managing
    pub force: bool,
}

/// Run the push command
pub async fn run_push_cmd(path: &Path, options: PushOptions) -> Result<()> {
    let ctx = CommandContext::new(path)?;
    let chain = ctx.build_chain()?;

    if chain.links.is_empty() {
        println!(
            "{}",
            "No chain links to push. Annotate commits with \
             \"git-pr-chain: <name>\" first."
                .muted()
        );
        return Ok(());
    }

    let ctx = ctx.with_platform()?;
    let sync_options = SyncOptions {
        force: options.force,
    };

    if options.dry_run {
        let plan = preview_push(&chain, ctx.platform.as_ref(), sync_options).await?;
        report_dry_run(&plan);
        return Ok(());
    }

    println!(
        "{} {} link(s) to {}",
        "Pushing".emphasis(),
        chain.links.len().accent(),
        chain.upstream.accent()
    );

    let outcome = run_push(&chain, &ctx.pusher, ctx.platform.as_ref(), sync_options).await?;

    for notice in &outcome.notices {
        println!("{}", notice.warn());
    }

    println!();
    if outcome.is_noop() {
        println!("{}", "Already in sync; nothing to do.".muted());
    } else {
        println!(
            "{} {} action(s) applied, {} description(s) updated",
            format!("{} Push complete:", check()).success(),
            outcome.refs.applied.len().accent(),
            outcome.bodies.applied.len().accent()
        );
    }

    Ok(())
}

/// Report what would be done (dry run). Descriptions are not previewed:
/// they reference PR numbers that may not exist yet.
fn report_dry_run(plan: &SyncPlan) {
    println!("{}:", "Push plan".emphasis());
    println!();

    if plan.is_empty() {
        println!("  {}", "Already in sync".muted());
    } else {
        for action in &plan.actions {
            println!("  {} {action}", "\u{2192}".accent());
        }
    }

    for notice in &plan.notices {
        println!("  {}", notice.warn());
    }

    println!();
    println!("{}", "Run without --dry-run to execute.".muted());
}
