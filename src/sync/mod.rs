//! The push pipeline: fetch remote state, reconcile, execute
//!
//! Two reconcile passes. The first converges branches, PR existence, and PR
//! bases; the second patches descriptions, which can only be rendered once
//! every PR in the chain has a number.

pub mod body;
mod execute;
mod fetch;
mod plan;

pub use body::{patch_body, render_section};
pub use execute::{execute_plan, ExecutionReport};
pub use fetch::{fetch_remote_state, RemoteState};
pub use plan::{plan_bodies, plan_refs, SyncOptions, SyncPlan};

use crate::error::Result;
use crate::git::RefPusher;
use crate::platform::HostingService;
use crate::types::Chain;
use tracing::debug;

/// Outcome of a full push run
#[derive(Debug, Default)]
pub struct PushOutcome {
    /// Report from the branch/PR/base pass
    pub refs: ExecutionReport,
    /// Report from the description pass
    pub bodies: ExecutionReport,
    /// Informational notices (orphaned remote links)
    pub notices: Vec<String>,
}

impl PushOutcome {
    /// Whether the run changed nothing (the chain was already converged)
    pub fn is_noop(&self) -> bool {
        self.refs.applied.is_empty() && self.bodies.applied.is_empty()
    }
}

/// Run the full push pipeline: fetch, reconcile refs, execute, then
/// reconcile and patch descriptions.
///
/// Any execution failure is surfaced with exact partial progress; a re-run
/// after fixing the cause converges.
pub async fn run_push(
    chain: &Chain,
    pusher: &dyn RefPusher,
    host: &dyn HostingService,
    options: SyncOptions,
) -> Result<PushOutcome> {
    let remote = fetch_remote_state(chain, host).await?;
    let ref_plan = plan_refs(chain, &remote, options)?;
    debug!(actions = ref_plan.actions.len(), "ref plan computed");

    let refs = execute_plan(&ref_plan, pusher, host).await.into_result()?;

    // Re-fetch so freshly created PRs (and their numbers) are visible to the
    // description pass.
    let remote = fetch_remote_state(chain, host).await?;
    let body_plan = plan_bodies(chain, &remote.prs_by_branch())?;
    debug!(actions = body_plan.actions.len(), "body plan computed");

    let bodies = execute_plan(&body_plan, pusher, host).await.into_result()?;

    Ok(PushOutcome {
        refs,
        bodies,
        notices: ref_plan.notices,
    })
}

/// Compute the first-pass plan without mutating anything (dry run)
pub async fn preview_push(
    chain: &Chain,
    host: &dyn HostingService,
    options: SyncOptions,
) -> Result<SyncPlan> {
    let remote = fetch_remote_state(chain, host).await?;
    plan_refs(chain, &remote, options)
}
