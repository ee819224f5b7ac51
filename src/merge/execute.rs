//! Cascade execution - effectful operations
//!
//! Drives one cascade pass through its states:
//! `Pending -> Merging -> Cascading -> Done`, handing each phase to the plan
//! executor so the merge and the retargets get the same bounded transient
//! retry as every other mutating action. A refused merge aborts before any
//! cascade mutation, so the remote is untouched and the attempt can be
//! retried. Retargets only run after the merge is confirmed.

use crate::error::Result;
use crate::git::RefPusher;
use crate::merge::plan::CascadePlan;
use crate::platform::HostingService;
use crate::sync::{execute_plan, SyncPlan};
use crate::types::ChainAction;
use tracing::debug;

/// Cascade state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    /// Nothing done yet
    Pending,
    /// Merge request issued, awaiting confirmation
    Merging,
    /// Merge confirmed; retargeting downstream PRs
    Cascading,
    /// Pass complete
    Done,
}

/// Result of one cascade pass
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    /// Branch of the merged link
    pub merged_branch: String,
    /// Sha of the merge commit, if the host reported one
    pub merge_sha: Option<String>,
    /// Downstream PRs retargeted, as (number, new base)
    pub retargeted: Vec<(u64, String)>,
}

/// Execute a cascade pass (EFFECTFUL).
///
/// If the merge call fails or the host reports the PR as not merged, the
/// error propagates with no retargets applied. A retarget failure after a
/// confirmed merge also propagates; a subsequent push converges the
/// remaining bases.
pub async fn execute_cascade(
    plan: &CascadePlan,
    pusher: &dyn RefPusher,
    host: &dyn HostingService,
) -> Result<CascadeOutcome> {
    debug!(state = ?CascadeState::Merging, branch = %plan.target.branch, number = plan.target.number, "merging");
    let merge_plan = SyncPlan {
        actions: vec![ChainAction::MergePullRequest {
            branch: plan.target.branch.clone(),
            number: plan.target.number,
            method: plan.target.method,
        }],
        notices: Vec::new(),
    };
    let mut report = execute_plan(&merge_plan, pusher, host).await;
    if let Some((_, error)) = report.failed.take() {
        // Nothing after the merge ran; the remote is untouched.
        return Err(error);
    }
    let merge_sha = report.merge_sha.take();

    debug!(state = ?CascadeState::Cascading, retargets = plan.retargets.len(), "cascading");
    let retarget_plan = SyncPlan {
        actions: plan.retargets.clone(),
        notices: Vec::new(),
    };
    let mut report = execute_plan(&retarget_plan, pusher, host).await;
    if let Some((_, error)) = report.failed.take() {
        return Err(error);
    }
    let retargeted = report
        .applied
        .iter()
        .filter_map(|action| match action {
            ChainAction::UpdatePullRequestBase { number, base, .. } => {
                Some((*number, base.clone()))
            }
            _ => None,
        })
        .collect();

    debug!(state = ?CascadeState::Done, branch = %plan.target.branch, "cascade complete");
    Ok(CascadeOutcome {
        merged_branch: plan.target.branch.clone(),
        merge_sha,
        retargeted,
    })
}
