//! Plan execution - effectful operations
//!
//! Applies a sync plan one action at a time, strictly in order; each
//! action's result is observed before the next is attempted because later
//! actions depend on earlier ones (a PR cannot target a base branch that
//! has not landed yet). Transient failures are retried with backoff; a
//! non-transient failure stops the run and the report says exactly how far
//! it got, so a re-run converges from there.

use crate::error::{Error, Result};
use crate::git::RefPusher;
use crate::platform::HostingService;
use crate::sync::plan::SyncPlan;
use crate::types::ChainAction;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry attempts per action for transient failures
const MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay; doubled per attempt
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// What happened during execution
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Actions applied successfully, in order
    pub applied: Vec<ChainAction>,
    /// Sha the host reported for a merged PR, if the plan merged one
    pub merge_sha: Option<String>,
    /// The action that failed, with its error, if any
    pub failed: Option<(ChainAction, Error)>,
}

impl ExecutionReport {
    /// Whether every planned action was applied
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }

    /// Convert a partial failure into the error the caller surfaces.
    /// Re-running `push` after fixing the cause converges; every action is
    /// idempotent with respect to the reconciler's diff.
    pub fn into_result(mut self) -> Result<Self> {
        match self.failed.take() {
            None => Ok(self),
            Some((action, error)) => Err(Error::Execution {
                action: action.to_string(),
                message: format!(
                    "{error} ({} action(s) were applied before the failure)",
                    self.applied.len()
                ),
            }),
        }
    }
}

/// Execute the plan (EFFECTFUL).
///
/// Branch pushes go through the `RefPusher` capability; everything else
/// through the hosting service.
pub async fn execute_plan(
    plan: &SyncPlan,
    pusher: &dyn RefPusher,
    host: &dyn HostingService,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for action in &plan.actions {
        match apply_with_retry(action, pusher, host).await {
            Ok(sha) => {
                debug!(%action, "applied");
                if sha.is_some() {
                    report.merge_sha = sha;
                }
                report.applied.push(action.clone());
            }
            Err(e) => {
                report.failed = Some((action.clone(), e));
                break;
            }
        }
    }

    report
}

async fn apply_with_retry(
    action: &ChainAction,
    pusher: &dyn RefPusher,
    host: &dyn HostingService,
) -> Result<Option<String>> {
    let mut attempt = 1;
    loop {
        match apply(action, pusher, host).await {
            Ok(sha) => return Ok(sha),
            Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                let delay = BACKOFF_BASE * 2u32.pow(attempt - 1);
                warn!(%action, attempt, error = %e, "transient failure, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Apply one action. Returns the merge sha for a merge action, None
/// otherwise.
async fn apply(
    action: &ChainAction,
    pusher: &dyn RefPusher,
    host: &dyn HostingService,
) -> Result<Option<String>> {
    match action {
        ChainAction::CreateBranch { branch, sha }
        | ChainAction::ForcePushBranch { branch, sha } => {
            pusher.force_push(branch, sha)?;
            Ok(None)
        }
        ChainAction::CreatePullRequest {
            branch,
            base,
            title,
        } => {
            let pr = host.create_pr(branch, base, title).await?;
            debug!(branch, number = pr.number, url = %pr.html_url, "created PR");
            Ok(None)
        }
        ChainAction::UpdatePullRequestBase { number, base, .. } => {
            host.update_pr_base(*number, base).await?;
            Ok(None)
        }
        ChainAction::UpdatePullRequestBody { number, body, .. } => {
            host.update_pr_body(*number, body).await?;
            Ok(None)
        }
        ChainAction::MergePullRequest { number, method, .. } => {
            let result = host.merge_pr(*number, *method).await?;
            if result.merged {
                Ok(result.sha)
            } else {
                Err(Error::MergeRejected(
                    result
                        .message
                        .unwrap_or_else(|| format!("PR #{number} was not merged")),
                ))
            }
        }
    }
}
