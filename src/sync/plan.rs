//! Chain reconciliation - pure functions for creating sync plans
//!
//! Diffs the desired chain against the fetched remote state and produces an
//! ordered action plan. No I/O happens here - all data is passed in, making
//! it easy to unit test. The plan is strictly ordered front-to-back: a
//! link's base branch must exist on the remote before anything referencing
//! it is applied, so the executor must not reorder or parallelize it.

use crate::error::{Error, Result};
use crate::sync::body::{patch_body, render_section};
use crate::sync::fetch::RemoteState;
use crate::types::{Chain, ChainAction, PullRequest};
use std::collections::HashMap;

/// Options for reconciliation
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Overwrite remote branches that we have no record of managing
    pub force: bool,
}

/// The reconciler's output: ordered actions plus informational notices
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    /// Actions to apply, strictly in order
    pub actions: Vec<ChainAction>,
    /// Orphaned remote links and similar non-actionable findings
    pub notices: Vec<String>,
}

impl SyncPlan {
    /// Whether there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Count of branch pushes (create + force)
    pub fn count_pushes(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| {
                matches!(
                    a,
                    ChainAction::CreateBranch { .. } | ChainAction::ForcePushBranch { .. }
                )
            })
            .count()
    }

    /// Count of PR creations
    pub fn count_creates(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, ChainAction::CreatePullRequest { .. }))
            .count()
    }

    /// Count of PR base/body updates
    pub fn count_updates(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| {
                matches!(
                    a,
                    ChainAction::UpdatePullRequestBase { .. }
                        | ChainAction::UpdatePullRequestBody { .. }
                )
            })
            .count()
    }
}

/// Reconcile branches, PR existence, and PR bases (PURE - no I/O).
///
/// Bodies are planned separately by [`plan_bodies`] once every PR in the
/// chain has a number; a freshly created PR's number cannot appear in a
/// body computed before it exists.
pub fn plan_refs(chain: &Chain, remote: &RemoteState, options: SyncOptions) -> Result<SyncPlan> {
    let mut plan = SyncPlan::default();

    // Reorder guard: if PR bases describe a different ordering than the
    // chain, force-pushing can make the host close PRs as emptied. Park the
    // affected PRs on the upstream branch first; their real base is restored
    // further down.
    let mut parked: HashMap<u64, String> = HashMap::new();
    for (number, branch) in reorder_cycle_prs(chain, remote) {
        plan.actions.push(ChainAction::UpdatePullRequestBase {
            branch,
            number,
            base: chain.upstream.branch.clone(),
        });
        parked.insert(number, chain.upstream.branch.clone());
    }

    for link in &chain.links {
        let remote_link = remote.link(&link.branch);

        match remote_link.branch_head.as_deref() {
            None => {
                plan.actions.push(ChainAction::CreateBranch {
                    branch: link.branch.clone(),
                    sha: link.tip().to_string(),
                });
            }
            Some(head) if head != link.tip() => {
                // A diverged branch we have no PR for is not explainable by
                // this chain; someone else may own it.
                if remote_link.pr.is_none() && !options.force {
                    return Err(Error::PlanConflict(format!(
                        "remote branch {} exists at {head} but has no open PR managed \
                         by git-pr-chain; refusing to overwrite it (re-run with --force \
                         to take it over)",
                        link.branch
                    )));
                }
                plan.actions.push(ChainAction::ForcePushBranch {
                    branch: link.branch.clone(),
                    sha: link.tip().to_string(),
                });
            }
            Some(_) => {} // tip already matches
        }

        let desired_base = chain.base_for(link.position);
        match &remote_link.pr {
            None => {
                plan.actions.push(ChainAction::CreatePullRequest {
                    branch: link.branch.clone(),
                    base: desired_base.to_string(),
                    title: link.commits[0].subject().to_string(),
                });
            }
            Some(pr) => {
                let current_base = parked
                    .get(&pr.number)
                    .map_or(pr.base_ref.as_str(), String::as_str);
                if current_base != desired_base {
                    plan.actions.push(ChainAction::UpdatePullRequestBase {
                        branch: link.branch.clone(),
                        number: pr.number,
                        base: desired_base.to_string(),
                    });
                }
            }
        }
    }

    for orphan in &remote.orphans {
        plan.notices.push(format!(
            "PR #{} ({}) has no local link anymore; close it manually if it is obsolete: {}",
            orphan.number, orphan.head_ref, orphan.html_url
        ));
    }

    Ok(plan)
}

/// PRs participating in a base-ordering cycle, in chain order.
///
/// Walks links front-to-back tracking branches seen so far; a PR whose
/// recorded base points back at a non-adjacent earlier branch means the
/// chain was reordered, and every PR between that base and here (plus this
/// one) must be parked on upstream before the force pushes.
fn reorder_cycle_prs(chain: &Chain, remote: &RemoteState) -> Vec<(u64, String)> {
    let mut seen: Vec<&str> = Vec::new();
    let mut to_park: Vec<(u64, String)> = Vec::new();

    for link in &chain.links {
        let Some(pr) = remote.link(&link.branch).pr else {
            continue;
        };

        if let Some(idx) = seen.iter().position(|b| *b == pr.base_ref) {
            if idx != seen.len().saturating_sub(1) {
                for later in &seen[idx + 1..] {
                    if let Some(later_pr) = remote.link(later).pr {
                        if later_pr.base_ref != chain.upstream.branch {
                            to_park.push((later_pr.number, (*later).to_string()));
                        }
                    }
                }
                if pr.base_ref != chain.upstream.branch {
                    to_park.push((pr.number, link.branch.clone()));
                }
            }
        }
        seen.push(&link.branch);
    }

    to_park.sort_by_key(|(number, _)| *number);
    to_park.dedup();
    to_park
}

/// Plan description updates (PURE - no I/O).
///
/// Emits `UpdatePullRequestBody` only where the patched body differs from
/// the current one, so a converged chain yields an empty plan. Re-emitting
/// an identical body would still be convergent; the diff is an efficiency,
/// not a correctness requirement.
pub fn plan_bodies(chain: &Chain, prs: &HashMap<String, PullRequest>) -> Result<SyncPlan> {
    let mut plan = SyncPlan::default();

    for link in &chain.links {
        let pr = prs.get(&link.branch).ok_or_else(|| {
            Error::Internal(format!(
                "no open PR for branch {} while planning descriptions",
                link.branch
            ))
        })?;

        let section = render_section(chain, link, prs)?;
        let current = pr.body.clone().unwrap_or_default();
        let patched = patch_body(&current, &section);

        if patched != current {
            plan.actions.push(ChainAction::UpdatePullRequestBody {
                branch: link.branch.clone(),
                number: pr.number,
                body: patched,
            });
        }
    }

    Ok(plan)
}
