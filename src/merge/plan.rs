//! Cascade planning - pure functions for retiring the front link
//!
//! No I/O happens here - all data is passed in, making it easy to unit
//! test. The front link is the one whose PR base is the tracked upstream;
//! merging anything else first would land commits into a feature branch.

use crate::error::{Error, Result};
use crate::sync::RemoteState;
use crate::types::{Chain, ChainAction, MergeMethod};

/// The PR being retired by this cascade pass
#[derive(Debug, Clone)]
pub struct CascadeTarget {
    /// Remote branch of the link being merged
    pub branch: String,
    /// Its PR number
    pub number: u64,
    /// Its PR title (for display)
    pub title: String,
    /// Merge method to use
    pub method: MergeMethod,
}

/// One cascade pass: merge the front link, then retarget its dependents
#[derive(Debug, Clone)]
pub struct CascadePlan {
    /// The PR to merge
    pub target: CascadeTarget,
    /// Base the merged link pointed to; dependents move here
    pub new_base: String,
    /// Base updates for downstream PRs, applied only after a confirmed merge
    pub retargets: Vec<ChainAction>,
}

/// Plan one cascade pass (PURE - no I/O).
///
/// Errors if the chain is empty, the front link has no open PR, or the
/// front link's PR does not actually target the upstream branch (the chain
/// is not converged; run push first).
pub fn plan_cascade(
    chain: &Chain,
    remote: &RemoteState,
    method: MergeMethod,
) -> Result<CascadePlan> {
    let front = chain
        .links
        .first()
        .ok_or_else(|| Error::Config("no links in chain; nothing to merge".to_string()))?;

    let pr = remote.link(&front.branch).pr.ok_or_else(|| {
        Error::PlanConflict(format!(
            "no open PR for front link {}; run `git-pr-chain push` first",
            front.branch
        ))
    })?;

    if pr.base_ref != chain.upstream.branch {
        return Err(Error::PlanConflict(format!(
            "PR #{} for {} targets {} instead of the upstream {}; \
             run `git-pr-chain push` first to converge the chain",
            pr.number, front.branch, pr.base_ref, chain.upstream.branch
        )));
    }

    // Once the front link lands, its branch disappears from the dependency
    // chain; every PR that targeted it moves to the base it pointed to.
    let mut retargets = Vec::new();
    for link in &chain.links[1..] {
        if let Some(dep_pr) = remote.link(&link.branch).pr {
            if dep_pr.base_ref == front.branch {
                retargets.push(ChainAction::UpdatePullRequestBase {
                    branch: link.branch.clone(),
                    number: dep_pr.number,
                    base: pr.base_ref.clone(),
                });
            }
        }
    }

    Ok(CascadePlan {
        target: CascadeTarget {
            branch: front.branch.clone(),
            number: pr.number,
            title: pr.title,
            method,
        },
        new_base: pr.base_ref,
        retargets,
    })
}
