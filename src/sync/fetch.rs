//! Remote state fetching
//!
//! Gathers everything the reconciler needs in one pass, before any mutation:
//! per-link branch heads and open PRs, plus orphaned PRs left behind by
//! removed or renamed links. A fetch failure aborts the whole operation so
//! we never reconcile against partial state.

use crate::error::{Error, Result};
use crate::platform::HostingService;
use crate::sync::body::OPEN_MARKER;
use crate::types::{Chain, PullRequest, RemoteLink};
use std::collections::HashMap;
use tracing::debug;

/// Remote-side view of the whole chain
#[derive(Debug, Clone, Default)]
pub struct RemoteState {
    /// Remote link per chain branch name; absent branch/PR fields mean
    /// "does not exist yet"
    pub links: HashMap<String, RemoteLink>,
    /// Open PRs we manage whose head branch has no local link anymore
    pub orphans: Vec<PullRequest>,
}

impl RemoteState {
    /// The remote link for a branch, or an all-absent placeholder
    pub fn link(&self, branch: &str) -> RemoteLink {
        self.links
            .get(branch)
            .cloned()
            .unwrap_or_else(|| RemoteLink::absent(branch))
    }

    /// Open PRs indexed by head branch, for body rendering
    pub fn prs_by_branch(&self) -> HashMap<String, PullRequest> {
        self.links
            .values()
            .filter_map(|l| l.pr.clone().map(|pr| (l.branch.clone(), pr)))
            .collect()
    }
}

/// Fetch the remote state for every link in the chain.
///
/// Errors with `PlanConflict` if any chain branch has more than one open PR,
/// the situation is ambiguous and reconciling against it could corrupt the
/// chain order.
pub async fn fetch_remote_state(chain: &Chain, host: &dyn HostingService) -> Result<RemoteState> {
    let open_prs = host.list_open_prs().await?;

    let mut by_head: HashMap<String, Vec<PullRequest>> = HashMap::new();
    for pr in open_prs {
        by_head.entry(pr.head_ref.clone()).or_default().push(pr);
    }

    let mut links = HashMap::new();
    for link in &chain.links {
        let prs = by_head.remove(&link.branch).unwrap_or_default();
        if prs.len() > 1 {
            let urls = prs
                .iter()
                .map(|pr| format!("  - {}", pr.html_url))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(Error::PlanConflict(format!(
                "branch {} has multiple open PRs:\n{urls}\ndon't know which to choose",
                link.branch
            )));
        }

        let branch_head = host.branch_head(&link.branch).await?;
        links.insert(
            link.branch.clone(),
            RemoteLink {
                branch: link.branch.clone(),
                branch_head,
                pr: prs.into_iter().next(),
            },
        );
    }

    // Whatever is left over and carries our managed section was once part of
    // a chain; report it, never delete it. Orphan detection is PR-keyed: a
    // leftover remote branch with no open PR is not scanned for and stays
    // untouched.
    let orphans: Vec<PullRequest> = by_head
        .into_values()
        .flatten()
        .filter(|pr| {
            pr.body
                .as_deref()
                .is_some_and(|body| body.contains(OPEN_MARKER))
        })
        .collect();

    debug!(
        links = links.len(),
        orphans = orphans.len(),
        "fetched remote state"
    );
    Ok(RemoteState { links, orphans })
}
