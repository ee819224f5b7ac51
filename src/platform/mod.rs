//! Hosting service capability for pull-request operations
//!
//! The reconciler and executors only see this narrow trait, so they can be
//! tested against an in-memory fake with no network involved.

mod detection;
mod github;

pub use detection::parse_repo_info;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{MergeMethod, MergeResult, PullRequest};
use async_trait::async_trait;

/// Repository coordinates on the hosting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

/// Read/write capability against the hosting service.
///
/// Exactly the operations the chain engine consumes: read branches and open
/// PRs, create/update PRs, merge a PR. Nothing here deletes anything.
#[async_trait]
pub trait HostingService: Send + Sync {
    /// All open PRs in the repository.
    ///
    /// The caller indexes these by head branch itself; the hosting API's
    /// head filter is unreliable for cross-fork setups.
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>>;

    /// Sha at the tip of a remote branch, or None if the branch does not
    /// exist yet.
    async fn branch_head(&self, branch: &str) -> Result<Option<String>>;

    /// Create a PR with an empty body (the body is patched in afterwards,
    /// once every PR in the chain has a number).
    async fn create_pr(&self, head: &str, base: &str, title: &str) -> Result<PullRequest>;

    /// Retarget an existing PR's base branch
    async fn update_pr_base(&self, number: u64, base: &str) -> Result<PullRequest>;

    /// Replace an existing PR's body
    async fn update_pr_body(&self, number: u64, body: &str) -> Result<PullRequest>;

    /// Merge a PR with the given method
    async fn merge_pr(&self, number: u64, method: MergeMethod) -> Result<MergeResult>;

    /// Repository coordinates this service talks to
    fn config(&self) -> &HostConfig;
}
