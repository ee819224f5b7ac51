//! Core types for git-pr-chain

use serde::{Deserialize, Serialize};

/// A local commit, read from the repository and never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full commit sha (hex)
    pub sha: String,
    /// Full commit message, including the subject line
    pub message: String,
    /// Parent commit sha (hex); None for the first commit in range
    pub parent_sha: Option<String>,
}

impl Commit {
    /// First line of the commit message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    /// Abbreviated sha for display
    pub fn short_sha(&self) -> &str {
        &self.sha[..self.sha.len().min(12)]
    }
}

/// Annotation extracted from a commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// No marker; the commit continues the current link
    None,
    /// `git-pr-chain: NAME` / `GPC: NAME` - start (or continue) a link
    Name(String),
    /// `git-pr-chain: STOP` - this commit and everything after it is excluded
    Stop,
}

/// One link in the chain: a named branch carrying a run of commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    /// Link name as written in the annotation
    pub name: String,
    /// Remote branch name (link name with the configured prefix applied)
    pub branch: String,
    /// Commits in this link, oldest first; never empty
    pub commits: Vec<Commit>,
    /// Zero-based position in the chain
    pub position: usize,
}

impl ChainLink {
    /// Sha of the newest commit in this link (the branch tip)
    pub fn tip(&self) -> &str {
        &self.commits[self.commits.len() - 1].sha
    }
}

/// The tracked upstream ref the chain is downstream from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRef {
    /// Remote name, e.g. "origin"
    pub remote: String,
    /// Branch name on the remote, e.g. "main"
    pub branch: String,
}

impl std::fmt::Display for UpstreamRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.remote, self.branch)
    }
}

/// The desired chain: an ordered sequence of links plus its upstream.
///
/// Rebuilt from scratch on every invocation; a pure projection of the
/// local commit range and config, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Links in order; the first link's PR base is the upstream branch
    pub links: Vec<ChainLink>,
    /// Upstream ref the chain is downstream from
    pub upstream: UpstreamRef,
    /// Commits excluded by a STOP marker, oldest first
    pub stopped: Vec<Commit>,
}

impl Chain {
    /// The base branch for the link at `position`: the preceding link's
    /// branch, or the upstream branch for the first link.
    pub fn base_for(&self, position: usize) -> &str {
        if position == 0 {
            &self.upstream.branch
        } else {
            &self.links[position - 1].branch
        }
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open and can be merged
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A pull request as seen on the hosting service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
    /// Current state of the PR
    pub state: PrState,
}

/// Remote-side view of one chain link
#[derive(Debug, Clone)]
pub struct RemoteLink {
    /// Remote branch name (prefixed)
    pub branch: String,
    /// Sha the remote branch points at, if the branch exists
    pub branch_head: Option<String>,
    /// Open PR whose head is this branch, if any
    pub pr: Option<PullRequest>,
}

impl RemoteLink {
    /// A remote link with neither a branch nor a PR yet
    pub fn absent(branch: &str) -> Self {
        Self {
            branch: branch.to_string(),
            branch_head: None,
            pr: None,
        }
    }
}

/// One mutation in the reconciler's plan.
///
/// Produced by the reconciler, consumed once by the executor, strictly in
/// order: a link's base branch must exist on the remote before anything
/// that references it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainAction {
    /// Push a branch that does not exist on the remote yet
    CreateBranch {
        /// Remote branch name
        branch: String,
        /// Local sha to push
        sha: String,
    },
    /// Force-update an existing remote branch to the desired tip
    ForcePushBranch {
        /// Remote branch name
        branch: String,
        /// Local sha to push
        sha: String,
    },
    /// Open a PR for a branch that has none
    CreatePullRequest {
        /// Head branch name
        branch: String,
        /// Base branch name
        base: String,
        /// PR title (first line of the link's first commit)
        title: String,
    },
    /// Retarget an existing PR's base branch
    UpdatePullRequestBase {
        /// Head branch name (for reporting)
        branch: String,
        /// PR number
        number: u64,
        /// New base branch name
        base: String,
    },
    /// Rewrite the managed section of a PR's description
    UpdatePullRequestBody {
        /// Head branch name (for reporting)
        branch: String,
        /// PR number
        number: u64,
        /// Full replacement body (managed section already patched in)
        body: String,
    },
    /// Merge a PR (issued by the cascade controller, not the reconciler)
    MergePullRequest {
        /// Head branch name (for reporting)
        branch: String,
        /// PR number
        number: u64,
        /// Merge method to use
        method: MergeMethod,
    },
}

impl ChainAction {
    /// The remote branch this action targets
    pub fn branch(&self) -> &str {
        match self {
            Self::CreateBranch { branch, .. }
            | Self::ForcePushBranch { branch, .. }
            | Self::CreatePullRequest { branch, .. }
            | Self::UpdatePullRequestBase { branch, .. }
            | Self::UpdatePullRequestBody { branch, .. }
            | Self::MergePullRequest { branch, .. } => branch,
        }
    }
}

impl std::fmt::Display for ChainAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateBranch { branch, sha } => {
                write!(f, "create branch {branch} at {}", &sha[..sha.len().min(12)])
            }
            Self::ForcePushBranch { branch, sha } => {
                write!(f, "force-push {branch} to {}", &sha[..sha.len().min(12)])
            }
            Self::CreatePullRequest { branch, base, .. } => {
                write!(f, "create PR {branch} -> {base}")
            }
            Self::UpdatePullRequestBase { number, base, .. } => {
                write!(f, "retarget PR #{number} onto {base}")
            }
            Self::UpdatePullRequestBody { number, .. } => {
                write!(f, "update description of PR #{number}")
            }
            Self::MergePullRequest { number, method, .. } => {
                write!(f, "merge PR #{number} ({method})")
            }
        }
    }
}

/// Result of a merge operation
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The sha of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    /// Create a merge commit
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Squash => write!(f, "squash"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}
