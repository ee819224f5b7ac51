//! Error types for git-pr-chain

use thiserror::Error;

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the chain engine
#[derive(Debug, Error)]
pub enum Error {
    /// Commit annotations do not form a valid chain
    #[error("annotation error: {0}")]
    Annotation(String),

    /// Local git operation failed
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Invoking the git CLI failed (push, pull)
    #[error("git command failed: {0}")]
    GitCommand(String),

    /// Remote state could not be fetched; nothing was mutated
    #[error("fetch error: {0}")]
    Fetch(String),

    /// GitHub API call failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Underlying octocrab error
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// Remote state diverges in a way the plan cannot explain
    #[error("plan conflict: {0}")]
    PlanConflict(String),

    /// A specific action in the plan failed
    #[error("execution failed at {action}: {message}")]
    Execution {
        /// Human-readable description of the failed action
        action: String,
        /// Underlying failure message
        message: String,
    },

    /// The hosting service refused the merge; no cascade was performed
    #[error("merge rejected: {0}")]
    MergeRejected(String),

    /// Authentication token could not be obtained
    #[error("auth error: {0}")]
    Auth(String),

    /// Repository or remote configuration problem
    #[error("config error: {0}")]
    Config(String),

    /// No supported remote found for this repository
    #[error("no GitHub remote found; set an upstream with `git branch --set-upstream-to`")]
    NoSupportedRemotes,

    /// Internal invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether a retry with backoff is reasonable.
    ///
    /// Transient failures are network transport errors and rate limiting.
    /// Everything else (permission denied, validation failures, conflicts)
    /// aborts the remaining plan immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Octocrab(octocrab::Error::Http { .. }) => true,
            Self::Octocrab(octocrab::Error::GitHub { source, .. }) => {
                let status = source.status_code.as_u16();
                status == 429 || status >= 500
            }
            Self::Fetch(msg) | Self::GitHubApi(msg) => {
                msg.contains("rate limit") || msg.contains("timed out")
            }
            _ => false,
        }
    }
}
