//! Shared command context for CLI commands
//!
//! Extracts the common setup shared by log, push, and merge: opening the
//! repository, reading the chain config, resolving the upstream, and (for
//! the commands that need it) authenticating against the hosting service.

use git_pr_chain::auth::github_token;
use git_pr_chain::chain::build_chain;
use git_pr_chain::error::Result;
use git_pr_chain::git::{GitCliPusher, GitRepo};
use git_pr_chain::platform::{parse_repo_info, GitHubService, HostingService};
use git_pr_chain::types::{Chain, UpstreamRef};
use std::path::Path;

/// Context for commands that only read the local repository
pub struct CommandContext {
    /// The opened repository
    pub repo: GitRepo,
    /// Tracked upstream ref of the current branch
    pub upstream: UpstreamRef,
    /// Configured branch-name prefix
    pub branch_prefix: String,
}

impl CommandContext {
    /// Open the repository at `path` and read chain configuration
    pub fn new(path: &Path) -> Result<Self> {
        let repo = GitRepo::open(path)?;
        let upstream = repo.upstream()?;
        let branch_prefix = repo.branch_prefix()?;
        Ok(Self {
            repo,
            upstream,
            branch_prefix,
        })
    }

    /// Build the desired chain from the current commit range.
    ///
    /// Rebuilt on every call; after a rebase or pull the previous chain is
    /// stale and must not be reused.
    pub fn build_chain(&self) -> Result<Chain> {
        let commits = self.repo.commits_since_upstream(&self.upstream)?;
        build_chain(&commits, &self.branch_prefix, self.upstream.clone())
    }

    /// Extend this context with hosting-service access (push, merge)
    pub fn with_platform(self) -> Result<PlatformContext> {
        let url = self.repo.remote_url(&self.upstream.remote)?;
        let host_config = parse_repo_info(&url)?;
        let token = github_token()?;
        let platform = GitHubService::new(&token.token, host_config.owner, host_config.repo)?;
        let pusher = GitCliPusher::new(&self.repo, self.upstream.remote.clone());
        Ok(PlatformContext {
            local: self,
            platform: Box::new(platform),
            pusher,
        })
    }
}

/// Context for commands that also talk to the hosting service
pub struct PlatformContext {
    /// Local repository context
    pub local: CommandContext,
    /// Hosting service client
    pub platform: Box<dyn HostingService>,
    /// Ref pusher targeting the upstream remote
    pub pusher: GitCliPusher,
}
