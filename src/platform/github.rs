//! GitHub implementation of the hosting capability, via octocrab

use crate::error::{Error, Result};
use crate::platform::{HostConfig, HostingService};
use crate::types::{MergeMethod, MergeResult, PrState, PullRequest};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: HostConfig,
}

impl GitHubService {
    /// Create a new GitHub service authenticated with `token`
    pub fn new(token: &str, owner: String, repo: String) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self {
            client,
            config: HostConfig { owner, repo },
        })
    }
}

/// Helper to convert an octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    let state = match pr.state {
        Some(octocrab::models::IssueState::Open) => PrState::Open,
        Some(octocrab::models::IssueState::Closed) if pr.merged_at.is_some() => PrState::Merged,
        // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
        Some(_) | None => PrState::Closed,
    };

    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        body: pr.body.clone(),
        state,
    }
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(
        err,
        octocrab::Error::GitHub { source, .. }
            if source.status_code == reqwest::StatusCode::NOT_FOUND
    )
}

#[async_trait]
impl HostingService for GitHubService {
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        debug!("listing open PRs");
        let page = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(octocrab::params::State::Open)
            .per_page(100)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("listing open PRs failed: {e}")))?;

        let prs = self
            .client
            .all_pages(page)
            .await
            .map_err(|e| Error::Fetch(format!("paginating open PRs failed: {e}")))?;

        let result: Vec<PullRequest> = prs.iter().map(pr_from_octocrab).collect();
        debug!(count = result.len(), "listed open PRs");
        Ok(result)
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>> {
        debug!(branch, "reading branch head");
        let reference = octocrab::params::repos::Reference::Branch(branch.to_string());
        match self
            .client
            .repos(&self.config.owner, &self.config.repo)
            .get_ref(&reference)
            .await
        {
            Ok(git_ref) => {
                let sha = match git_ref.object {
                    octocrab::models::repos::Object::Commit { sha, .. }
                    | octocrab::models::repos::Object::Tag { sha, .. } => sha,
                    _ => {
                        return Err(Error::Fetch(format!(
                            "branch {branch} points at a non-commit object"
                        )))
                    }
                };
                debug!(branch, sha = %sha, "branch exists");
                Ok(Some(sha))
            }
            Err(e) if is_not_found(&e) => {
                debug!(branch, "branch does not exist");
                Ok(None)
            }
            Err(e) => Err(Error::Fetch(format!("reading branch {branch} failed: {e}"))),
        }
    }

    async fn create_pr(&self, head: &str, base: &str, title: &str) -> Result<PullRequest> {
        debug!(head, base, "creating PR");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(title, head, base)
            .body("")
            .send()
            .await?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn update_pr_base(&self, number: u64, base: &str) -> Result<PullRequest> {
        debug!(number, base, "updating PR base");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .update(number)
            .base(base)
            .send()
            .await?;

        debug!(number, "updated PR base");
        Ok(pr_from_octocrab(&pr))
    }

    async fn update_pr_body(&self, number: u64, body: &str) -> Result<PullRequest> {
        debug!(number, "updating PR body");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .update(number)
            .body(body)
            .send()
            .await?;

        debug!(number, "updated PR body");
        Ok(pr_from_octocrab(&pr))
    }

    async fn merge_pr(&self, number: u64, method: MergeMethod) -> Result<MergeResult> {
        debug!(number, %method, "merging PR");

        let octocrab_method = match method {
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
            MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
        };

        let result = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .merge(number)
            .method(octocrab_method)
            .send()
            .await
            .map_err(|e| Error::MergeRejected(format!("merge of PR #{number} failed: {e}")))?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    fn config(&self) -> &HostConfig {
        &self.config
    }
}
