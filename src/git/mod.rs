//! Local repository access over git2
//!
//! Everything the chain engine needs from git: the commit range between the
//! tracked upstream and HEAD, the branch-prefix config, HEAD amending for
//! `new`/`end-chain`, and ref pushes. Pushes and pulls shell out to the
//! `git` CLI so credential helpers keep working; libgit2 is used for
//! everything read-only and for amending.

use crate::error::{Error, Result};
use crate::types::{Commit, UpstreamRef};
use git2::Repository;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Config key for the branch-name prefix
const BRANCH_PREFIX_KEY: &str = "pr-chain.branch-prefix";

/// Narrow push capability consumed by the executor.
///
/// Kept as a trait so the executor can be tested against an in-memory fake
/// with no git repository involved.
pub trait RefPusher {
    /// Force-update `refs/heads/<branch>` on the remote to `sha`,
    /// creating the branch if it does not exist.
    fn force_push(&self, branch: &str, sha: &str) -> Result<()>;
}

/// An opened git repository plus the chain-relevant parts of its config
pub struct GitRepo {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepo {
    /// Discover and open the repository containing `path`
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::Config("bare repositories are not supported".to_string()))?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    /// The configured branch-name prefix, or empty if unset
    pub fn branch_prefix(&self) -> Result<String> {
        match self.repo.config()?.get_string(BRANCH_PREFIX_KEY) {
            Ok(prefix) => Ok(prefix.trim().to_string()),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// The upstream ref tracked by the current branch (e.g. origin/main)
    pub fn upstream(&self) -> Result<UpstreamRef> {
        let head = self.repo.head()?;
        let branch_ref = head.name().ok_or_else(|| {
            Error::Config("HEAD ref has no name; checkout a branch first".to_string())
        })?;

        let upstream = self.repo.branch_upstream_name(branch_ref).map_err(|_| {
            Error::Config(
                "no upstream branch; set one with e.g. \
                 `git branch --set-upstream-to origin/main`"
                    .to_string(),
            )
        })?;
        let shorthand = upstream
            .as_str()
            .map(|s| s.trim_start_matches("refs/remotes/"))
            .ok_or_else(|| Error::Config("upstream ref is not valid UTF-8".to_string()))?;

        let (remote, branch) = shorthand.split_once('/').ok_or_else(|| {
            Error::Config(format!("cannot split upstream ref '{shorthand}' into remote/branch"))
        })?;
        Ok(UpstreamRef {
            remote: remote.to_string(),
            branch: branch.to_string(),
        })
    }

    /// URL of the named remote
    pub fn remote_url(&self, remote: &str) -> Result<String> {
        let remote = self.repo.find_remote(remote)?;
        remote
            .url()
            .map(String::from)
            .ok_or_else(|| Error::Config("remote URL is not valid UTF-8".to_string()))
    }

    /// Commits in `upstream..HEAD`, oldest first.
    ///
    /// Merge commits are rejected up front: the chain requires linear
    /// history, and surfacing that here beats a confusing push failure.
    pub fn commits_since_upstream(&self, upstream: &UpstreamRef) -> Result<Vec<Commit>> {
        let upstream_ref = format!("refs/remotes/{}/{}", upstream.remote, upstream.branch);
        let upstream_oid = self
            .repo
            .find_reference(&upstream_ref)
            .and_then(|r| r.peel_to_commit())
            .map_err(|e| Error::Config(format!("cannot resolve {upstream_ref}: {e}")))?
            .id();
        let head_oid = self.repo.head()?.peel_to_commit()?.id();

        let mut walk = self.repo.revwalk()?;
        walk.push(head_oid)?;
        walk.hide(upstream_oid)?;
        walk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::REVERSE)?;

        let mut commits = Vec::new();
        for oid in walk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            if commit.parent_count() > 1 {
                return Err(Error::Annotation(format!(
                    "history contains merge commit {oid}; merges are incompatible with \
                     git-pr-chain, rewrite your branch to a linear history"
                )));
            }
            commits.push(Commit {
                sha: oid.to_string(),
                message: commit.message().unwrap_or_default().to_string(),
                parent_sha: commit.parent_ids().next().map(|p| p.to_string()),
            });
        }

        debug!(count = commits.len(), "read commit range");
        Ok(commits)
    }

    /// Amend HEAD's commit message, appending `marker` as a new trailing line.
    ///
    /// Used by `new` (append `git-pr-chain: <name>`) and `end-chain`
    /// (append `git-pr-chain: STOP`).
    pub fn append_to_head_message(&self, marker: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let old = head.message().unwrap_or_default();
        let new_message = if old.ends_with('\n') {
            format!("{old}\n{marker}\n")
        } else {
            format!("{old}\n\n{marker}\n")
        };
        let amended = head.amend(Some("HEAD"), None, None, None, Some(&new_message), None)?;
        debug!(sha = %amended, marker, "amended HEAD message");
        Ok(())
    }

    /// `git pull --rebase <remote> <branch>` after a successful merge
    pub fn pull_rebase(&self, upstream: &UpstreamRef) -> Result<()> {
        self.run_git(&["pull", "--rebase", &upstream.remote, &upstream.branch])
    }

    fn run_git(&self, args: &[&str]) -> Result<()> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::GitCommand(format!("failed to spawn git: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::GitCommand(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

/// Pushes refs to the upstream remote via the git CLI, so the user's
/// credential helpers apply.
pub struct GitCliPusher {
    workdir: PathBuf,
    remote: String,
}

impl GitCliPusher {
    /// A pusher targeting `remote` from the given repository
    pub fn new(repo: &GitRepo, remote: String) -> Self {
        Self {
            workdir: repo.workdir.clone(),
            remote,
        }
    }
}

impl RefPusher for GitCliPusher {
    fn force_push(&self, branch: &str, sha: &str) -> Result<()> {
        debug!(branch, sha, remote = %self.remote, "force pushing");
        let refspec = format!("{sha}:refs/heads/{branch}");
        let output = Command::new("git")
            .args(["push", "-f", &self.remote, &refspec])
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::GitCommand(format!("failed to spawn git: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::GitCommand(format!(
                "push of {branch} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_branch_prefix_default_empty() {
        let temp = TempDir::new().unwrap();
        Repository::init(temp.path()).unwrap();
        let repo = GitRepo::open(temp.path()).unwrap();
        assert_eq!(repo.branch_prefix().unwrap(), "");
    }

    #[test]
    fn test_branch_prefix_from_config() {
        let temp = TempDir::new().unwrap();
        let raw = Repository::init(temp.path()).unwrap();
        raw.config()
            .unwrap()
            .set_str(BRANCH_PREFIX_KEY, "alice/")
            .unwrap();
        let repo = GitRepo::open(temp.path()).unwrap();
        assert_eq!(repo.branch_prefix().unwrap(), "alice/");
    }

    #[test]
    fn test_append_to_head_message() {
        let temp = TempDir::new().unwrap();
        let raw = Repository::init(temp.path()).unwrap();
        {
            let mut config = raw.config().unwrap();
            config.set_str("user.name", "tester").unwrap();
            config.set_str("user.email", "tester@example.com").unwrap();
        }
        fs::write(temp.path().join("file.txt"), "hello").unwrap();
        let mut index = raw.index().unwrap();
        index.add_path(Path::new("file.txt")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = raw.find_tree(tree_id).unwrap();
        let sig = raw.signature().unwrap();
        raw.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
        drop(tree);
        drop(raw);

        let repo = GitRepo::open(temp.path()).unwrap();
        repo.append_to_head_message("git-pr-chain: foo").unwrap();

        let raw = Repository::open(temp.path()).unwrap();
        let head = raw.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(
            head.message().unwrap(),
            "Initial commit\n\ngit-pr-chain: foo\n"
        );
    }
}
