//! Shared test fixtures

mod mock_remote;

pub use mock_remote::MockRemote;

use git_pr_chain::chain::build_chain;
use git_pr_chain::platform::HostConfig;
use git_pr_chain::types::{Chain, Commit, UpstreamRef};

/// Repository coordinates used by every test
pub fn github_config() -> HostConfig {
    HostConfig {
        owner: "test".to_string(),
        repo: "repo".to_string(),
    }
}

/// The upstream every test chain hangs off
pub fn upstream() -> UpstreamRef {
    UpstreamRef {
        remote: "origin".to_string(),
        branch: "main".to_string(),
    }
}

/// Build a commit with the given sha, subject, and optional annotation
pub fn make_commit(sha: &str, subject: &str, annotation: Option<&str>, parent: Option<&str>) -> Commit {
    let message = match annotation {
        Some(marker) => format!("{subject}\n\ngit-pr-chain: {marker}"),
        None => subject.to_string(),
    };
    Commit {
        sha: sha.to_string(),
        message,
        parent_sha: parent.map(String::from),
    }
}

/// Parse a chain from (sha, subject, annotation) triples
pub fn make_chain(commits: &[(&str, &str, Option<&str>)]) -> Chain {
    let mut built = Vec::new();
    let mut parent: Option<String> = None;
    for (sha, subject, annotation) in commits {
        built.push(make_commit(sha, subject, *annotation, parent.as_deref()));
        parent = Some((*sha).to_string());
    }
    build_chain(&built, "", upstream()).expect("test chain must parse")
}
