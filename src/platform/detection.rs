//! Remote URL to repository coordinates

use crate::error::{Error, Result};
use crate::platform::HostConfig;
use regex::Regex;
use std::sync::LazyLock;

/// Captures `owner/repo` from the tail of https and ssh remote URLs,
/// with or without a `.git` suffix.
static OWNER_REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[/:])([^/:]+)/([^/:]+?)(?:\.git)?/*$").expect("valid owner/repo regex")
});

/// Extract owner and repository name from a git remote URL.
///
/// Handles `https://github.com/owner/repo(.git)` and
/// `git@github.com:owner/repo(.git)` forms.
pub fn parse_repo_info(url: &str) -> Result<HostConfig> {
    let caps = OWNER_REPO_RE
        .captures(url)
        .ok_or(Error::NoSupportedRemotes)?;
    Ok(HostConfig {
        owner: caps[1].to_string(),
        repo: caps[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_with_git_extension() {
        let config = parse_repo_info("https://github.com/owner/repo.git").unwrap();
        assert_eq!(config.owner, "owner");
        assert_eq!(config.repo, "repo");
    }

    #[test]
    fn test_https_without_git_extension() {
        let config = parse_repo_info("https://github.com/owner/repo").unwrap();
        assert_eq!(config.owner, "owner");
        assert_eq!(config.repo, "repo");
    }

    #[test]
    fn test_ssh_form() {
        let config = parse_repo_info("git@github.com:owner/repo.git").unwrap();
        assert_eq!(config.owner, "owner");
        assert_eq!(config.repo, "repo");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = parse_repo_info("https://github.com/owner/repo/").unwrap();
        assert_eq!(config.owner, "owner");
        assert_eq!(config.repo, "repo");
    }

    #[test]
    fn test_unparseable_url_is_error() {
        assert!(parse_repo_info("not-a-valid-url").is_err());
    }
}
