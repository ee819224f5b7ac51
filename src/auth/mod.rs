//! GitHub authentication
//!
//! The core only needs a bearer token to call the hosting API; retrieval is
//! delegated to the environment or the `gh` CLI's stored credentials.

use crate::error::{Error, Result};
use std::process::Command;
use tracing::debug;

/// Source of the authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from the `GITHUB_TOKEN` environment variable
    EnvVar,
    /// Token from the `gh` CLI
    Cli,
}

/// A resolved token and where it came from
#[derive(Debug, Clone)]
pub struct AuthToken {
    /// The bearer token
    pub token: String,
    /// Where the token was found
    pub source: AuthSource,
}

/// Resolve a GitHub token: `GITHUB_TOKEN` first, then `gh auth token`.
pub fn github_token() -> Result<AuthToken> {
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        if !token.trim().is_empty() {
            debug!("using token from GITHUB_TOKEN");
            return Ok(AuthToken {
                token: token.trim().to_string(),
                source: AuthSource::EnvVar,
            });
        }
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .map_err(|e| Error::Auth(format!("failed to run gh: {e}")))?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            debug!("using token from gh CLI");
            return Ok(AuthToken {
                token,
                source: AuthSource::Cli,
            });
        }
    }

    Err(Error::Auth(
        "couldn't get a GitHub token; set GITHUB_TOKEN or authenticate with `gh auth login`"
            .to_string(),
    ))
}
