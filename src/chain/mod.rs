//! Commit annotation parsing and chain construction
//!
//! Turns an ordered commit range (oldest first) into the desired chain of
//! links. Pure: no I/O happens here, so re-running on unchanged history
//! yields an identical chain.

use crate::error::{Error, Result};
use crate::types::{Annotation, Chain, ChainLink, Commit, UpstreamRef};
use regex::Regex;
use std::sync::LazyLock;

/// Matches `git-pr-chain: NAME` or `GPC: NAME` at the start of a message
/// line. The keyword is case-insensitive; the name keeps its case.
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*(?:git-pr-chain|gpc):[ \t]*(.*)$").expect("valid marker regex")
});

/// The stop token: exact case, ending at a word boundary, so a trailing
/// note like `STOP for now` still stops the chain.
static STOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^STOP\b").expect("valid stop-token regex"));

/// Extract the annotation from a commit message.
///
/// The first matching marker line wins; later markers are ignored.
pub fn annotation_of(message: &str) -> Annotation {
    let Some(caps) = MARKER_RE.captures(message) else {
        return Annotation::None;
    };
    let name = caps[1].trim();
    if STOP_RE.is_match(name) {
        Annotation::Stop
    } else if name.is_empty() {
        // A bare marker line carries no information; treat as unannotated.
        Annotation::None
    } else {
        Annotation::Name(name.to_string())
    }
}

/// Build the desired chain from an ordered commit range.
///
/// `commits` must be oldest first (`upstream..HEAD` order). `prefix` is the
/// configured branch-name prefix, applied when forming remote branch names.
///
/// Errors:
/// - the first in-range commit has no name annotation
/// - a link name reappears after a different link interrupted it (AABA)
pub fn build_chain(commits: &[Commit], prefix: &str, upstream: UpstreamRef) -> Result<Chain> {
    let mut links: Vec<ChainLink> = Vec::new();
    let mut stopped: Vec<Commit> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for (idx, commit) in commits.iter().enumerate() {
        match annotation_of(&commit.message) {
            Annotation::Stop => {
                // This commit and everything after it stays local.
                stopped.extend(commits[idx..].iter().cloned());
                break;
            }
            Annotation::Name(name) => {
                // Re-annotation with the current link's name continues it.
                if let Some(link) = links.last_mut() {
                    if link.name == name {
                        link.commits.push(commit.clone());
                        continue;
                    }
                }
                if seen.iter().any(|s| s == &name) {
                    return Err(Error::Annotation(format!(
                        "link '{name}' appears, is interrupted by a different link, \
                         then reappears; reorder commits or rename the link"
                    )));
                }
                seen.push(name.clone());
                let position = links.len();
                links.push(ChainLink {
                    branch: format!("{prefix}{name}"),
                    name,
                    commits: vec![commit.clone()],
                    position,
                });
            }
            Annotation::None => match links.last_mut() {
                Some(link) => link.commits.push(commit.clone()),
                None => {
                    return Err(Error::Annotation(format!(
                        "first commit ({}) must have a 'git-pr-chain:' annotation",
                        commit.short_sha()
                    )));
                }
            },
        }
    }

    Ok(Chain {
        links,
        upstream,
        stopped,
    })
}
