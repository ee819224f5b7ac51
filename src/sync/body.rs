//! Managed-section rendering and PR body patching
//!
//! The managed section is the block between `<git-pr-chain>` markers inside a
//! PR description. Everything inside the markers belongs to this tool and is
//! replaced wholesale; everything outside is the user's and is preserved
//! byte-for-byte. Patching is a pure function and a fixed point: applying it
//! twice with the same section produces identical bytes.

use crate::error::{Error, Result};
use crate::types::{Chain, ChainLink, PullRequest};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Opening marker of the managed section
pub const OPEN_MARKER: &str = "<git-pr-chain>";
/// Closing marker of the managed section
pub const CLOSE_MARKER: &str = "</git-pr-chain>";

/// Annotation lines are stripped from commit messages before rendering,
/// they are plumbing, not prose.
static ANNOTATION_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*(?:git-pr-chain|gpc):.*$").expect("valid annotation-line regex")
});

/// Warning shown on every PR except the first in the chain.
const DO_NOT_MERGE_MSG: &str = "\u{26a0}\u{fe0f} Please **do not click the green \"merge\" \
button** unless you know what you're doing. This PR is part of a chain of PRs, and clicking \
the merge button will not merge it into the default branch. \u{26a0}\u{fe0f}";

/// Render the managed-section content for one link.
///
/// `prs` maps remote branch name to its open PR; every link in the chain
/// must have one by the time bodies are rendered (the executor creates PRs
/// before this pass runs).
pub fn render_section(
    chain: &Chain,
    link: &ChainLink,
    prs: &HashMap<String, PullRequest>,
) -> Result<String> {
    let commits = link
        .commits
        .iter()
        .map(|c| {
            let cleaned = ANNOTATION_LINE_RE.replace_all(&c.message, "");
            format!("1. {}", cleaned.trim().replace('\n', "\n    "))
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut listing = Vec::with_capacity(chain.links.len());
    for other in &chain.links {
        let pr = prs.get(&other.branch).ok_or_else(|| {
            Error::Internal(format!(
                "no PR recorded for branch {} while rendering descriptions",
                other.branch
            ))
        })?;
        let mut line = format!("#{} {}", pr.number, pr.title);
        if other.branch == link.branch {
            line = format!("\u{1f449} {line} \u{1f448} **YOU ARE HERE**");
        }
        listing.push(format!("1. {line}"));
    }
    let listing = listing.join("\n");

    let mut section = format!(
        "\n#### Commits in this PR\n{commits}\n\n\
         #### [PR chain](https://github.com/jlebar/git-pr-chain)\n{listing}\n"
    );
    if link.position != 0 {
        section.push_str(&format!("\n{DO_NOT_MERGE_MSG}\n"));
    }
    Ok(section)
}

/// Patch `section` into `existing`, replacing the managed block or appending
/// a new one.
///
/// Text outside the markers is preserved byte-for-byte. If the markers are
/// absent, a new block is appended, separated by a blank line when the body
/// is non-empty.
pub fn patch_body(existing: &str, section: &str) -> String {
    let block = format!("{OPEN_MARKER}{section}{CLOSE_MARKER}");

    match (existing.find(OPEN_MARKER), existing.rfind(CLOSE_MARKER)) {
        (Some(open), Some(close)) if open <= close => {
            let after = close + CLOSE_MARKER.len();
            format!("{}{block}{}", &existing[..open], &existing[after..])
        }
        _ if existing.is_empty() => block,
        _ => format!("{existing}\n\n{block}"),
    }
}
