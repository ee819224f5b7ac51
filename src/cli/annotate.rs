//! Annotation commands - `new` and `end-chain` amend HEAD's message

use crate::cli::context::CommandContext;
use crate::cli::style::{check, Stylize};
use anstream::println;
use git_pr_chain::error::{Error, Result};
use std::path::Path;

/// Run the `new` command: start a fresh link at HEAD
pub fn run_new(path: &Path, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(Error::Annotation(format!(
            "'{name}' is not a valid link name; use a single branch-safe word"
        )));
    }
    if name == "STOP" {
        return Err(Error::Annotation(
            "'STOP' is the end-chain marker; use `git-pr-chain end-chain` instead".to_string(),
        ));
    }

    let ctx = CommandContext::new(path)?;
    ctx.repo
        .append_to_head_message(&format!("git-pr-chain: {name}"))?;
    println!(
        "{} Annotated HEAD with link {}",
        check().success(),
        name.accent()
    );
    Ok(())
}

/// Run the `end-chain` command: exclude HEAD and everything after it
pub fn run_end_chain(path: &Path) -> Result<()> {
    let ctx = CommandContext::new(path)?;
    ctx.repo.append_to_head_message("git-pr-chain: STOP")?;
    println!(
        "{} Marked HEAD with STOP; it and later commits stay local",
        check().success()
    );
    Ok(())
}
