//! git-pr-chain: manage chains of dependent GitHub pull requests
//!
//! A linear local history, annotated with `git-pr-chain: <name>` markers,
//! is projected into an ordered chain of branches and PRs where each PR's
//! base is its predecessor's branch. The library reconciles that desired
//! chain against the remote: it fetches current state, computes a minimal
//! ordered action plan, executes it idempotently, and cascades base
//! updates after a link is merged.
//!
//! Layering mirrors the command flow: [`chain`] parses annotations into a
//! [`types::Chain`], [`sync`] fetches/plans/executes, [`merge`] retires
//! links. [`git`] and [`platform`] are the only effectful boundaries.

pub mod auth;
pub mod chain;
pub mod error;
pub mod git;
pub mod merge;
pub mod platform;
pub mod sync;
pub mod types;
