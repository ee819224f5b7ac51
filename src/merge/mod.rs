//! Merge cascade controller for chained PRs
//!
//! Retires links front of chain first, one pass per link:
//! 1. Plan - pick the front PR and the dependents to retarget (pure)
//! 2. Execute - merge, then cascade base updates, both through the plan
//!    executor and its retry policy (effectful)
//! 3. The caller re-runs the push pipeline so descriptions reflect the
//!    shortened chain.

mod execute;
mod plan;

pub use execute::{execute_cascade, CascadeOutcome, CascadeState};
pub use plan::{plan_cascade, CascadePlan, CascadeTarget};
