//! Merge cascade tests against an in-memory remote

mod common;

use common::{github_config, make_chain, MockRemote};
use git_pr_chain::error::Error;
use git_pr_chain::merge::{execute_cascade, plan_cascade};
use git_pr_chain::sync::{fetch_remote_state, run_push, SyncOptions};
use git_pr_chain::types::MergeMethod;

#[tokio::test]
async fn test_merge_front_link_retargets_direct_dependents() {
    let remote = MockRemote::new(github_config());
    let chain = make_chain(&[
        ("a1", "Add foo", Some("foo")),
        ("a2", "Add bar", Some("bar")),
        ("a3", "Add baz", Some("baz")),
    ]);
    run_push(&chain, &remote, &remote, SyncOptions::default())
        .await
        .unwrap();

    let state = fetch_remote_state(&chain, &remote).await.unwrap();
    let plan = plan_cascade(&chain, &state, MergeMethod::Squash).unwrap();
    let outcome = execute_cascade(&plan, &remote, &remote).await.unwrap();

    assert_eq!(outcome.merged_branch, "foo");
    assert_eq!(outcome.merge_sha.as_deref(), Some("merge-of-1"));
    assert_eq!(remote.merges(), vec![(1, MergeMethod::Squash)]);

    // bar moved onto the upstream; baz still stacks on bar.
    assert_eq!(outcome.retargeted, vec![(2, "main".to_string())]);
    assert!(remote.open_pr_for("foo").is_none());
    assert_eq!(remote.open_pr_for("bar").unwrap().base_ref, "main");
    assert_eq!(remote.open_pr_for("baz").unwrap().base_ref, "bar");
}

#[tokio::test]
async fn test_push_after_merge_refreshes_descriptions_then_settles() {
    let remote = MockRemote::new(github_config());
    let chain = make_chain(&[("a1", "Add foo", Some("foo")), ("a2", "Add bar", Some("bar"))]);
    run_push(&chain, &remote, &remote, SyncOptions::default())
        .await
        .unwrap();

    let state = fetch_remote_state(&chain, &remote).await.unwrap();
    let plan = plan_cascade(&chain, &state, MergeMethod::Merge).unwrap();
    execute_cascade(&plan, &remote, &remote).await.unwrap();

    // After pulling the merged upstream, the local chain starts at bar.
    let shortened = make_chain(&[("a2", "Add bar", Some("bar"))]);
    let outcome = run_push(&shortened, &remote, &remote, SyncOptions::default())
        .await
        .unwrap();

    // Branch and base already converged; only the description shrinks.
    assert!(outcome.refs.applied.is_empty());
    assert_eq!(outcome.bodies.applied.len(), 1);
    let body = remote.open_pr_for("bar").unwrap().body.unwrap();
    assert!(!body.contains("Add foo"));
    assert!(!body.contains("do not click"));

    let settled = run_push(&shortened, &remote, &remote, SyncOptions::default())
        .await
        .unwrap();
    assert!(settled.is_noop());
}

#[tokio::test]
async fn test_transient_merge_failure_is_retried() {
    let remote = MockRemote::new(github_config());
    let chain = make_chain(&[("a1", "Add foo", Some("foo")), ("a2", "Add bar", Some("bar"))]);
    run_push(&chain, &remote, &remote, SyncOptions::default())
        .await
        .unwrap();

    // First merge attempt fails with a rate limit; the retry lands it.
    remote.fail_merge("rate limit exceeded");
    let state = fetch_remote_state(&chain, &remote).await.unwrap();
    let plan = plan_cascade(&chain, &state, MergeMethod::Merge).unwrap();
    let outcome = execute_cascade(&plan, &remote, &remote).await.unwrap();

    assert_eq!(remote.merges().len(), 2);
    assert_eq!(outcome.merged_branch, "foo");
    assert_eq!(outcome.retargeted, vec![(2, "main".to_string())]);
    assert!(remote.open_pr_for("foo").is_none());
    assert_eq!(remote.open_pr_for("bar").unwrap().base_ref, "main");
}

#[tokio::test]
async fn test_refused_merge_leaves_dependents_untouched() {
    let remote = MockRemote::new(github_config());
    let chain = make_chain(&[("a1", "Add foo", Some("foo")), ("a2", "Add bar", Some("bar"))]);
    run_push(&chain, &remote, &remote, SyncOptions::default())
        .await
        .unwrap();
    let base_updates_before = remote.base_updates().len();

    remote.refuse_merge("required checks have not passed");
    let state = fetch_remote_state(&chain, &remote).await.unwrap();
    let plan = plan_cascade(&chain, &state, MergeMethod::Merge).unwrap();
    let err = execute_cascade(&plan, &remote, &remote).await.unwrap_err();

    assert!(matches!(err, Error::MergeRejected(_)));
    assert_eq!(remote.base_updates().len(), base_updates_before);
    assert_eq!(remote.open_pr_for("bar").unwrap().base_ref, "foo");
    assert!(remote.open_pr_for("foo").is_some());
}

#[tokio::test]
async fn test_cascade_refuses_unconverged_front_link() {
    let remote = MockRemote::new(github_config());
    let chain = make_chain(&[("a1", "Add foo", Some("foo"))]);
    remote.seed_branch("foo", "a1");
    remote.seed_pr(5, "foo", "some-stale-base", "Add foo", "");

    let state = fetch_remote_state(&chain, &remote).await.unwrap();
    let err = plan_cascade(&chain, &state, MergeMethod::Merge).unwrap_err();

    assert!(matches!(err, Error::PlanConflict(_)));
    assert!(remote.merges().is_empty());
}

#[tokio::test]
async fn test_cascade_requires_open_pr_for_front_link() {
    let remote = MockRemote::new(github_config());
    let chain = make_chain(&[("a1", "Add foo", Some("foo"))]);
    remote.seed_branch("foo", "a1");

    let state = fetch_remote_state(&chain, &remote).await.unwrap();
    let err = plan_cascade(&chain, &state, MergeMethod::Merge).unwrap_err();

    assert!(matches!(err, Error::PlanConflict(_)));
}
