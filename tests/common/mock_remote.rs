//! In-memory stand-in for GitHub, used by the integration tests.
//!
//! Stateful on purpose: branch pushes, PR creation, base/body updates, and
//! merges all mutate the same store, so a test can run the push pipeline
//! twice and assert the second run finds nothing to do.
//!
//! Not every helper is used by every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use git_pr_chain::error::{Error, Result};
use git_pr_chain::git::RefPusher;
use git_pr_chain::platform::{HostConfig, HostingService};
use git_pr_chain::types::{MergeMethod, MergeResult, PrState, PullRequest};
use std::collections::HashMap;
use std::sync::Mutex;

/// What the "remote" currently holds
#[derive(Debug, Default)]
struct RemoteStore {
    /// Branch name -> sha
    branch_heads: HashMap<String, String>,
    /// Every PR ever created, by number
    prs: HashMap<u64, PullRequest>,
    next_number: u64,
}

/// Calls the mock has received, for assertions
#[derive(Debug, Default)]
struct CallLog {
    pushes: Vec<(String, String)>,
    created_prs: Vec<(String, String, String)>,
    create_pr_attempts: usize,
    base_updates: Vec<(u64, String)>,
    body_updates: Vec<u64>,
    merges: Vec<(u64, MergeMethod)>,
}

/// Injected failures. The queues fail one call each, so a single entry
/// models a transient failure that clears on retry.
#[derive(Debug, Default)]
struct Failures {
    list_open_prs: Option<String>,
    create_pr: Vec<String>,
    merge: Vec<String>,
    merge_refusal: Option<String>,
}

/// Fake remote implementing both the push and hosting capabilities
#[derive(Debug)]
pub struct MockRemote {
    store: Mutex<RemoteStore>,
    calls: Mutex<CallLog>,
    failures: Mutex<Failures>,
    config: HostConfig,
}

impl MockRemote {
    pub fn new(config: HostConfig) -> Self {
        Self {
            store: Mutex::new(RemoteStore {
                next_number: 1,
                ..RemoteStore::default()
            }),
            calls: Mutex::new(CallLog::default()),
            failures: Mutex::new(Failures::default()),
            config,
        }
    }

    // --- setup -----------------------------------------------------------

    /// Pretend a branch already exists on the remote
    pub fn seed_branch(&self, branch: &str, sha: &str) {
        let mut store = self.store.lock().unwrap();
        store
            .branch_heads
            .insert(branch.to_string(), sha.to_string());
    }

    /// Pretend an open PR already exists on the remote
    pub fn seed_pr(&self, number: u64, head: &str, base: &str, title: &str, body: &str) {
        let mut store = self.store.lock().unwrap();
        store.next_number = store.next_number.max(number + 1);
        store.prs.insert(
            number,
            PullRequest {
                number,
                html_url: format!(
                    "https://github.com/{}/{}/pull/{number}",
                    self.config.owner, self.config.repo
                ),
                base_ref: base.to_string(),
                head_ref: head.to_string(),
                title: title.to_string(),
                body: Some(body.to_string()),
                state: PrState::Open,
            },
        );
    }

    pub fn fail_list_open_prs(&self, message: &str) {
        self.failures.lock().unwrap().list_open_prs = Some(message.to_string());
    }

    /// Queue one create_pr failure; the call after it succeeds
    pub fn fail_create_pr(&self, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .create_pr
            .push(message.to_string());
    }

    /// Queue one merge_pr failure; the call after it succeeds
    pub fn fail_merge(&self, message: &str) {
        self.failures.lock().unwrap().merge.push(message.to_string());
    }

    /// Make merge_pr report "not merged" with the given reason
    pub fn refuse_merge(&self, message: &str) {
        self.failures.lock().unwrap().merge_refusal = Some(message.to_string());
    }

    /// Stop injecting failures
    pub fn clear_failures(&self) {
        *self.failures.lock().unwrap() = Failures::default();
    }

    // --- inspection ------------------------------------------------------

    pub fn branch_head_of(&self, branch: &str) -> Option<String> {
        self.store.lock().unwrap().branch_heads.get(branch).cloned()
    }

    pub fn pr(&self, number: u64) -> Option<PullRequest> {
        self.store.lock().unwrap().prs.get(&number).cloned()
    }

    /// The open PR whose head is `branch`, if any
    pub fn open_pr_for(&self, branch: &str) -> Option<PullRequest> {
        self.store
            .lock()
            .unwrap()
            .prs
            .values()
            .find(|pr| pr.state == PrState::Open && pr.head_ref == branch)
            .cloned()
    }

    pub fn pushes(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().pushes.clone()
    }

    /// (head, base, title) triples, in call order
    pub fn created_prs(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().created_prs.clone()
    }

    /// Every create_pr call, including failed attempts
    pub fn create_pr_attempts(&self) -> usize {
        self.calls.lock().unwrap().create_pr_attempts
    }

    pub fn base_updates(&self) -> Vec<(u64, String)> {
        self.calls.lock().unwrap().base_updates.clone()
    }

    pub fn body_updates(&self) -> Vec<u64> {
        self.calls.lock().unwrap().body_updates.clone()
    }

    pub fn merges(&self) -> Vec<(u64, MergeMethod)> {
        self.calls.lock().unwrap().merges.clone()
    }

    /// Total mutating calls received so far
    pub fn mutation_count(&self) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.pushes.len()
            + calls.created_prs.len()
            + calls.base_updates.len()
            + calls.body_updates.len()
            + calls.merges.len()
    }
}

impl RefPusher for MockRemote {
    fn force_push(&self, branch: &str, sha: &str) -> Result<()> {
        self.store
            .lock()
            .unwrap()
            .branch_heads
            .insert(branch.to_string(), sha.to_string());
        self.calls
            .lock()
            .unwrap()
            .pushes
            .push((branch.to_string(), sha.to_string()));
        Ok(())
    }
}

#[async_trait]
impl HostingService for MockRemote {
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        if let Some(message) = self.failures.lock().unwrap().list_open_prs.clone() {
            return Err(Error::Fetch(message));
        }
        let store = self.store.lock().unwrap();
        let mut prs: Vec<PullRequest> = store
            .prs
            .values()
            .filter(|pr| pr.state == PrState::Open)
            .cloned()
            .collect();
        prs.sort_by_key(|pr| pr.number);
        Ok(prs)
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>> {
        Ok(self.store.lock().unwrap().branch_heads.get(branch).cloned())
    }

    async fn create_pr(&self, head: &str, base: &str, title: &str) -> Result<PullRequest> {
        self.calls.lock().unwrap().create_pr_attempts += 1;
        if let Some(message) = self.failures.lock().unwrap().create_pr.pop() {
            return Err(Error::GitHubApi(message));
        }
        let mut store = self.store.lock().unwrap();
        let number = store.next_number;
        store.next_number += 1;
        let pr = PullRequest {
            number,
            html_url: format!(
                "https://github.com/{}/{}/pull/{number}",
                self.config.owner, self.config.repo
            ),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
            body: Some(String::new()),
            state: PrState::Open,
        };
        store.prs.insert(number, pr.clone());
        self.calls.lock().unwrap().created_prs.push((
            head.to_string(),
            base.to_string(),
            title.to_string(),
        ));
        Ok(pr)
    }

    async fn update_pr_base(&self, number: u64, base: &str) -> Result<PullRequest> {
        let mut store = self.store.lock().unwrap();
        let pr = store
            .prs
            .get_mut(&number)
            .ok_or_else(|| Error::GitHubApi(format!("no such PR: #{number}")))?;
        pr.base_ref = base.to_string();
        let pr = pr.clone();
        self.calls
            .lock()
            .unwrap()
            .base_updates
            .push((number, base.to_string()));
        Ok(pr)
    }

    async fn update_pr_body(&self, number: u64, body: &str) -> Result<PullRequest> {
        let mut store = self.store.lock().unwrap();
        let pr = store
            .prs
            .get_mut(&number)
            .ok_or_else(|| Error::GitHubApi(format!("no such PR: #{number}")))?;
        pr.body = Some(body.to_string());
        let pr = pr.clone();
        self.calls.lock().unwrap().body_updates.push(number);
        Ok(pr)
    }

    async fn merge_pr(&self, number: u64, method: MergeMethod) -> Result<MergeResult> {
        self.calls.lock().unwrap().merges.push((number, method));
        if let Some(message) = self.failures.lock().unwrap().merge.pop() {
            return Err(Error::GitHubApi(message));
        }
        if let Some(message) = self.failures.lock().unwrap().merge_refusal.clone() {
            return Ok(MergeResult {
                merged: false,
                sha: None,
                message: Some(message),
            });
        }
        let mut store = self.store.lock().unwrap();
        let pr = store
            .prs
            .get_mut(&number)
            .ok_or_else(|| Error::GitHubApi(format!("no such PR: #{number}")))?;
        pr.state = PrState::Merged;
        Ok(MergeResult {
            merged: true,
            sha: Some(format!("merge-of-{number}")),
            message: None,
        })
    }

    fn config(&self) -> &HostConfig {
        &self.config
    }
}
