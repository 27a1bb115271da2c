//! Mock code host for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::client::{
    CheckRunSpec, CodeHostClient, CodeHostError, CommitStatus, IssueComment, PullRequest, Result,
};

/// A check-run the mock has seen, created or updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCheckRun {
    pub installation_id: i64,
    pub repo_id: i64,
    pub check_run_id: i64,
    pub spec: CheckRunSpec,
}

#[derive(Default)]
struct MockState {
    pull_requests: HashMap<(i64, u64), PullRequest>,
    comments: HashMap<(i64, u64), Vec<IssueComment>>,
    failing_shas: HashSet<String>,
    fail_updates: bool,
    app_name: Option<String>,
    created: Vec<RecordedCheckRun>,
    updated: Vec<RecordedCheckRun>,
    deleted_comments: Vec<i64>,
    statuses: Vec<(String, CommitStatus)>,
}

/// In-process [`CodeHostClient`] recording every call.
pub struct MockCodeHost {
    state: Mutex<MockState>,
    next_id: AtomicI64,
}

impl Default for MockCodeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCodeHost {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            next_id: AtomicI64::new(1000),
        }
    }

    pub fn with_pull_request(self, repo_id: i64, pull_request: PullRequest) -> Self {
        self.with_state(|s| {
            s.pull_requests
                .insert((repo_id, pull_request.number), pull_request);
        });
        self
    }

    pub fn with_comment(self, repo_id: i64, number: u64, comment: IssueComment) -> Self {
        self.with_state(|s| s.comments.entry((repo_id, number)).or_default().push(comment));
        self
    }

    /// Fail check-run creation for `sha`.
    pub fn failing_sha(self, sha: &str) -> Self {
        self.with_state(|s| {
            s.failing_shas.insert(sha.to_string());
        });
        self
    }

    /// Fail every check-run update.
    pub fn failing_updates(self) -> Self {
        self.with_state(|s| s.fail_updates = true);
        self
    }

    pub fn with_app_name(self, name: &str) -> Self {
        self.with_state(|s| s.app_name = Some(name.to_string()));
        self
    }

    pub fn created_check_runs(&self) -> Vec<RecordedCheckRun> {
        self.read(|s| s.created.clone())
    }

    pub fn updated_check_runs(&self) -> Vec<RecordedCheckRun> {
        self.read(|s| s.updated.clone())
    }

    pub fn deleted_comments(&self) -> Vec<i64> {
        self.read(|s| s.deleted_comments.clone())
    }

    pub fn commit_statuses(&self) -> Vec<(String, CommitStatus)> {
        self.read(|s| s.statuses.clone())
    }

    fn with_state(&self, f: impl FnOnce(&mut MockState)) {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }

    fn read<T: Default>(&self, f: impl FnOnce(&MockState) -> T) -> T {
        self.state.lock().map(|s| f(&s)).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| CodeHostError::Request("mock lock poisoned".to_string()))
    }
}

#[async_trait]
impl CodeHostClient for MockCodeHost {
    async fn get_pull_request(
        &self,
        _installation_id: i64,
        repo_id: i64,
        number: u64,
    ) -> Result<PullRequest> {
        self.lock()?
            .pull_requests
            .get(&(repo_id, number))
            .cloned()
            .ok_or_else(|| CodeHostError::NotFound(format!("pull request {}", number)))
    }

    async fn create_check_run(
        &self,
        installation_id: i64,
        repo_id: i64,
        check_run: &CheckRunSpec,
    ) -> Result<i64> {
        let mut state = self.lock()?;
        if state.failing_shas.contains(&check_run.head_sha) {
            return Err(CodeHostError::Request(format!(
                "simulated failure for {}",
                check_run.head_sha
            )));
        }
        let check_run_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        state.created.push(RecordedCheckRun {
            installation_id,
            repo_id,
            check_run_id,
            spec: check_run.clone(),
        });
        Ok(check_run_id)
    }

    async fn update_check_run(
        &self,
        installation_id: i64,
        repo_id: i64,
        check_run_id: i64,
        check_run: &CheckRunSpec,
    ) -> Result<()> {
        let mut state = self.lock()?;
        if state.fail_updates {
            return Err(CodeHostError::NotFound(format!("check run {}", check_run_id)));
        }
        state.updated.push(RecordedCheckRun {
            installation_id,
            repo_id,
            check_run_id,
            spec: check_run.clone(),
        });
        Ok(())
    }

    async fn get_issue_comments(
        &self,
        _installation_id: i64,
        repo_id: i64,
        number: u64,
    ) -> Result<Vec<IssueComment>> {
        Ok(self
            .lock()?
            .comments
            .get(&(repo_id, number))
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_issue_comment(
        &self,
        _installation_id: i64,
        _repo_id: i64,
        comment_id: i64,
    ) -> Result<()> {
        self.lock()?.deleted_comments.push(comment_id);
        Ok(())
    }

    async fn create_commit_status(
        &self,
        _installation_id: i64,
        _organization: &str,
        _repository: &str,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<()> {
        self.lock()?.statuses.push((sha.to_string(), status.clone()));
        Ok(())
    }

    async fn app_name(&self, _organization: &str, _installation_id: i64) -> Result<Option<String>> {
        Ok(self.lock()?.app_name.clone())
    }
}
