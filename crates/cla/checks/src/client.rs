//! Code-host client contract.
//!
//! Every call carries the installation id the platform issued for the
//! organization, so one client can serve many installations.

use async_trait::async_trait;
use cla_types::constants::{CHECK_DETAILS_URL, CHECK_NAME};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code-host request failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeHostError {
    #[error("code host request failed: {0}")]
    Request(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type for code-host calls.
pub type Result<T> = std::result::Result<T, CodeHostError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestState {
    Open,
    Closed,
}

/// Pull request as returned by the code host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub author: String,
    pub head_sha: String,
    pub state: PullRequestState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    Queued,
    InProgress,
    Completed,
}

/// Check-run body sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunSpec {
    pub name: String,
    pub head_sha: String,
    pub status: CheckRunStatus,
    /// Only set on completed runs.
    pub conclusion: Option<String>,
    pub title: String,
    pub summary: String,
    pub details_url: String,
}

impl CheckRunSpec {
    /// `license/cla` run for `head_sha`.
    pub fn license(head_sha: &str, status: CheckRunStatus, title: &str, summary: &str) -> Self {
        Self {
            name: CHECK_NAME.to_string(),
            head_sha: head_sha.to_string(),
            status,
            conclusion: None,
            title: title.to_string(),
            summary: summary.to_string(),
            details_url: CHECK_DETAILS_URL.to_string(),
        }
    }

    pub fn with_conclusion(mut self, conclusion: impl Into<String>) -> Self {
        self.conclusion = Some(conclusion.into());
        self
    }
}

/// Comment in a pull-request thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: i64,
    pub author: String,
    pub body: String,
}

/// Legacy commit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub state: String,
    pub description: String,
    pub context: String,
}

/// Pull request, check-run and comment operations on the code host.
#[async_trait]
pub trait CodeHostClient: Send + Sync {
    async fn get_pull_request(
        &self,
        installation_id: i64,
        repo_id: i64,
        number: u64,
    ) -> Result<PullRequest>;

    /// Returns the id of the new check-run.
    async fn create_check_run(
        &self,
        installation_id: i64,
        repo_id: i64,
        check_run: &CheckRunSpec,
    ) -> Result<i64>;

    async fn update_check_run(
        &self,
        installation_id: i64,
        repo_id: i64,
        check_run_id: i64,
        check_run: &CheckRunSpec,
    ) -> Result<()>;

    async fn get_issue_comments(
        &self,
        installation_id: i64,
        repo_id: i64,
        number: u64,
    ) -> Result<Vec<IssueComment>>;

    async fn delete_issue_comment(
        &self,
        installation_id: i64,
        repo_id: i64,
        comment_id: i64,
    ) -> Result<()>;

    async fn create_commit_status(
        &self,
        installation_id: i64,
        organization: &str,
        repository: &str,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<()>;

    /// Name the app is installed under, if the platform reports one.
    async fn app_name(&self, organization: &str, installation_id: i64) -> Result<Option<String>>;
}
