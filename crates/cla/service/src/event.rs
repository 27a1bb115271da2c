//! Typed event model.
//!
//! The event host hands every delivery to [`crate::ClaApp`] as an
//! [`EventContext`]: the platform envelope, the event-specific payload and
//! the policy bound to the repository, if any.

use cla_checks::PullRequestState;
use cla_policy::Contribution;
use cla_types::ClaPolicy;
use serde::{Deserialize, Serialize};

/// Event types handlers register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PullRequest,
    IssueComment,
    Push,
    MergeGroup,
    Status,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::PullRequest => write!(f, "pull_request"),
            EventType::IssueComment => write!(f, "issue_comment"),
            EventType::Push => write!(f, "push"),
            EventType::MergeGroup => write!(f, "merge_group"),
            EventType::Status => write!(f, "status"),
        }
    }
}

/// Action of the delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Opened,
    Reopened,
    Synchronize,
    Closed,
    Created,
    Edited,
    Deleted,
    ChecksRequested,
    #[default]
    None,
}

/// Envelope shared by every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformContext {
    /// DNS name of the code host
    pub host: String,
    pub organization: String,
    pub repository_name: String,
    pub repository_id: i64,
    pub installation_id: i64,
    pub action: EventAction,
    /// Raised by this app's own activity
    pub is_bot_triggered: bool,
}

impl PlatformContext {
    pub fn new(
        host: impl Into<String>,
        organization: impl Into<String>,
        repository_name: impl Into<String>,
        repository_id: i64,
        installation_id: i64,
    ) -> Self {
        Self {
            host: host.into(),
            organization: organization.into(),
            repository_name: repository_name.into(),
            repository_id,
            installation_id,
            action: EventAction::None,
            is_bot_triggered: false,
        }
    }

    pub fn with_action(mut self, action: EventAction) -> Self {
        self.action = action;
        self
    }

    pub fn bot_triggered(mut self) -> Self {
        self.is_bot_triggered = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub number: u64,
    pub author: String,
    pub head_sha: String,
    pub state: PullRequestState,
    pub contribution: Contribution,
    /// Organization the head branch comes from
    pub origin_org: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    pub id: i64,
    /// `None` for comments on plain issues
    pub pr_number: Option<u64>,
    pub author: String,
    pub body: String,
}

/// A file touched by a push, with content on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushedFile {
    pub file_name: String,
    pub content_before: Option<String>,
    pub content_after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    pub repository_name: String,
    pub branch: String,
    pub default_branch: String,
    pub sender: String,
    pub files: Vec<PushedFile>,
}

impl PushEvent {
    pub fn file(&self, file_name: &str) -> Option<&PushedFile> {
        self.files.iter().find(|f| f.file_name == file_name)
    }

    pub fn targets_default_branch(&self) -> bool {
        self.branch == self.default_branch
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeGroupEvent {
    pub head_sha: String,
    pub pull_request: PullRequestEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Pending,
    Success,
    Failure,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatusEvent {
    pub sha: String,
    pub context: String,
    pub state: CommitState,
}

/// Event-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    PullRequest(PullRequestEvent),
    IssueComment(IssueCommentEvent),
    Push(PushEvent),
    MergeGroup(MergeGroupEvent),
    Status(CommitStatusEvent),
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::PullRequest(_) => EventType::PullRequest,
            EventPayload::IssueComment(_) => EventType::IssueComment,
            EventPayload::Push(_) => EventType::Push,
            EventPayload::MergeGroup(_) => EventType::MergeGroup,
            EventPayload::Status(_) => EventType::Status,
        }
    }
}

/// Policy configured for the repository, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PolicyBinding {
    #[default]
    None,
    Policy(ClaPolicy),
}

impl PolicyBinding {
    pub fn as_policy(&self) -> Option<&ClaPolicy> {
        match self {
            PolicyBinding::Policy(policy) => Some(policy),
            PolicyBinding::None => None,
        }
    }
}

impl From<Option<ClaPolicy>> for PolicyBinding {
    fn from(policy: Option<ClaPolicy>) -> Self {
        policy.map_or(PolicyBinding::None, PolicyBinding::Policy)
    }
}

/// One event delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub platform: PlatformContext,
    pub payload: EventPayload,
    pub policy: PolicyBinding,
}

impl EventContext {
    pub fn new(platform: PlatformContext, payload: EventPayload, policy: PolicyBinding) -> Self {
        Self {
            platform,
            payload,
            policy,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_follows_payload() {
        let ctx = EventContext::new(
            PlatformContext::new("github.com", "org", "repo", 1, 7),
            EventPayload::Status(CommitStatusEvent {
                sha: "abc".into(),
                context: "license/cla".into(),
                state: CommitState::Pending,
            }),
            PolicyBinding::None,
        );
        assert_eq!(ctx.event_type(), EventType::Status);
        assert!(ctx.policy.as_policy().is_none());
    }

    #[test]
    fn test_policy_binding_from_option() {
        let binding = PolicyBinding::from(Some(ClaPolicy::new("https://x.yml")));
        assert_eq!(binding.as_policy().map(|p| p.content.as_str()), Some("https://x.yml"));
    }
}
