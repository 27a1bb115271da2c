//! Cleanup after a previously installed CLA app.
//!
//! Both handlers are inert unless `legacy.enabled` is set.

use async_trait::async_trait;
use cla_checks::CommitStatus;
use cla_types::constants::{CHECK_NAME, CHECK_SUCCESS_TITLE};
use cla_types::AppOutput;
use std::sync::Arc;
use tracing::info;

use super::{EventHandler, Services};
use crate::error::Result;
use crate::event::{CommitState, EventAction, EventContext, EventPayload, EventType};

/// Deletes comments posted by the legacy app.
pub struct LegacyCommentCleanup {
    services: Arc<Services>,
}

impl LegacyCommentCleanup {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl EventHandler for LegacyCommentCleanup {
    fn event_type(&self) -> EventType {
        EventType::IssueComment
    }

    async fn handle(&self, ctx: &EventContext) -> Result<AppOutput> {
        let EventPayload::IssueComment(comment) = &ctx.payload else {
            return Ok(AppOutput::neutral());
        };
        let legacy = &self.services.config.legacy;

        if !legacy.enabled || ctx.platform.action == EventAction::Deleted {
            return Ok(AppOutput::neutral());
        }
        if comment.author != format!("{}[bot]", legacy.app_name) {
            return Ok(AppOutput::neutral());
        }

        self.services
            .client
            .delete_issue_comment(
                ctx.platform.installation_id,
                ctx.platform.repository_id,
                comment.id,
            )
            .await?;
        info!(comment_id = comment.id, author = %comment.author, "Legacy comment deleted");
        Ok(AppOutput::success())
    }
}

/// Overrides failing `license/cla` commit statuses left by the legacy app.
pub struct LegacyStatusOverride {
    services: Arc<Services>,
}

impl LegacyStatusOverride {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl EventHandler for LegacyStatusOverride {
    fn event_type(&self) -> EventType {
        EventType::Status
    }

    async fn handle(&self, ctx: &EventContext) -> Result<AppOutput> {
        let EventPayload::Status(status) = &ctx.payload else {
            return Ok(AppOutput::neutral());
        };
        if ctx.policy.as_policy().is_none()
            || !self.services.config.legacy.enabled
            || ctx.platform.is_bot_triggered
        {
            return Ok(AppOutput::neutral());
        }
        if status.context != CHECK_NAME || status.state == CommitState::Success {
            return Ok(AppOutput::neutral());
        }

        info!(sha = %status.sha, context = %status.context, "Status received from legacy app");
        let success = CommitStatus {
            state: "success".to_string(),
            description: CHECK_SUCCESS_TITLE.to_string(),
            context: CHECK_NAME.to_string(),
        };
        self.services
            .client
            .create_commit_status(
                ctx.platform.installation_id,
                &ctx.platform.organization,
                &ctx.platform.repository_name,
                &status.sha,
                &success,
            )
            .await?;
        info!(sha = %status.sha, "Legacy status overridden");
        Ok(AppOutput::neutral())
    }
}
