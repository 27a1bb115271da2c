use async_trait::async_trait;
use cla_types::AppOutput;
use std::sync::Arc;
use tracing::info;

use super::pull_request::handle_pull_request;
use super::{EventHandler, Services};
use crate::error::Result;
use crate::event::{EventContext, EventPayload, EventType};

/// Runs the pull request flow against the merge queue's head commit.
pub struct MergeGroupHandler {
    services: Arc<Services>,
}

impl MergeGroupHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl EventHandler for MergeGroupHandler {
    fn event_type(&self) -> EventType {
        EventType::MergeGroup
    }

    async fn handle(&self, ctx: &EventContext) -> Result<AppOutput> {
        let EventPayload::MergeGroup(group) = &ctx.payload else {
            return Ok(AppOutput::neutral());
        };
        let Some(policy) = ctx.policy.as_policy() else {
            info!(repository = %ctx.platform.repository_name, "No CLA policy available");
            return Ok(AppOutput::neutral());
        };

        handle_pull_request(
            &self.services,
            &ctx.platform,
            policy,
            &group.pull_request,
            &group.head_sha,
        )
        .await
    }
}
