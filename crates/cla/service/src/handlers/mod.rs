//! Event handlers and their registry.

mod issue_comment;
mod legacy;
mod merge_group;
mod pull_request;
mod push;

pub use issue_comment::IssueCommentHandler;
pub use legacy::{LegacyCommentCleanup, LegacyStatusOverride};
pub use merge_group::MergeGroupHandler;
pub use pull_request::PullRequestHandler;
pub use push::PushHandler;

use async_trait::async_trait;
use cla_checks::{CheckReconciler, CodeHostClient};
use cla_ledger::ClaLedger;
use cla_types::{AppOutput, ClaPolicy, RenderedComment};
use cla_workflow::SignatureResolutionWorkflow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::comments::{CommentParams, CommentRenderer, CommentTemplate};
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::event::{EventAction, EventContext, EventType, PlatformContext};

/// Handles one event type.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> EventType;

    async fn handle(&self, ctx: &EventContext) -> Result<AppOutput>;
}

/// Handlers keyed by the event type they serve.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<EventType, Vec<Box<dyn EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H: EventHandler + 'static>(&mut self, handler: H) {
        self.handlers
            .entry(handler.event_type())
            .or_default()
            .push(Box::new(handler));
    }

    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.handlers.get(&event_type).map_or(0, Vec::len)
    }

    /// Run every handler for the event in registration order and merge
    /// their outputs. An event nobody handles concludes neutral.
    pub async fn dispatch(&self, ctx: &EventContext) -> Result<AppOutput> {
        let mut output = AppOutput::neutral();
        let Some(handlers) = self.handlers.get(&ctx.event_type()) else {
            debug!(event_type = %ctx.event_type(), "No handler registered");
            return Ok(output);
        };

        for handler in handlers {
            output.merge(handler.handle(ctx).await?);
        }
        Ok(output)
    }
}

/// Collaborators shared by all handlers.
pub struct Services {
    pub workflow: SignatureResolutionWorkflow,
    pub reconciler: CheckReconciler,
    pub client: Arc<dyn CodeHostClient>,
    pub renderer: Arc<dyn CommentRenderer>,
    pub config: ServiceConfig,
}

impl Services {
    pub fn ledger(&self) -> &ClaLedger {
        self.workflow.ledger()
    }

    /// Name the bot answers to: the installation's app name, else the
    /// configured name for the host.
    pub async fn bot_name(&self, platform: &PlatformContext) -> String {
        match self
            .client
            .app_name(&platform.organization, platform.installation_id)
            .await
        {
            Ok(Some(name)) => return name,
            Ok(None) => {}
            Err(e) => {
                warn!(
                    organization = %platform.organization,
                    installation_id = platform.installation_id,
                    error = %e,
                    "Unable to resolve app name for installation"
                );
            }
        }
        self.config.bots.name_for_host(&platform.host).to_string()
    }

    /// Agreement comment for `user` on pull request `number`.
    ///
    /// `synchronize` keeps the thread as is, a signed contributor gets no
    /// comment, and an existing bot comment is kept in the history.
    pub async fn agreement_comment(
        &self,
        platform: &PlatformContext,
        policy: &ClaPolicy,
        user: &str,
        number: u64,
        has_cla: bool,
    ) -> Result<Option<RenderedComment>> {
        if platform.action == EventAction::Synchronize {
            return Ok(Some(RenderedComment::keep_history_marker()));
        }

        if has_cla {
            return Ok(None);
        }

        let bot = self.bot_name(platform).await;
        let params = CommentParams::new(user, bot.as_str()).with_agreement(policy.content.as_str());
        let comment = self
            .renderer
            .render(CommentTemplate::Agreement, &params)
            .await?;

        if self.bot_commented(platform, number, &bot).await {
            Ok(Some(comment.keeping_history()))
        } else {
            Ok(Some(comment))
        }
    }

    async fn bot_commented(&self, platform: &PlatformContext, number: u64, bot: &str) -> bool {
        let author = format!("{}[bot]", bot);
        match self
            .client
            .get_issue_comments(platform.installation_id, platform.repository_id, number)
            .await
        {
            Ok(comments) => comments.iter().any(|c| c.author == author),
            Err(e) => {
                warn!(number, error = %e, "Unable to list pull request comments");
                false
            }
        }
    }
}
