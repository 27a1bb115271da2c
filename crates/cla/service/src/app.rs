//! Composition root.

use cla_checks::{CheckOutcome, CheckReconciler, CodeHostClient};
use cla_identity::{EmploymentDirectory, EmploymentVerifier, IdentityResolver, LinkResolver};
use cla_ledger::{ClaLedger, StateStore};
use cla_types::{AppOutput, Check};
use cla_workflow::SignatureResolutionWorkflow;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::admin;
use crate::comments::CommentRenderer;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::event::EventContext;
use crate::handlers::{
    HandlerRegistry, IssueCommentHandler, LegacyCommentCleanup, LegacyStatusOverride,
    MergeGroupHandler, PullRequestHandler, PushHandler, Services,
};

/// External systems the app talks to.
pub struct Collaborators {
    pub store: Arc<dyn StateStore>,
    pub identity: Arc<dyn IdentityResolver>,
    pub employment: Arc<dyn EmploymentDirectory>,
    pub code_host: Arc<dyn CodeHostClient>,
    pub renderer: Arc<dyn CommentRenderer>,
}

/// The CLA app: wires collaborators into handlers and runs events through
/// them.
pub struct ClaApp {
    services: Arc<Services>,
    registry: HandlerRegistry,
    store: Arc<dyn StateStore>,
}

impl ClaApp {
    pub fn new(config: ServiceConfig, collaborators: Collaborators) -> Self {
        let retry = config.retry.policy();
        let ledger = Arc::new(ClaLedger::new(collaborators.store.clone()));
        let workflow = SignatureResolutionWorkflow::new(
            ledger,
            LinkResolver::new(collaborators.identity, retry),
            EmploymentVerifier::new(collaborators.employment, retry),
        );
        let reconciler =
            CheckReconciler::new(collaborators.code_host.clone(), collaborators.store.clone());

        let services = Arc::new(Services {
            workflow,
            reconciler,
            client: collaborators.code_host,
            renderer: collaborators.renderer,
            config,
        });

        let mut registry = HandlerRegistry::new();
        registry.register(PullRequestHandler::new(services.clone()));
        registry.register(IssueCommentHandler::new(services.clone()));
        registry.register(LegacyCommentCleanup::new(services.clone()));
        registry.register(PushHandler::new(services.clone()));
        registry.register(MergeGroupHandler::new(services.clone()));
        registry.register(LegacyStatusOverride::new(services.clone()));

        info!(legacy = services.config.legacy.enabled, "CLA app initialized");

        Self {
            services,
            registry,
            store: collaborators.store,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.services.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Decide on one event. Nothing is written; the caller persists the
    /// returned mutations.
    pub async fn handle(&self, ctx: &EventContext) -> Result<AppOutput> {
        let span = info_span!(
            "cla_event",
            event_type = %ctx.event_type(),
            request_id = %Uuid::new_v4(),
            organization = %ctx.platform.organization,
            repository = %ctx.platform.repository_name,
        );

        async {
            let output = self.registry.dispatch(ctx).await?;
            debug!(
                conclusion = %output.conclusion,
                mutations = output.state_mutations.len(),
                "Event handled"
            );
            Ok(output)
        }
        .instrument(span)
        .await
    }

    /// Write the mutations of `output` as one batch.
    pub async fn persist(&self, output: &AppOutput) -> Result<()> {
        if output.state_mutations.is_empty() {
            return Ok(());
        }
        self.store.write_batch(&output.state_mutations).await?;
        Ok(())
    }

    /// Handle and persist.
    pub async fn process(&self, ctx: &EventContext) -> Result<AppOutput> {
        let output = self.handle(ctx).await?;
        self.persist(&output).await?;
        Ok(output)
    }

    /// Mark a commit's check as passing without consulting the ledger.
    pub async fn force_pass_check(&self, check: &Check, summary: Option<&str>) -> CheckOutcome {
        admin::force_pass_check(&self.services.reconciler, check, summary).await
    }
}
