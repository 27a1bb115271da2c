use async_trait::async_trait;
use cla_checks::{check_request, PullRequestState};
use cla_policy::needs_license;
use cla_types::{AppOutput, Check, ClaKey, ClaPolicy, StateMutations};
use std::sync::Arc;
use tracing::info;

use super::{EventHandler, Services};
use crate::error::Result;
use crate::event::{EventAction, EventContext, EventPayload, EventType, PlatformContext, PullRequestEvent};

/// Gates pull requests on a signed CLA.
pub struct PullRequestHandler {
    services: Arc<Services>,
}

impl PullRequestHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl EventHandler for PullRequestHandler {
    fn event_type(&self) -> EventType {
        EventType::PullRequest
    }

    async fn handle(&self, ctx: &EventContext) -> Result<AppOutput> {
        let EventPayload::PullRequest(pr) = &ctx.payload else {
            return Ok(AppOutput::neutral());
        };
        let Some(policy) = ctx.policy.as_policy() else {
            info!(repository = %ctx.platform.repository_name, "No CLA policy available");
            return Ok(AppOutput::neutral());
        };

        handle_pull_request(&self.services, &ctx.platform, policy, pr, &pr.head_sha).await
    }
}

/// Pull request flow for the commit `sha`.
pub(super) async fn handle_pull_request(
    services: &Services,
    platform: &PlatformContext,
    policy: &ClaPolicy,
    pr: &PullRequestEvent,
    sha: &str,
) -> Result<AppOutput> {
    let link = policy.content.as_str();

    if platform.action == EventAction::Closed {
        let mut output = AppOutput::neutral();
        if let Some(mutations) = services
            .reconciler
            .clean_up_checks(&pr.author, link, sha)
            .await?
        {
            output.state_mutations = mutations;
        }
        info!(number = pr.number, "Checks cleaned up");
        return Ok(output);
    }

    if pr.state == PullRequestState::Closed {
        info!(number = pr.number, "Not acting on closed pull request");
        return Ok(AppOutput::neutral());
    }

    let mut output = AppOutput::success();
    let check = Check::new(sha, platform.repository_id, platform.installation_id);
    let summary = policy.check_summary.as_str();

    if !needs_license(policy, &pr.contribution, pr.origin_org.as_deref()) {
        services.reconciler.create_check(true, &check, summary).await;
        output.check_request = Some(check_request(true, summary));
        return Ok(output);
    }

    let mut mutations = StateMutations::new();
    let has_cla = services
        .workflow
        .has_signed_cla(&pr.author, policy, policy.auto_sign_msft_employee, &mut mutations)
        .await?;

    output.comment = services
        .agreement_comment(platform, policy, &pr.author, pr.number, has_cla)
        .await?;

    let outcome = services.reconciler.create_check(has_cla, &check, summary).await;
    let tracked = services
        .reconciler
        .add_check_to_states(outcome.check, &pr.author, link)
        .await?;
    mutations.put_checks(ClaKey::checks_for_write(&pr.author, link), tracked);

    info!(
        number = pr.number,
        user = %pr.author,
        has_cla,
        sha,
        "CLA check evaluated"
    );

    output.check_request = Some(check_request(has_cla, summary));
    output.state_mutations = mutations;
    Ok(output)
}
