use async_trait::async_trait;
use cla_commands::{bot_mention, parse, CommentAction};
use cla_ledger::{ClaLedger, Termination};
use cla_types::{AppOutput, ClaKey, ClaPolicy, StateMutations};
use std::sync::Arc;
use tracing::info;

use super::{EventHandler, Services};
use crate::audit::{self, SignLocation};
use crate::comments::{CommentParams, CommentTemplate};
use crate::error::Result;
use crate::event::{EventContext, EventPayload, EventType, IssueCommentEvent, PlatformContext};

/// Signs or terminates agreements from pull request comments.
pub struct IssueCommentHandler {
    services: Arc<Services>,
}

impl IssueCommentHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    /// Only the pull request author may sign through it. A failed lookup
    /// counts as a mismatch.
    async fn is_pull_request_author(&self, platform: &PlatformContext, number: u64, user: &str) -> bool {
        match self
            .services
            .client
            .get_pull_request(platform.installation_id, platform.repository_id, number)
            .await
        {
            Ok(pr) => pr.author == user,
            Err(e) => {
                info!(
                    number,
                    repository = %platform.repository_name,
                    error = %e,
                    "Unable to get pull request"
                );
                false
            }
        }
    }

    async fn agree(
        &self,
        platform: &PlatformContext,
        policy: &ClaPolicy,
        comment: &IssueCommentEvent,
        number: u64,
        company: Option<&str>,
        mutations: &mut StateMutations,
    ) -> Result<()> {
        let user = comment.author.as_str();
        let link = policy.content.as_str();
        let ledger = self.services.ledger();

        // An incomplete employee record does not count as a signature.
        if let Some(existing) = ledger.read_cla(user, link).await? {
            if existing.is_active() && !existing.is_incomplete() {
                info!(user, "CLA already signed");
                return Ok(());
            }
        }

        let cla = ledger.create_cla(false, user, company, link, None, mutations);
        if let Some(checks) = self
            .services
            .reconciler
            .update_checks(true, user, link, &policy.check_summary)
            .await?
        {
            mutations.put_checks(ClaKey::checks_for_write(user, link), checks);
        }

        info!(
            cla = %cla,
            organization = %platform.organization,
            repository = %platform.repository_name,
            number,
            "CLA signed"
        );
        audit::log_cla_signed(&cla, user, location(platform, number));
        Ok(())
    }

    async fn terminate(
        &self,
        platform: &PlatformContext,
        policy: &ClaPolicy,
        comment: &IssueCommentEvent,
        number: u64,
        output: &mut AppOutput,
    ) -> Result<()> {
        let user = comment.author.as_str();
        let link = policy.content.as_str();

        let Some(cla) = self
            .services
            .ledger()
            .expire_cla(user, link, Termination::SelfService)
            .await?
        else {
            return Ok(());
        };

        ClaLedger::queue_cla(&mut output.state_mutations, user, link, cla.clone());
        output.comment = self
            .services
            .agreement_comment(platform, policy, user, number, false)
            .await?;

        if let Some(checks) = self
            .services
            .reconciler
            .update_checks(false, user, link, &policy.check_summary)
            .await?
        {
            output
                .state_mutations
                .put_checks(ClaKey::checks_for_write(user, link), checks);
        }

        info!(cla = %cla, "CLA terminated");
        audit::log_cla_terminated(&cla, user, location(platform, number));
        Ok(())
    }
}

#[async_trait]
impl EventHandler for IssueCommentHandler {
    fn event_type(&self) -> EventType {
        EventType::IssueComment
    }

    async fn handle(&self, ctx: &EventContext) -> Result<AppOutput> {
        let EventPayload::IssueComment(comment) = &ctx.payload else {
            return Ok(AppOutput::neutral());
        };
        let platform = &ctx.platform;

        if platform.is_bot_triggered {
            return Ok(AppOutput::neutral());
        }
        let Some(number) = comment.pr_number else {
            return Ok(AppOutput::neutral());
        };
        let Some(policy) = ctx.policy.as_policy() else {
            info!(repository = %platform.repository_name, "No CLA policy available");
            return Ok(AppOutput::neutral());
        };

        if !self
            .is_pull_request_author(platform, number, &comment.author)
            .await
        {
            info!(user = %comment.author, number, "Sender not pull request author, ignoring");
            return Ok(AppOutput::neutral());
        }

        let bot = self.services.bot_name(platform).await;
        let command = parse(
            &comment.body,
            &bot_mention(&bot),
            policy.prohibited_companies.as_slice(),
        );

        let mut output = AppOutput::success();
        match command.action {
            CommentAction::Agree => {
                self.agree(
                    platform,
                    policy,
                    comment,
                    number,
                    command.company(),
                    &mut output.state_mutations,
                )
                .await?;
            }
            CommentAction::Terminate => {
                self.terminate(platform, policy, comment, number, &mut output)
                    .await?;
            }
            CommentAction::Failure => {
                let params = CommentParams::new(comment.author.as_str(), bot.as_str());
                output.comment = Some(
                    self.services
                        .renderer
                        .render(CommentTemplate::Error, &params)
                        .await?,
                );
                info!(user = %comment.author, "Failed CLA sign attempt");
            }
            CommentAction::BlockedCompany => {
                let params = CommentParams::new(comment.author.as_str(), bot.as_str())
                    .with_company(command.company.as_str());
                output.comment = Some(
                    self.services
                        .renderer
                        .render(CommentTemplate::BlockedCompany, &params)
                        .await?,
                );
                info!(
                    user = %comment.author,
                    company = %command.company,
                    "Failed CLA sign attempt on behalf of company"
                );
            }
            CommentAction::Noop => {}
        }

        Ok(output)
    }
}

fn location(platform: &PlatformContext, number: u64) -> SignLocation<'_> {
    SignLocation::PullRequest {
        organization: &platform.organization,
        repository: &platform.repository_name,
        number,
    }
}
