use async_trait::async_trait;
use cla_ledger::{ClaLedger, Termination};
use cla_types::{AppOutput, ClaKey};
use std::sync::Arc;
use tracing::info;

use super::{EventHandler, Services};
use crate::audit::{self, SignLocation};
use crate::error::Result;
use crate::event::{EventContext, EventPayload, EventType};

/// Signs and terminates on behalf of companies when their roster file
/// changes on the default branch.
pub struct PushHandler {
    services: Arc<Services>,
}

impl PushHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl EventHandler for PushHandler {
    fn event_type(&self) -> EventType {
        EventType::Push
    }

    async fn handle(&self, ctx: &EventContext) -> Result<AppOutput> {
        let EventPayload::Push(push) = &ctx.payload else {
            return Ok(AppOutput::neutral());
        };
        let Some(policy) = ctx.policy.as_policy() else {
            info!(repository = %ctx.platform.repository_name, "No CLA policy available");
            return Ok(AppOutput::neutral());
        };

        let Some(roster) = policy.roster_for(&push.repository_name) else {
            info!(repository = %push.repository_name, "Not a roster repository");
            return Ok(AppOutput::neutral());
        };
        let Some(file) = push.file(&roster.file_name) else {
            info!(file = %roster.file_name, "Roster file not changed");
            return Ok(AppOutput::neutral());
        };
        if !push.targets_default_branch() {
            info!(branch = %push.branch, "Change was not pushed to default branch");
            return Ok(AppOutput::neutral());
        }

        let diff = cla_roster::diff(file.content_before.as_deref(), file.content_after.as_deref());
        let link = policy.content.as_str();
        let company = roster.company_name.as_str();
        let summary = policy.check_summary.as_str();
        let ledger = self.services.ledger();
        let reconciler = &self.services.reconciler;

        let (mut mutations, clas) = ledger.create_clas_bulk(&diff.added, company, link);

        for user in &diff.removed {
            if let Some(checks) = reconciler.update_checks(false, user, link, summary).await? {
                mutations.put_checks(ClaKey::checks_for_write(user, link), checks);
            }

            let Some(cla) = ledger
                .expire_cla(user, link, Termination::Administrative)
                .await?
            else {
                continue;
            };
            ClaLedger::queue_cla(&mut mutations, user, link, cla.clone());
            info!(user = %user, company, sender = %push.sender, "CLA terminated on behalf of company");
            audit::log_cla_terminated(&cla, &push.sender, SignLocation::PreSigned);
        }

        for cla in &clas {
            let user = cla.github_user.as_str();
            if let Some(checks) = reconciler.update_checks(true, user, link, summary).await? {
                mutations.put_checks(ClaKey::checks_for_write(user, link), checks);
            }
            info!(user, company, sender = %push.sender, "CLA signed on behalf of company");
            audit::log_cla_signed(cla, &push.sender, SignLocation::PreSigned);
        }

        let mut output = AppOutput::success();
        output.state_mutations = mutations;
        Ok(output)
    }
}
