//! Check-run reconciliation for a contributor's pending commits.
//!
//! Each contributor has a tracked list of [`Check`]s per agreement, stored
//! under `Check-<key>`. Whenever the signature state changes every tracked
//! commit gets a check-run reflecting it. Transport failures are isolated per
//! commit and reported as a [`CheckOutcome`]; only store failures are errors.

use cla_ledger::{read_state, StateStore, StorageResult};
use cla_types::constants::{CHECK_IN_PROGRESS_TITLE, CHECK_SUCCESS_TITLE};
use cla_types::{Check, CheckRequest, ClaKey, Conclusion, StateMutations};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::{CheckRunSpec, CheckRunStatus, CodeHostClient};

/// Result of reconciling one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub ok: bool,
    pub error: Option<String>,
    /// The commit, carrying the check-run id once one is known.
    pub check: Check,
}

impl CheckOutcome {
    fn success(check: Check) -> Self {
        Self {
            ok: true,
            error: None,
            check,
        }
    }

    fn failure(check: Check, error: String) -> Self {
        Self {
            ok: false,
            error: Some(error),
            check,
        }
    }
}

/// Creates and updates `license/cla` check-runs and tracks pending commits.
pub struct CheckReconciler {
    client: Arc<dyn CodeHostClient>,
    store: Arc<dyn StateStore>,
}

impl CheckReconciler {
    pub fn new(client: Arc<dyn CodeHostClient>, store: Arc<dyn StateStore>) -> Self {
        Self { client, store }
    }

    /// Make the check-run of `check` reflect `has_cla`.
    ///
    /// A known check-run is updated in place; if that fails a new one is
    /// created.
    pub async fn create_check(&self, has_cla: bool, check: &Check, summary: &str) -> CheckOutcome {
        let spec = check_run_spec(has_cla, &check.sha, summary);

        if let Some(check_run_id) = check.check_run_id {
            match self
                .client
                .update_check_run(check.installation_id, check.repo_id, check_run_id, &spec)
                .await
            {
                Ok(()) => {
                    debug!(sha = %check.sha, check_run_id, has_cla, "Check updated");
                    return CheckOutcome::success(check.clone());
                }
                Err(e) => {
                    warn!(sha = %check.sha, check_run_id, error = %e, "Unable to update check, creating a new one");
                }
            }
        }

        match self
            .client
            .create_check_run(check.installation_id, check.repo_id, &spec)
            .await
        {
            Ok(check_run_id) => {
                debug!(sha = %check.sha, check_run_id, has_cla, "Check created");
                CheckOutcome::success(check.clone().with_check_run(check_run_id))
            }
            Err(e) => {
                info!(sha = %check.sha, error = %e, "Unable to create check");
                CheckOutcome::failure(check.clone(), e.to_string())
            }
        }
    }

    /// Reconcile every tracked commit of `user`.
    ///
    /// Returns the commits whose check-run was written, or `None` when
    /// nothing is tracked.
    pub async fn update_checks(
        &self,
        has_cla: bool,
        user: &str,
        agreement_link: &str,
        summary: &str,
    ) -> StorageResult<Option<Vec<Check>>> {
        let Some(tracked) = self.tracked_checks(user, agreement_link).await? else {
            return Ok(None);
        };

        let outcomes = join_all(
            tracked
                .iter()
                .map(|check| self.create_check(has_cla, check, summary)),
        )
        .await;

        let total = outcomes.len();
        let updated: Vec<Check> = outcomes
            .into_iter()
            .filter(|o| o.ok)
            .map(|o| o.check)
            .collect();

        info!(user, has_cla, total, updated = updated.len(), "Checks reconciled");
        Ok(Some(updated))
    }

    /// Tracked list of `user` with `check` added.
    ///
    /// An entry for the same commit is replaced.
    pub async fn add_check_to_states(
        &self,
        check: Check,
        user: &str,
        agreement_link: &str,
    ) -> StorageResult<Vec<Check>> {
        let mut checks = self
            .tracked_checks(user, agreement_link)
            .await?
            .unwrap_or_default();
        checks.retain(|c| !c.same_commit(&check));
        checks.push(check);
        Ok(checks)
    }

    /// Write that drops `current_sha` from the tracked list of `user`.
    pub async fn clean_up_checks(
        &self,
        user: &str,
        agreement_link: &str,
        current_sha: &str,
    ) -> StorageResult<Option<StateMutations>> {
        let Some(mut checks) = self.tracked_checks(user, agreement_link).await? else {
            return Ok(None);
        };
        checks.retain(|c| c.sha != current_sha);

        let mut mutations = StateMutations::new();
        mutations.put_checks(ClaKey::checks_for_write(user, agreement_link), checks);
        Ok(Some(mutations))
    }

    async fn tracked_checks(
        &self,
        user: &str,
        agreement_link: &str,
    ) -> StorageResult<Option<Vec<Check>>> {
        let key = ClaKey::checks_for_read(user, agreement_link);
        read_state(self.store.as_ref(), &key).await
    }
}

/// Check output for the event's own commit.
pub fn check_request(has_cla: bool, summary: &str) -> CheckRequest {
    CheckRequest {
        title: check_title(has_cla).to_string(),
        summary: summary.to_string(),
        conclusion: if has_cla {
            Conclusion::Success
        } else {
            Conclusion::Failure
        },
    }
}

fn check_title(has_cla: bool) -> &'static str {
    if has_cla {
        CHECK_SUCCESS_TITLE
    } else {
        CHECK_IN_PROGRESS_TITLE
    }
}

fn check_run_spec(has_cla: bool, sha: &str, summary: &str) -> CheckRunSpec {
    if has_cla {
        CheckRunSpec::license(sha, CheckRunStatus::Completed, check_title(true), summary)
            .with_conclusion("success")
    } else {
        CheckRunSpec::license(sha, CheckRunStatus::Queued, check_title(false), summary)
    }
}
