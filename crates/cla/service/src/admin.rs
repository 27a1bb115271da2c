//! Operator overrides.

use cla_checks::{CheckOutcome, CheckReconciler};
use cla_types::constants::DEFAULT_CHECK_SUMMARY;
use cla_types::Check;
use tracing::warn;

/// Mark `check` as passing regardless of signature state.
///
/// Nothing is recorded in the store; the commit is not tracked afterwards.
pub async fn force_pass_check(
    reconciler: &CheckReconciler,
    check: &Check,
    summary: Option<&str>,
) -> CheckOutcome {
    warn!(
        sha = %check.sha,
        repo_id = check.repo_id,
        installation_id = check.installation_id,
        "Forcing passing CLA check"
    );
    reconciler
        .create_check(true, check, summary.unwrap_or(DEFAULT_CHECK_SUMMARY))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use cla_checks::{CheckRunStatus, MockCodeHost};
    use cla_ledger::InMemoryStateStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_force_pass_creates_completed_check() {
        let host = Arc::new(MockCodeHost::new());
        let store = Arc::new(InMemoryStateStore::new());
        let reconciler = CheckReconciler::new(host.clone(), store.clone());

        let outcome = force_pass_check(&reconciler, &Check::new("abc", 5, 9), None).await;

        assert!(outcome.ok);
        let created = host.created_check_runs();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].repo_id, 5);
        assert_eq!(created[0].spec.status, CheckRunStatus::Completed);
        assert_eq!(created[0].spec.summary, DEFAULT_CHECK_SUMMARY);
        assert!(store.is_empty());
    }
}
