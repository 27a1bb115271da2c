//! Signature record lifecycle.

use chrono::Utc;
use cla_types::{ClaKey, SignedCla, StateMutations};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::Result;
use crate::store::{read_state, StateStore};

/// Who is terminating a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The contributor, through a `terminate` comment.
    SelfService,
    /// Roster removal or failed re-verification.
    Administrative,
}

/// Creates, reads and expires signature records.
///
/// Writes are never applied directly: every new or changed record is queued
/// in the caller's [`StateMutations`] under the write key.
pub struct ClaLedger {
    store: Arc<dyn StateStore>,
}

impl ClaLedger {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Current record of `user` for the agreement, if any.
    pub async fn read_cla(&self, user: &str, agreement_link: &str) -> Result<Option<SignedCla>> {
        let key = ClaKey::for_read(user, agreement_link);
        Ok(read_state(self.store.as_ref(), &key).await?)
    }

    /// Sign for `user` now and queue the write.
    pub fn create_cla(
        &self,
        is_employee: bool,
        user: &str,
        company: Option<&str>,
        agreement_link: &str,
        corporate_mail: Option<&str>,
        mutations: &mut StateMutations,
    ) -> SignedCla {
        let cla = SignedCla {
            github_user: user.to_string(),
            company: company.map(str::to_string),
            msft_mail: corporate_mail.map(str::to_string),
            employee: is_employee,
            signed_at: Utc::now(),
            expires_at: None,
            can_self_terminate: true,
        };

        debug!(user, employee = is_employee, "Created CLA record");
        Self::queue_cla(mutations, user, agreement_link, cla.clone());
        cla
    }

    /// Sign for every roster user on behalf of `company`.
    ///
    /// These records cannot be terminated by the contributor.
    pub fn create_clas_bulk(
        &self,
        users: &[String],
        company: &str,
        agreement_link: &str,
    ) -> (StateMutations, Vec<SignedCla>) {
        let mut mutations = StateMutations::new();
        let signed_at = Utc::now();

        let clas = users
            .iter()
            .map(|user| {
                let cla = SignedCla {
                    github_user: user.clone(),
                    company: Some(company.to_string()),
                    msft_mail: None,
                    employee: false,
                    signed_at,
                    expires_at: None,
                    can_self_terminate: false,
                };
                Self::queue_cla(&mut mutations, user, agreement_link, cla.clone());
                cla
            })
            .collect();

        (mutations, clas)
    }

    /// Mark the record of `user` expired now.
    ///
    /// Returns `None` when there is nothing to expire or a self-service
    /// termination hits a roster-signed record. The caller persists the
    /// returned record.
    pub async fn expire_cla(
        &self,
        user: &str,
        agreement_link: &str,
        termination: Termination,
    ) -> Result<Option<SignedCla>> {
        let Some(mut cla) = self.read_cla(user, agreement_link).await? else {
            error!(user, "No CLA to terminate");
            return Ok(None);
        };

        if termination == Termination::SelfService && !cla.can_self_terminate {
            error!(user, "This CLA cannot be terminated by the user");
            return Ok(None);
        }

        cla.expire(Utc::now());
        Ok(Some(cla))
    }

    /// Queue `cla` at the write key of `user`.
    pub fn queue_cla(
        mutations: &mut StateMutations,
        user: &str,
        agreement_link: &str,
        cla: SignedCla,
    ) {
        mutations.put_cla(ClaKey::for_write(user, agreement_link), cla);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStateStore;

    const LINK: &str = "https://cla.example/agreement.yml";

    async fn ledger_with(records: Vec<SignedCla>) -> (Arc<InMemoryStateStore>, ClaLedger) {
        let store = Arc::new(InMemoryStateStore::new());
        let mut mutations = StateMutations::new();
        for cla in records {
            let user = cla.github_user.clone();
            ClaLedger::queue_cla(&mut mutations, &user, LINK, cla);
        }
        store.write_batch(&mutations).await.unwrap();
        let ledger = ClaLedger::new(store.clone());
        (store, ledger)
    }

    #[tokio::test]
    async fn test_create_cla_queues_write() {
        let (_, ledger) = ledger_with(vec![]).await;
        let mut mutations = StateMutations::new();

        let cla = ledger.create_cla(false, "alice", Some("Contoso"), LINK, None, &mut mutations);

        assert!(cla.is_active());
        assert!(cla.can_self_terminate);
        assert_eq!(cla.company.as_deref(), Some("Contoso"));
        assert_eq!(mutations.cla(&ClaKey::for_write("alice", LINK)), Some(&cla));
    }

    #[tokio::test]
    async fn test_bulk_records_cannot_self_terminate() {
        let (_, ledger) = ledger_with(vec![]).await;
        let users = vec!["alice".to_string(), "bob".to_string()];

        let (mutations, clas) = ledger.create_clas_bulk(&users, "Contoso", LINK);

        assert_eq!(clas.len(), 2);
        assert_eq!(mutations.len(), 2);
        assert!(clas.iter().all(|c| !c.can_self_terminate && !c.employee));
        assert!(clas.iter().all(|c| c.company.as_deref() == Some("Contoso")));
    }

    #[tokio::test]
    async fn test_roster_record_rejects_self_termination() {
        let (_, bulk) = ledger_with(vec![]).await;
        let (_, clas) = bulk.create_clas_bulk(&["alice".to_string()], "Contoso", LINK);
        let (_, ledger) = ledger_with(clas).await;

        let self_service = ledger
            .expire_cla("alice", LINK, Termination::SelfService)
            .await
            .unwrap();
        assert!(self_service.is_none());

        let administrative = ledger
            .expire_cla("alice", LINK, Termination::Administrative)
            .await
            .unwrap()
            .unwrap();
        assert!(!administrative.is_active());
    }

    #[tokio::test]
    async fn test_expire_missing_record() {
        let (_, ledger) = ledger_with(vec![]).await;
        let expired = ledger
            .expire_cla("nobody", LINK, Termination::Administrative)
            .await
            .unwrap();
        assert!(expired.is_none());
    }

    #[tokio::test]
    async fn test_bracketed_login_written_then_read() {
        let store = Arc::new(InMemoryStateStore::new());
        let mut mutations = StateMutations::new();
        let ledger = ClaLedger::new(store.clone());
        let cla = ledger.create_cla(false, "renovate[bot]", None, LINK, None, &mut mutations);
        store.write_batch(&mutations).await.unwrap();

        let read = ledger.read_cla("renovate[bot]", LINK).await.unwrap();
        assert_eq!(read, Some(cla));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (store, ledger) = ledger_with(vec![]).await;
        store.set_unavailable(true);
        assert!(ledger.read_cla("alice", LINK).await.is_err());
    }
}
