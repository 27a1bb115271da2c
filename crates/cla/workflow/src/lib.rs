//! # CLA Workflow
//!
//! Answers "has this contributor satisfied the CLA requirement right now".
//!
//! ```text
//! lookup ──absent / incomplete / expired employee──► try auto-sign
//!   │                                                   │
//!   ▼                                                   ▼
//! external record ──► signed iff not expired       employee record
//!                                                       │
//!                                   verify employment ──┤
//!                                        fails ──► re-resolve once,
//!                                                  else expire
//! ```
//!
//! Employee status can change between contributions, so employee records
//! are re-verified on every evaluation. External signatures stand until
//! they expire. Every record written along the way is queued in the
//! caller's batch.

#![deny(unsafe_code)]

use chrono::Utc;
use cla_identity::{EmploymentVerifier, LinkResolver};
use cla_ledger::{ClaLedger, LedgerError};
use cla_types::{ClaPolicy, SignedCla, StateMutations};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Workflow failure. Lookups never fail; only the ledger can.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

enum AutoSign {
    Disabled,
    Unlinked,
    Signed(SignedCla),
}

/// Orchestrates ledger, identity linking and employment verification.
pub struct SignatureResolutionWorkflow {
    ledger: Arc<ClaLedger>,
    links: LinkResolver,
    verifier: EmploymentVerifier,
}

impl SignatureResolutionWorkflow {
    pub fn new(ledger: Arc<ClaLedger>, links: LinkResolver, verifier: EmploymentVerifier) -> Self {
        Self {
            ledger,
            links,
            verifier,
        }
    }

    pub fn ledger(&self) -> &Arc<ClaLedger> {
        &self.ledger
    }

    /// Whether `user` currently holds a valid signature for the policy's
    /// agreement. `auto_sign` enables signing for linked employees.
    pub async fn has_signed_cla(
        &self,
        user: &str,
        policy: &ClaPolicy,
        auto_sign: bool,
        mutations: &mut StateMutations,
    ) -> Result<bool> {
        let link = policy.content.as_str();
        let existing = self.ledger.read_cla(user, link).await?;

        let cla = match existing {
            Some(cla) if !needs_auto_sign(&cla) => cla,
            existing => match self
                .try_auto_sign(user, link, auto_sign, existing, mutations)
                .await
            {
                AutoSign::Signed(cla) => cla,
                AutoSign::Disabled | AutoSign::Unlinked => return Ok(false),
            },
        };

        if !cla.employee {
            return Ok(cla.is_active());
        }

        if self.verifier.is_still_employed(&cla).await {
            return Ok(true);
        }

        info!(user, "Employee record no longer verifies, re-resolving");
        match self
            .try_auto_sign(user, link, auto_sign, Some(cla.clone()), mutations)
            .await
        {
            AutoSign::Signed(fresh) => {
                if self.verifier.is_still_employed(&fresh).await {
                    return Ok(true);
                }
                expire_into(mutations, user, link, fresh);
            }
            AutoSign::Disabled => expire_into(mutations, user, link, cla),
            AutoSign::Unlinked => {}
        }
        Ok(false)
    }

    async fn try_auto_sign(
        &self,
        user: &str,
        link: &str,
        auto_sign: bool,
        existing: Option<SignedCla>,
        mutations: &mut StateMutations,
    ) -> AutoSign {
        if !auto_sign {
            return AutoSign::Disabled;
        }

        match self.links.corporate_email(user).await {
            Some(email) => {
                let cla = self
                    .ledger
                    .create_cla(true, user, None, link, Some(&email), mutations);
                info!(user, "Employee CLA auto-signed");
                AutoSign::Signed(cla)
            }
            None => {
                if let Some(existing) = existing {
                    expire_into(mutations, user, link, existing);
                }
                AutoSign::Unlinked
            }
        }
    }
}

/// Records that cannot be trusted without (re-)resolving the identity.
fn needs_auto_sign(cla: &SignedCla) -> bool {
    cla.is_incomplete() || (cla.employee && !cla.is_active())
}

/// Administratively expire `cla` unless it already is.
fn expire_into(mutations: &mut StateMutations, user: &str, link: &str, mut cla: SignedCla) {
    if !cla.is_active() {
        return;
    }
    cla.expire(Utc::now());
    info!(user, "CLA expired after failed employment verification");
    ClaLedger::queue_cla(mutations, user, link, cla);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cla_identity::{MockEmploymentDirectory, MockIdentityResolver, RetryPolicy};
    use cla_ledger::{InMemoryStateStore, StateStore};
    use cla_types::ClaKey;

    const LINK: &str = "https://test3.yml";

    struct Fixture {
        store: Arc<InMemoryStateStore>,
        resolver: Arc<MockIdentityResolver>,
        directory: Arc<MockEmploymentDirectory>,
        workflow: SignatureResolutionWorkflow,
        policy: ClaPolicy,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStateStore::new());
        let resolver = Arc::new(MockIdentityResolver::new());
        let directory = Arc::new(MockEmploymentDirectory::new());
        let workflow = SignatureResolutionWorkflow::new(
            Arc::new(ClaLedger::new(store.clone())),
            LinkResolver::new(resolver.clone(), RetryPolicy::none()),
            EmploymentVerifier::new(directory.clone(), RetryPolicy::none()),
        );
        Fixture {
            store,
            resolver,
            directory,
            workflow,
            policy: ClaPolicy::new(LINK).with_auto_sign(true),
        }
    }

    fn record(user: &str, employee: bool, mail: Option<&str>) -> SignedCla {
        SignedCla {
            github_user: user.into(),
            company: None,
            msft_mail: mail.map(str::to_string),
            employee,
            signed_at: Utc::now(),
            expires_at: None,
            can_self_terminate: true,
        }
    }

    fn seed(f: &Fixture, cla: &SignedCla) {
        f.store
            .insert(ClaKey::for_write(&cla.github_user, LINK), cla)
            .unwrap();
    }

    #[tokio::test]
    async fn test_created_external_record_is_signed() {
        let f = fixture();
        let mut batch = StateMutations::new();
        f.workflow
            .ledger()
            .create_cla(false, "external0", None, LINK, None, &mut batch);
        f.store.write_batch(&batch).await.unwrap();

        let mut mutations = StateMutations::new();
        let signed = f
            .workflow
            .has_signed_cla("external0", &f.policy, false, &mut mutations)
            .await
            .unwrap();
        assert!(signed);
        assert!(mutations.is_empty());
    }

    #[tokio::test]
    async fn test_expired_external_record_is_unsigned() {
        let f = fixture();
        let mut cla = record("external0", false, None);
        cla.expire(Utc::now() - Duration::days(1));
        seed(&f, &cla);

        let mut mutations = StateMutations::new();
        assert!(!f
            .workflow
            .has_signed_cla("external0", &f.policy, true, &mut mutations)
            .await
            .unwrap());
        assert_eq!(f.resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_future_expiry_is_still_signed() {
        let f = fixture();
        let mut cla = record("external0", false, None);
        cla.expires_at = Some(Utc::now() + Duration::days(30));
        seed(&f, &cla);

        let mut mutations = StateMutations::new();
        assert!(f
            .workflow
            .has_signed_cla("external0", &f.policy, false, &mut mutations)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_unknown_user_without_auto_sign() {
        let f = fixture();
        let mut mutations = StateMutations::new();
        assert!(!f
            .workflow
            .has_signed_cla("stranger", &f.policy, false, &mut mutations)
            .await
            .unwrap());
        assert_eq!(f.resolver.calls(), 0);
        assert!(mutations.is_empty());
    }

    #[tokio::test]
    async fn test_auto_sign_linked_employee() {
        let f = fixture();
        f.resolver.set_link("employee0", "employee0@microsoft.com");
        f.directory.set_employee("employee0@microsoft.com");

        let mut mutations = StateMutations::new();
        assert!(f
            .workflow
            .has_signed_cla("employee0", &f.policy, true, &mut mutations)
            .await
            .unwrap());

        let cla = mutations.cla(&ClaKey::for_write("employee0", LINK)).unwrap();
        assert!(cla.employee);
        assert_eq!(cla.msft_mail.as_deref(), Some("employee0@microsoft.com"));
    }

    #[tokio::test]
    async fn test_unlinked_user_is_not_auto_signed() {
        let f = fixture();
        let mut mutations = StateMutations::new();
        assert!(!f
            .workflow
            .has_signed_cla("external1", &f.policy, true, &mut mutations)
            .await
            .unwrap());
        assert!(mutations.is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_record_never_short_circuits() {
        let f = fixture();
        seed(&f, &record("employee1", true, None));

        let mut mutations = StateMutations::new();
        assert!(!f
            .workflow
            .has_signed_cla("employee1", &f.policy, false, &mut mutations)
            .await
            .unwrap());
        assert_eq!(f.directory.calls(), 0);
    }

    #[tokio::test]
    async fn test_incomplete_record_is_re_resolved() {
        let f = fixture();
        seed(&f, &record("employee1", true, None));
        f.resolver.set_link("employee1", "employee1@microsoft.com");
        f.directory.set_employee("employee1@microsoft.com");

        let mut mutations = StateMutations::new();
        assert!(f
            .workflow
            .has_signed_cla("employee1", &f.policy, true, &mut mutations)
            .await
            .unwrap());
        let fresh = mutations.cla(&ClaKey::for_write("employee1", LINK)).unwrap();
        assert!(!fresh.is_incomplete());
    }

    #[tokio::test]
    async fn test_incomplete_unlinked_record_is_expired() {
        let f = fixture();
        seed(&f, &record("employee1", true, None));

        let mut mutations = StateMutations::new();
        assert!(!f
            .workflow
            .has_signed_cla("employee1", &f.policy, true, &mut mutations)
            .await
            .unwrap());
        let expired = mutations.cla(&ClaKey::for_write("employee1", LINK)).unwrap();
        assert!(!expired.is_active());
    }

    #[tokio::test]
    async fn test_current_employee_is_signed() {
        let f = fixture();
        seed(&f, &record("employee2", true, Some("employee2@microsoft.com")));
        f.directory.set_employee("employee2@microsoft.com");

        let mut mutations = StateMutations::new();
        assert!(f
            .workflow
            .has_signed_cla("employee2", &f.policy, true, &mut mutations)
            .await
            .unwrap());
        assert!(mutations.is_empty());
        assert_eq!(f.resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_former_employee_is_expired() {
        let f = fixture();
        seed(&f, &record("formerUser0", true, Some("formerUser0@microsoft.com")));

        let mut mutations = StateMutations::new();
        assert!(!f
            .workflow
            .has_signed_cla("formerUser0", &f.policy, true, &mut mutations)
            .await
            .unwrap());
        let expired = mutations.cla(&ClaKey::for_write("formerUser0", LINK)).unwrap();
        assert!(!expired.is_active());
        assert_eq!(expired.msft_mail.as_deref(), Some("formerUser0@microsoft.com"));
    }

    #[tokio::test]
    async fn test_former_employee_without_auto_sign_is_expired() {
        let f = fixture();
        seed(&f, &record("formerUser1", true, Some("formerUser1@microsoft.com")));

        let mut mutations = StateMutations::new();
        assert!(!f
            .workflow
            .has_signed_cla("formerUser1", &f.policy, false, &mut mutations)
            .await
            .unwrap());
        assert!(!mutations
            .cla(&ClaKey::for_write("formerUser1", LINK))
            .unwrap()
            .is_active());
    }

    #[tokio::test]
    async fn test_changed_mapping_re_signs() {
        let f = fixture();
        seed(&f, &record("employee3", true, Some("old@microsoft.com")));
        f.resolver.set_link("employee3", "new@microsoft.com");
        f.directory.set_employee("new@microsoft.com");

        let mut mutations = StateMutations::new();
        assert!(f
            .workflow
            .has_signed_cla("employee3", &f.policy, true, &mut mutations)
            .await
            .unwrap());
        let fresh = mutations.cla(&ClaKey::for_write("employee3", LINK)).unwrap();
        assert_eq!(fresh.msft_mail.as_deref(), Some("new@microsoft.com"));
        assert!(fresh.is_active());
    }

    #[tokio::test]
    async fn test_re_signed_record_that_fails_is_expired() {
        let f = fixture();
        seed(&f, &record("employee4", true, Some("employee4@microsoft.com")));
        f.resolver.set_link("employee4", "employee4@microsoft.com");

        let mut mutations = StateMutations::new();
        assert!(!f
            .workflow
            .has_signed_cla("employee4", &f.policy, true, &mut mutations)
            .await
            .unwrap());
        assert!(!mutations
            .cla(&ClaKey::for_write("employee4", LINK))
            .unwrap()
            .is_active());
    }

    #[tokio::test]
    async fn test_ledger_failure_propagates() {
        let f = fixture();
        f.store.set_unavailable(true);
        let mut mutations = StateMutations::new();
        assert!(f
            .workflow
            .has_signed_cla("anyone", &f.policy, true, &mut mutations)
            .await
            .is_err());
    }
}
