//! Retrying front ends over the identity collaborators.
//!
//! Neither lookup surfaces an error: once the retry budget (or deadline) is
//! spent the answer is a definitive negative.

use cla_types::SignedCla;
use std::sync::Arc;
use tracing::{debug, info};

use crate::client::{EmploymentDirectory, IdentityResolver};
use crate::retry::{Attempt, RetryPolicy};

/// Resolves the corporate mail linked to a platform login.
pub struct LinkResolver {
    resolver: Arc<dyn IdentityResolver>,
    retry: RetryPolicy,
}

impl LinkResolver {
    pub fn new(resolver: Arc<dyn IdentityResolver>, retry: RetryPolicy) -> Self {
        Self { resolver, retry }
    }

    /// Corporate mail of `login`, or `None` when the login is not linked.
    pub async fn corporate_email(&self, login: &str) -> Option<String> {
        let resolver = &self.resolver;
        let link = self
            .retry
            .run("identity_link", move || async move {
                match resolver.get_link(login).await {
                    Ok(link) => Attempt::Done(link),
                    Err(e) => Attempt::Retry(e.to_string()),
                }
            })
            .await
            .flatten();

        let email = link.as_ref().and_then(|l| l.corporate_email()).map(str::to_string);
        if email.is_none() {
            info!(login, "No corporate identity linked");
        }
        email
    }
}

/// Checks that an employee record still belongs to a current employee.
pub struct EmploymentVerifier {
    directory: Arc<dyn EmploymentDirectory>,
    retry: RetryPolicy,
}

impl EmploymentVerifier {
    pub fn new(directory: Arc<dyn EmploymentDirectory>, retry: RetryPolicy) -> Self {
        Self { directory, retry }
    }

    /// Whether the corporate mail of `cla` still resolves.
    pub async fn is_still_employed(&self, cla: &SignedCla) -> bool {
        match cla.msft_mail.as_deref() {
            Some(email) => self.is_employed(email).await,
            None => {
                debug!(user = %cla.github_user, "Record has no corporate mail");
                false
            }
        }
    }

    /// Whether `email` resolves in the employment directory.
    pub async fn is_employed(&self, email: &str) -> bool {
        let directory = &self.directory;
        let resolved = self
            .retry
            .run("employment", move || async move {
                match directory.resolve(email).await {
                    Ok(Some(resolution)) if resolution.was_resolved => Attempt::Done(resolution),
                    Ok(Some(_)) => Attempt::Retry("not resolved".to_string()),
                    Ok(None) => Attempt::Retry("empty response".to_string()),
                    Err(e) => Attempt::Retry(e.to_string()),
                }
            })
            .await
            .is_some();

        debug!(email, resolved, "Employment verification finished");
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockEmploymentDirectory, MockIdentityResolver};
    use chrono::Utc;
    use std::time::Duration;

    fn employee_cla(mail: Option<&str>) -> SignedCla {
        SignedCla {
            github_user: "employee1".into(),
            company: None,
            msft_mail: mail.map(str::to_string),
            employee: true,
            signed_at: Utc::now(),
            expires_at: None,
            can_self_terminate: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_employed_after_transient_failures() {
        let directory = Arc::new(
            MockEmploymentDirectory::new()
                .with_employee("employee1@microsoft.com")
                .failing_first(1)
                .empty_first(1),
        );
        let verifier = EmploymentVerifier::new(directory.clone(), RetryPolicy::default());

        assert!(verifier.is_still_employed(&employee_cla(Some("employee1@microsoft.com"))).await);
        assert_eq!(directory.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_employed_after_budget() {
        let directory = Arc::new(MockEmploymentDirectory::new());
        let verifier = EmploymentVerifier::new(directory.clone(), RetryPolicy::default());

        assert!(!verifier.is_still_employed(&employee_cla(Some("former@microsoft.com"))).await);
        assert_eq!(directory.calls(), 4);
    }

    #[tokio::test]
    async fn test_missing_mail_skips_directory() {
        let directory = Arc::new(MockEmploymentDirectory::new());
        let verifier = EmploymentVerifier::new(directory.clone(), RetryPolicy::default());

        assert!(!verifier.is_still_employed(&employee_cla(None)).await);
        assert_eq!(directory.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_yields_not_resolved() {
        let directory = Arc::new(
            MockEmploymentDirectory::new()
                .with_employee("employee1@microsoft.com")
                .failing_first(3),
        );
        let retry = RetryPolicy::default().with_deadline(Duration::from_secs(3));
        let verifier = EmploymentVerifier::new(directory, retry);

        assert!(!verifier.is_employed("employee1@microsoft.com").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_resolution_retries_transport_failures_only() {
        let resolver = Arc::new(
            MockIdentityResolver::new()
                .with_link("employee1", "employee1@microsoft.com")
                .failing_first(2),
        );
        let links = LinkResolver::new(resolver.clone(), RetryPolicy::default());

        assert_eq!(
            links.corporate_email("employee1").await.as_deref(),
            Some("employee1@microsoft.com")
        );
        assert_eq!(resolver.calls(), 3);

        assert_eq!(links.corporate_email("stranger").await, None);
        assert_eq!(resolver.calls(), 4);
    }
}
