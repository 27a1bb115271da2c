//! Collaborator contracts and in-process mocks.

use async_trait::async_trait;
use cla_types::{EmploymentResolution, IdentityLink};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use crate::error::{IdentityError, Result};

/// Maps a platform login to its corporate identity.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` means the login is not linked.
    async fn get_link(&self, login: &str) -> Result<Option<IdentityLink>>;
}

/// Answers whether a corporate mail belongs to a current employee.
#[async_trait]
pub trait EmploymentDirectory: Send + Sync {
    /// `Ok(None)` is an empty answer and is retried like a failure.
    async fn resolve(&self, email: &str) -> Result<Option<EmploymentResolution>>;
}

/// Mock identity resolver for testing.
#[derive(Default)]
pub struct MockIdentityResolver {
    links: RwLock<HashMap<String, IdentityLink>>,
    failures: AtomicU32,
    calls: AtomicU32,
}

impl MockIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `login` to corporate principal `email`.
    pub fn with_link(self, login: &str, email: &str) -> Self {
        self.set_link(login, email);
        self
    }

    /// Fail the next `count` calls with a transport error.
    pub fn failing_first(self, count: u32) -> Self {
        self.failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn set_link(&self, login: &str, email: &str) {
        if let Ok(mut links) = self.links.write() {
            let id = i64::try_from(links.len()).unwrap_or(i64::MAX) + 1;
            links.insert(login.to_string(), IdentityLink::linked(id, login, email));
        }
    }

    pub fn remove_link(&self, login: &str) {
        if let Ok(mut links) = self.links.write() {
            links.remove(login);
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for MockIdentityResolver {
    async fn get_link(&self, login: &str) -> Result<Option<IdentityLink>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.failures) {
            return Err(IdentityError::Unavailable("simulated error".to_string()));
        }
        let links = self
            .links
            .read()
            .map_err(|_| IdentityError::Unavailable("lock poisoned".to_string()))?;
        Ok(links.get(login).cloned())
    }
}

/// Mock employment directory for testing.
#[derive(Default)]
pub struct MockEmploymentDirectory {
    employees: RwLock<HashMap<String, String>>,
    failures: AtomicU32,
    empty_answers: AtomicU32,
    calls: AtomicU32,
}

impl MockEmploymentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employee(self, email: &str) -> Self {
        self.set_employee(email);
        self
    }

    /// Fail the next `count` calls with a transport error.
    pub fn failing_first(self, count: u32) -> Self {
        self.failures.store(count, Ordering::SeqCst);
        self
    }

    /// Answer the next `count` calls with an empty result.
    pub fn empty_first(self, count: u32) -> Self {
        self.empty_answers.store(count, Ordering::SeqCst);
        self
    }

    pub fn set_employee(&self, email: &str) {
        if let Ok(mut employees) = self.employees.write() {
            employees.insert(email.to_string(), email.to_string());
        }
    }

    pub fn remove_employee(&self, email: &str) {
        if let Ok(mut employees) = self.employees.write() {
            employees.remove(email);
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmploymentDirectory for MockEmploymentDirectory {
    async fn resolve(&self, email: &str) -> Result<Option<EmploymentResolution>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.failures) {
            return Err(IdentityError::Unavailable("simulated error".to_string()));
        }
        if take_failure(&self.empty_answers) {
            return Ok(None);
        }
        let employees = self
            .employees
            .read()
            .map_err(|_| IdentityError::Unavailable("lock poisoned".to_string()))?;
        Ok(Some(match employees.get(email) {
            Some(principal) => EmploymentResolution::resolved(principal.clone()),
            None => EmploymentResolution::unresolved(),
        }))
    }
}

fn take_failure(remaining: &AtomicU32) -> bool {
    remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}
