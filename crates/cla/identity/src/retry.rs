//! Bounded exponential backoff for identity and employment lookups.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Outcome of one attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    /// Definitive answer; stop retrying.
    Done(T),
    /// Transient failure or inconclusive answer.
    Retry(String),
}

/// One initial attempt plus `max_retries` retries, waiting
/// `base_delay * 2^(n-1)` before retry `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Overall budget; once spent the lookup counts as not resolved.
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            deadline: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            deadline: None,
        }
    }

    /// Policy that never waits or retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Run `operation` until it yields [`Attempt::Done`], the retry budget is
    /// spent or the deadline passes. `None` means no definitive answer.
    pub async fn run<T, F, Fut>(&self, lookup: &str, operation: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        match self.deadline {
            None => self.attempts(lookup, operation).await,
            Some(deadline) => {
                match tokio::time::timeout(deadline, self.attempts(lookup, operation)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(lookup, ?deadline, "Lookup deadline exceeded");
                        None
                    }
                }
            }
        }
    }

    async fn attempts<T, F, Fut>(&self, lookup: &str, mut operation: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Attempt::Done(value) => return Some(value),
                Attempt::Retry(reason) if retry < self.max_retries => {
                    retry += 1;
                    let delay = self.delay_for(retry);
                    warn!(lookup, retry, ?delay, %reason, "Retrying lookup");
                    tokio::time::sleep(delay).await;
                }
                Attempt::Retry(reason) => {
                    warn!(lookup, attempts = retry + 1, %reason, "Lookup retries exhausted");
                    return None;
                }
            }
        }
    }
}
