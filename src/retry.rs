//! Transport-level retries for a single backend.
//!
//! This is separate from the pipeline's fallback across backends: a backend
//! retries its own transient failures (5xx, 429, network) before the
//! pipeline gives up on it and moves to the next ranked one.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first; 0 behaves as 1
    pub max_attempts: u32,
    /// Wait before the second attempt
    pub initial_delay: Duration,
    /// Upper bound on any single wait
    pub max_delay: Duration,
    /// Growth factor between consecutive waits
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// One retry after 250ms. Short enough to fit inside the pipeline's
    /// per-backend timeout.
    pub fn backend_call() -> Self {
        Self::new(2, Duration::from_millis(250)).with_max_delay(Duration::from_secs(1))
    }

    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Waits before each retry, in order. Empty when there are no retries.
    pub fn schedule(&self) -> Vec<Duration> {
        let mut waits = Vec::new();
        let mut next = self.initial_delay.as_nanos() as f64;
        for _ in 1..self.attempts() {
            let wait = Duration::from_nanos(next.max(0.0) as u64).min(self.max_delay);
            waits.push(wait);
            next *= self.backoff_multiplier;
        }
        waits
    }

    /// Per-attempt timeout that lets every attempt and backoff wait fit
    /// inside `budget`. Falls back to an even split when the waits alone
    /// exceed the budget.
    pub fn attempt_timeout(&self, budget: Duration) -> Duration {
        let attempts = self.attempts();
        let waiting: Duration = self.schedule().iter().sum();
        match budget.checked_sub(waiting) {
            Some(left) if !left.is_zero() => left / attempts,
            _ => budget / attempts,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::backend_call()
    }
}

/// Run `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or the attempts run out. The last error is returned.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    label: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let attempts = config.attempts();
    let mut waits = config.schedule().into_iter();
    let mut attempt = 1;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{}: recovered on attempt {}/{}", label, attempt, attempts);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !should_retry(&err) {
            debug!("{}: permanent failure, not retrying: {}", label, err);
            return Err(err);
        }

        let Some(wait) = waits.next() else {
            warn!("{}: giving up after {} attempts: {}", label, attempts, err);
            return Err(err);
        };

        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {:?}",
            label, attempt, attempts, err, wait
        );
        sleep(wait).await;
        attempt += 1;
    }
}
