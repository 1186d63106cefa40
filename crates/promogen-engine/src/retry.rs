//! Retry policy for transient remote failures.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * attempt`
    Linear,
    /// `base * 2^(attempt - 1)`
    Exponential,
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    pub backoff: Backoff,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            backoff: Backoff::Linear,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let delay = match self.backoff {
            Backoff::Linear => self.base_delay.saturating_mul(attempt),
            Backoff::Exponential => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt - 1)),
        };
        delay.min(self.max_delay)
    }
}

/// Result of a retry operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded.
    Success(T),
    /// Every attempt failed.
    Failed { error: E, attempts: u32 },
    /// A failure the caller marked terminal; no further attempts were made.
    Aborted { error: E, attempts: u32 },
}

impl<T, E> RetryResult<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }
}

/// Execute an async operation with retry logic.
///
/// `is_terminal` decides which errors stop the loop immediately.
///
/// # Example
/// ```ignore
/// let result = retry_async(&policy, "scene_prompt", |e: &EngineError| e.is_safety_block(), move || async move {
///     service.generate_text(request).await
/// }).await;
/// ```
pub async fn retry_async<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    operation_name: &str,
    is_terminal: P,
    operation: F,
) -> RetryResult<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return RetryResult::Success(value),
            Err(e) if is_terminal(&e) => {
                warn!("{} attempt {} hit a terminal failure: {}", operation_name, attempt, e);
                return RetryResult::Aborted { error: e, attempts: attempt };
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.delay_for_attempt(attempt);
                debug!(
                    "{} attempt {} failed, retrying in {:?}: {}",
                    operation_name, attempt, delay, e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return RetryResult::Failed {
                    error: e,
                    attempts: attempt,
                }
            }
        }
    }
}
