//! Bounded retry with exponential backoff
//!
//! Delay before attempt `n + 1` is `min(min_delay * factor^(n - 1), max_delay)`.
//! Only errors that report themselves transient are retried.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Errors that know whether another attempt may succeed
pub trait Retryable {
    /// Whether the failure is worth retrying
    fn is_transient(&self) -> bool;
}

/// Retry policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay after the first failure, in milliseconds
    pub min_delay_ms: u64,
    /// Upper bound for any delay, in milliseconds
    pub max_delay_ms: u64,
    /// Growth factor between delays
    pub factor: u32,
}

impl RetryPolicy {
    /// Create a policy with the default growth factor of 2
    #[inline]
    #[must_use]
    pub const fn new(max_attempts: u32, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            min_delay_ms: min_delay.as_millis() as u64,
            max_delay_ms: max_delay.as_millis() as u64,
            factor: 2,
        }
    }

    /// Policy for storage uploads: 10 attempts, 30s..60s
    #[must_use]
    pub const fn upload() -> Self {
        Self::new(10, Duration::from_secs(30), Duration::from_secs(60))
    }

    /// Policy for contract calls: 100 attempts, 500ms..1500ms
    #[must_use]
    pub const fn contract_call() -> Self {
        Self::new(100, Duration::from_millis(500), Duration::from_millis(1500))
    }

    /// With max attempts
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay to wait after `failed_attempt` (1-based) failed
    #[must_use]
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1);
        let growth = u64::from(self.factor).saturating_pow(exponent);
        let millis = self.min_delay_ms.saturating_mul(growth).min(self.max_delay_ms);
        Duration::from_millis(millis)
    }
}

/// Outcome of a retry loop that did not succeed
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E: Display> {
    /// Non-transient failure, no further attempts were made
    #[error("failed on attempt {attempt}: {error}")]
    Fatal { attempt: u32, error: E },

    /// Every allowed attempt failed transiently
    #[error("gave up after {attempts} attempts: {error}")]
    Exhausted { attempts: u32, error: E },
}

impl<E: Display> RetryError<E> {
    /// Last underlying error
    #[must_use]
    pub fn into_inner(self) -> E {
        match self {
            Self::Fatal { error, .. } | Self::Exhausted { error, .. } => error,
        }
    }

    /// Number of attempts made
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fatal { attempt, .. } => *attempt,
            Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Run `op` until it succeeds, fails fatally, or the policy is exhausted
///
/// `op` receives the 1-based attempt number.
///
/// # Errors
/// Returns [`RetryError::Fatal`] for non-transient failures and
/// [`RetryError::Exhausted`] once `max_attempts` transient failures occurred.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: Retryable + Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if !error.is_transient() => {
                tracing::error!(operation, attempt, %error, "non-retryable failure");
                return Err(RetryError::Fatal { attempt, error });
            }
            Err(error) if attempt >= max_attempts => {
                tracing::error!(operation, attempts = attempt, %error, "retries exhausted");
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    error,
                });
            }
            Err(error) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
