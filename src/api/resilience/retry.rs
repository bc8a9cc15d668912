//! Retry coordination with exponential backoff
//!
//! Drives a transport through repeated attempts under a shared rate budget.
//! Backoff grows as `base * multiplier^attempt`, capped at `max_delay`, with
//! full jitter drawn uniformly from `[0, delay]`. A server-provided
//! retry-after hint replaces the computed delay for that attempt. Everything
//! retryable is handled here; only terminal outcomes escape.

use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use tokio::time::sleep;

use super::rate_limiter::RateLimiter;
use crate::api::error::SuperOpsError;
use crate::api::query::Operation;
use crate::api::transport::{ExecutionOutcome, GraphQlTransport, RetryableReason};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Conservative config for production
    pub fn conservative() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 1.5,
            jitter: true,
        }
    }

    /// Aggressive config for development/testing
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.5,
            jitter: true,
        }
    }

    /// One attempt, no backoff. The default for mutations without an
    /// idempotency key, so a retried write cannot duplicate side effects.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }
}

/// Outcome of a successful execution.
#[derive(Debug)]
pub struct RetryOutcome {
    /// The `data` object from the winning attempt.
    pub payload: serde_json::Value,
    /// How many transport attempts were made in total.
    pub attempts: u32,
}

/// Drives attempts for one operation under a retry policy.
#[derive(Debug, Clone)]
pub struct RetryCoordinator {
    config: RetryConfig,
}

impl RetryCoordinator {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an operation until it succeeds, fails fatally or exhausts the
    /// attempt budget. Every attempt acquires rate budget before touching the
    /// network; cache hits never reach this path.
    pub async fn execute(
        &self,
        operation: &Operation,
        correlation_id: &str,
        transport: &dyn GraphQlTransport,
        rate_limiter: &RateLimiter,
    ) -> Result<RetryOutcome, SuperOpsError> {
        let mut attempt: u32 = 0;

        loop {
            rate_limiter.acquire(1).await;

            debug!(
                "Executing '{}' (attempt {}/{})",
                operation.name(),
                attempt + 1,
                self.config.max_attempts
            );

            match transport.send(operation, correlation_id).await {
                ExecutionOutcome::Success(payload) => {
                    if attempt > 0 {
                        info!(
                            "Operation '{}' succeeded after {} attempts",
                            operation.name(),
                            attempt + 1
                        );
                    }
                    return Ok(RetryOutcome {
                        payload,
                        attempts: attempt + 1,
                    });
                }
                ExecutionOutcome::Fatal(error) => {
                    warn!(
                        "Operation '{}' failed permanently on attempt {}: {}",
                        operation.name(),
                        attempt + 1,
                        error
                    );
                    return Err(error);
                }
                ExecutionOutcome::Retryable {
                    reason,
                    retry_after,
                } => {
                    attempt += 1;
                    if attempt >= self.config.max_attempts {
                        return Err(self.exhausted(operation, attempt, reason, retry_after));
                    }

                    let delay = retry_after.unwrap_or_else(|| self.jittered_delay(attempt - 1));
                    warn!(
                        "Operation '{}' attempt {} failed ({}), retrying in {:?}",
                        operation.name(),
                        attempt,
                        reason.describe(),
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// Exponential backoff before jitter: `min(max_delay, base * mult^attempt)`.
    pub fn compute_delay(&self, attempt: u32) -> Duration {
        let delay_ms = (self.config.base_delay.as_millis() as f64)
            * self.config.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.config.max_delay)
    }

    /// Full jitter: the actual delay is uniform in `[0, computed]`.
    fn jittered_delay(&self, attempt: u32) -> Duration {
        let delay = self.compute_delay(attempt);
        if !self.config.jitter || delay.is_zero() {
            return delay;
        }
        let factor: f64 = rand::thread_rng().gen_range(0.0..=1.0);
        delay.mul_f64(factor)
    }

    /// Map the last retryable reason to the terminal exhaustion error,
    /// keeping repeated throttling distinguishable from flaky transport.
    fn exhausted(
        &self,
        operation: &Operation,
        attempts: u32,
        reason: RetryableReason,
        retry_after: Option<Duration>,
    ) -> SuperOpsError {
        match reason {
            RetryableReason::RateLimited => SuperOpsError::RateLimitExceeded {
                operation: operation.name().to_string(),
                attempts,
                retry_after,
            },
            other => SuperOpsError::TransientTransport {
                operation: operation.name().to_string(),
                attempts,
                last_cause: other.describe(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator(jitter: bool) -> RetryCoordinator {
        RetryCoordinator::new(RetryConfig {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter,
        })
    }

    #[test]
    fn test_delay_grows_exponentially() {
        let policy = coordinator(false);

        assert_eq!(policy.compute_delay(0), Duration::from_millis(100));
        assert_eq!(policy.compute_delay(1), Duration::from_millis(200));
        assert_eq!(policy.compute_delay(2), Duration::from_millis(400));
        assert_eq!(policy.compute_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn test_delays_are_monotonic_and_capped() {
        let policy = RetryCoordinator::new(RetryConfig {
            max_attempts: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: false,
        });

        let mut previous = Duration::ZERO;
        for attempt in 0..10 {
            let delay = policy.compute_delay(attempt);
            assert!(delay >= previous, "delay shrank at attempt {attempt}");
            assert!(delay <= Duration::from_secs(5));
            previous = delay;
        }
        assert_eq!(policy.compute_delay(9), Duration::from_secs(5));
    }

    #[test]
    fn test_full_jitter_stays_within_bounds() {
        let policy = coordinator(true);
        for _ in 0..100 {
            let jittered = policy.jittered_delay(3);
            assert!(jittered <= policy.compute_delay(3));
        }
    }

    #[test]
    fn test_single_attempt_config() {
        let config = RetryConfig::single_attempt();
        assert_eq!(config.max_attempts, 1);
        assert!(!config.jitter);
    }
}
