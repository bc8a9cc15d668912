//! Token bucket rate limiter implementation
//!
//! Provides a global rate limiter per client instance that bounds the
//! outbound request rate to the SuperOps API. Waiters are admitted in FIFO
//! order: the bucket sits behind an async mutex and a caller that must wait
//! sleeps while holding it, so later arrivals queue behind earlier ones and
//! cannot starve them by needing fewer tokens.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use tokio::sync::Mutex;
use tokio::time::sleep;

use super::config::RateLimitConfig;

/// Token bucket rate limiter for controlling API request rates
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

#[derive(Debug)]
struct RateLimiterInner {
    tokens: f64,
    last_refill: Instant,
    requests_admitted: u64,
    requests_rejected: u64,
    total_wait: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    ///
    /// An enabled limiter with zero capacity or a non-positive refill rate
    /// can never admit a request; that is a configuration bug, caught here.
    pub fn new(config: RateLimitConfig) -> Self {
        assert!(
            !config.enabled || (config.capacity > 0 && config.refill_per_second > 0.0),
            "rate limiter requires capacity > 0 and refill rate > 0"
        );

        let initial_tokens = if config.enabled {
            f64::from(config.capacity)
        } else {
            f64::MAX // Unlimited when disabled
        };

        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                tokens: initial_tokens,
                last_refill: Instant::now(),
                requests_admitted: 0,
                requests_rejected: 0,
                total_wait: Duration::ZERO,
            })),
            config,
        }
    }

    /// Acquire `cost` tokens, suspending until the budget allows it.
    ///
    /// Returns how long the caller waited. Tokens are deducted only when the
    /// acquisition completes; a caller cancelled mid-wait leaves the bucket
    /// untouched, and a completed acquisition is never refunded.
    pub async fn acquire(&self, cost: u32) -> Duration {
        if !self.config.enabled {
            return Duration::ZERO;
        }

        // Costs above capacity could never be satisfied.
        let cost = f64::from(cost.min(self.config.capacity));
        let start = Instant::now();
        let mut inner = self.inner.lock().await;

        loop {
            self.refill_tokens(&mut inner);

            if inner.tokens >= cost {
                inner.tokens -= cost;
                inner.requests_admitted += 1;
                let waited = start.elapsed();
                inner.total_wait += waited;
                debug!(
                    "Rate limiter: request admitted, {:.2} tokens remaining",
                    inner.tokens
                );
                return waited;
            }

            let deficit = cost - inner.tokens;
            let wait = Duration::from_secs_f64(deficit / self.config.refill_per_second);
            debug!("Rate limiter: waiting {:?} for {:.2} tokens", wait, deficit);
            // Sleeping with the lock held keeps waiters in arrival order.
            sleep(wait).await;
        }
    }

    /// Try to acquire a token without waiting.
    /// Returns true if acquired, false if rate limited.
    pub fn try_acquire(&self) -> bool {
        if !self.config.enabled {
            return true;
        }

        let Ok(mut inner) = self.inner.try_lock() else {
            // A waiter is already queued ahead of us.
            return false;
        };

        self.refill_tokens(&mut inner);

        if inner.tokens >= 1.0 {
            inner.tokens -= 1.0;
            inner.requests_admitted += 1;
            true
        } else {
            inner.requests_rejected += 1;
            false
        }
    }

    /// Get current rate limiter statistics
    pub async fn stats(&self) -> RateLimiterStats {
        let inner = self.inner.lock().await;
        RateLimiterStats {
            tokens_available: inner.tokens,
            requests_admitted: inner.requests_admitted,
            requests_rejected: inner.requests_rejected,
            total_wait: inner.total_wait,
            enabled: self.config.enabled,
            capacity: self.config.capacity,
            refill_per_second: self.config.refill_per_second,
        }
    }

    /// Refill tokens based on elapsed time. Uses a monotonic clock, so wall
    /// clock changes cannot produce negative waits.
    fn refill_tokens(&self, inner: &mut RateLimiterInner) {
        if !self.config.enabled {
            return;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(inner.last_refill);
        let tokens_to_add = elapsed.as_secs_f64() * self.config.refill_per_second;

        if tokens_to_add > 0.0 {
            inner.tokens = (inner.tokens + tokens_to_add).min(f64::from(self.config.capacity));
            inner.last_refill = now;
        }
    }
}

/// Rate limiter statistics
#[derive(Debug, Clone)]
pub struct RateLimiterStats {
    /// Current number of tokens available
    pub tokens_available: f64,
    /// Requests admitted, immediately or after a wait
    pub requests_admitted: u64,
    /// Non-blocking attempts that found no budget
    pub requests_rejected: u64,
    /// Cumulative time callers spent waiting for budget
    pub total_wait: Duration,
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// Configured bucket capacity
    pub capacity: u32,
    /// Configured refill rate
    pub refill_per_second: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_disabled() {
        let config = RateLimitConfig {
            capacity: 10,
            refill_per_second: 1.0,
            enabled: false,
        };

        let limiter = RateLimiter::new(config);

        // Should allow unlimited requests when disabled
        for _ in 0..100 {
            assert!(limiter.try_acquire());
        }
    }

    #[tokio::test]
    async fn test_rate_limiter_burst_capacity() {
        let config = RateLimitConfig {
            capacity: 5,
            refill_per_second: 1.0,
            enabled: true,
        };

        let limiter = RateLimiter::new(config);

        // Should allow burst capacity requests immediately
        for _ in 0..5 {
            assert!(limiter.try_acquire());
        }

        // Next request should be rejected
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_rate_limiter_token_refill() {
        let config = RateLimitConfig {
            capacity: 2,
            refill_per_second: 2.0,
            enabled: true,
        };

        let limiter = RateLimiter::new(config);

        // Use up burst capacity
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        // Wait for token refill (0.5 seconds = 1 token at 2 tokens/sec)
        sleep(Duration::from_millis(600)).await;

        // Should have one token available now
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_rate_limiter_acquire_with_wait() {
        let config = RateLimitConfig {
            capacity: 1,
            refill_per_second: 2.0,
            enabled: true,
        };

        let limiter = RateLimiter::new(config);

        // First request should succeed immediately
        let waited = limiter.acquire(1).await;
        assert!(waited < Duration::from_millis(50));

        // Second request should wait roughly 0.5s for a token
        let waited = limiter.acquire(1).await;
        assert!(waited >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_waiters_are_served_in_arrival_order() {
        let config = RateLimitConfig {
            capacity: 1,
            refill_per_second: 10.0,
            enabled: true,
        };
        let limiter = RateLimiter::new(config);

        // Drain the bucket so every task below has to wait.
        limiter.acquire(1).await;

        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for i in 0..4u32 {
            let limiter = limiter.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire(1).await;
                order.lock().unwrap().push(i);
            }));
            // Stagger arrivals so the queue order is well-defined.
            sleep(Duration::from_millis(20)).await;
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_tokens_are_conserved() {
        let config = RateLimitConfig {
            capacity: 5,
            refill_per_second: 100.0,
            enabled: true,
        };
        let limiter = RateLimiter::new(config);
        let start = Instant::now();

        let mut admitted = 0u64;
        for _ in 0..20 {
            limiter.acquire(1).await;
            admitted += 1;
        }

        // Deducted tokens can never exceed the initial capacity plus what
        // refilled while we ran.
        let elapsed = start.elapsed().as_secs_f64();
        let ceiling = 5.0 + elapsed * 100.0;
        assert!((admitted as f64) <= ceiling + 1.0);
    }

    #[test]
    #[should_panic(expected = "capacity > 0")]
    fn test_zero_capacity_panics_at_construction() {
        let _ = RateLimiter::new(RateLimitConfig {
            capacity: 0,
            refill_per_second: 1.0,
            enabled: true,
        });
    }
}
