//! Resilience configuration with builder pattern
//!
//! Provides a unified configuration for retry policies, rate limiting,
//! transient-error classification and monitoring with sane defaults.

use std::collections::BTreeSet;

use super::retry::RetryConfig;
use crate::api::error::SuperOpsError;

/// Global resilience configuration for API operations
#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    /// Retry policy for queries.
    pub query_retry: RetryConfig,
    /// Retry policy for mutations without an idempotency key. Defaults to a
    /// single attempt so a retried write cannot duplicate side effects.
    pub mutation_retry: RetryConfig,
    pub rate_limit: RateLimitConfig,
    pub monitoring: MonitoringConfig,
    /// GraphQL error codes (from `errors[].extensions.code`) treated as
    /// transient and therefore retryable. Service-specific, so configurable.
    pub transient_error_codes: BTreeSet<String>,
}

/// Token bucket parameters shared by every caller of one client
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum tokens the bucket holds (burst ceiling).
    pub capacity: u32,
    /// Tokens restored per second.
    pub refill_per_second: f64,
    pub enabled: bool,
}

/// Monitoring and logging configuration
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub correlation_ids: bool,
    pub request_logging: bool,
    pub performance_metrics: bool,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn default_transient_error_codes() -> BTreeSet<String> {
    [
        "RATE_LIMITED",
        "INTERNAL_SERVER_ERROR",
        "SERVICE_UNAVAILABLE",
        "TIMEOUT",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            query_retry: RetryConfig::default(),
            mutation_retry: RetryConfig::single_attempt(),
            rate_limit: RateLimitConfig::default(),
            monitoring: MonitoringConfig::default(),
            transient_error_codes: default_transient_error_codes(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 10,           // Allow small bursts
            refill_per_second: 1.5, // 90/min, conservative for the SuperOps API
            enabled: true,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            correlation_ids: true,
            request_logging: true,
            performance_metrics: true,
            log_level: LogLevel::Info,
        }
    }
}

impl ResilienceConfig {
    /// Create a new builder for ResilienceConfig
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }

    /// Conservative config for production environments
    pub fn conservative() -> Self {
        Self {
            query_retry: RetryConfig::conservative(),
            mutation_retry: RetryConfig::single_attempt(),
            rate_limit: RateLimitConfig {
                capacity: 5,
                refill_per_second: 1.0,
                enabled: true,
            },
            monitoring: MonitoringConfig {
                correlation_ids: true,
                request_logging: true,
                performance_metrics: true,
                log_level: LogLevel::Warn, // Less verbose in production
            },
            transient_error_codes: default_transient_error_codes(),
        }
    }

    /// Aggressive config for development/testing
    pub fn development() -> Self {
        Self {
            query_retry: RetryConfig::aggressive(),
            mutation_retry: RetryConfig::single_attempt(),
            rate_limit: RateLimitConfig {
                capacity: 20,
                refill_per_second: 5.0,
                enabled: false, // Often disabled in dev
            },
            monitoring: MonitoringConfig {
                correlation_ids: true,
                request_logging: true,
                performance_metrics: true,
                log_level: LogLevel::Debug,
            },
            transient_error_codes: default_transient_error_codes(),
        }
    }

    /// Disable all resilience features (for testing)
    pub fn disabled() -> Self {
        Self {
            query_retry: RetryConfig::single_attempt(),
            mutation_retry: RetryConfig::single_attempt(),
            rate_limit: RateLimitConfig {
                capacity: u32::MAX,
                refill_per_second: f64::MAX,
                enabled: false,
            },
            monitoring: MonitoringConfig {
                correlation_ids: false,
                request_logging: false,
                performance_metrics: false,
                log_level: LogLevel::Error,
            },
            transient_error_codes: default_transient_error_codes(),
        }
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), SuperOpsError> {
        if self.rate_limit.enabled {
            if self.rate_limit.capacity == 0 {
                return Err(SuperOpsError::config("rate limit capacity must be > 0"));
            }
            if self.rate_limit.refill_per_second <= 0.0 {
                return Err(SuperOpsError::config("rate limit refill rate must be > 0"));
            }
        }
        if self.query_retry.max_attempts == 0 || self.mutation_retry.max_attempts == 0 {
            return Err(SuperOpsError::config("retry max_attempts must be >= 1"));
        }
        Ok(())
    }
}

/// Builder for ResilienceConfig
#[derive(Debug, Default)]
pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ResilienceConfig::default(),
        }
    }

    /// Configure the query retry policy
    pub fn query_retry(mut self, retry: RetryConfig) -> Self {
        self.config.query_retry = retry;
        self
    }

    /// Configure the mutation retry policy
    pub fn mutation_retry(mut self, retry: RetryConfig) -> Self {
        self.config.mutation_retry = retry;
        self
    }

    /// Set max retry attempts for queries
    pub fn max_retries(mut self, attempts: u32) -> Self {
        self.config.query_retry.max_attempts = attempts;
        self
    }

    /// Configure rate limiting
    pub fn rate_limit_config(mut self, rate_limit: RateLimitConfig) -> Self {
        self.config.rate_limit = rate_limit;
        self
    }

    /// Set the token bucket capacity
    pub fn rate_capacity(mut self, capacity: u32) -> Self {
        self.config.rate_limit.capacity = capacity;
        self
    }

    /// Set the token refill rate per second
    pub fn refill_per_second(mut self, refill: f64) -> Self {
        self.config.rate_limit.refill_per_second = refill;
        self
    }

    /// Enable/disable rate limiting
    pub fn enable_rate_limiting(mut self, enabled: bool) -> Self {
        self.config.rate_limit.enabled = enabled;
        self
    }

    /// Configure monitoring
    pub fn monitoring_config(mut self, monitoring: MonitoringConfig) -> Self {
        self.config.monitoring = monitoring;
        self
    }

    /// Enable/disable correlation IDs
    pub fn correlation_ids(mut self, enabled: bool) -> Self {
        self.config.monitoring.correlation_ids = enabled;
        self
    }

    /// Enable/disable request logging
    pub fn request_logging(mut self, enabled: bool) -> Self {
        self.config.monitoring.request_logging = enabled;
        self
    }

    /// Enable/disable performance metrics
    pub fn performance_metrics(mut self, enabled: bool) -> Self {
        self.config.monitoring.performance_metrics = enabled;
        self
    }

    /// Set logging level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.monitoring.log_level = level;
        self
    }

    /// Replace the transient GraphQL error code table
    pub fn transient_error_codes(
        mut self,
        codes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.config.transient_error_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResilienceConfig::default();

        assert_eq!(config.query_retry.max_attempts, 3);
        assert_eq!(config.mutation_retry.max_attempts, 1);
        assert_eq!(config.rate_limit.capacity, 10);
        assert!(config.rate_limit.enabled);
        assert!(config.monitoring.correlation_ids);
        assert!(config.transient_error_codes.contains("RATE_LIMITED"));
    }

    #[test]
    fn test_conservative_config() {
        let config = ResilienceConfig::conservative();

        assert_eq!(config.query_retry.max_attempts, 2);
        assert_eq!(config.rate_limit.capacity, 5);
        assert!(config.rate_limit.enabled);
    }

    #[test]
    fn test_development_config() {
        let config = ResilienceConfig::development();

        assert_eq!(config.query_retry.max_attempts, 5);
        assert!(!config.rate_limit.enabled); // Disabled in dev
    }

    #[test]
    fn test_disabled_config() {
        let config = ResilienceConfig::disabled();

        assert_eq!(config.query_retry.max_attempts, 1);
        assert!(!config.rate_limit.enabled);
        assert!(!config.monitoring.request_logging);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ResilienceConfig::builder()
            .max_retries(5)
            .rate_capacity(20)
            .enable_rate_limiting(false)
            .correlation_ids(true)
            .log_level(LogLevel::Debug)
            .transient_error_codes(["RATE_LIMITED", "UPSTREAM_FLAKY"])
            .build();

        assert_eq!(config.query_retry.max_attempts, 5);
        assert_eq!(config.rate_limit.capacity, 20);
        assert!(!config.rate_limit.enabled);
        assert!(config.transient_error_codes.contains("UPSTREAM_FLAKY"));
        assert!(!config.transient_error_codes.contains("TIMEOUT"));
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let mut config = ResilienceConfig::default();
        config.rate_limit.capacity = 0;
        assert!(config.validate().is_err());

        // A disabled limiter does not care about capacity.
        config.rate_limit.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        let mut config = ResilienceConfig::default();
        config.query_retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
