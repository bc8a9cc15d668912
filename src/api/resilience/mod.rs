//! Production resilience and hardening features
//!
//! Provides retry coordination, rate limiting and monitoring capabilities
//! for production-grade SuperOps API interactions.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod rate_limiter;
pub mod retry;

pub use config::{LogLevel, MonitoringConfig, RateLimitConfig, ResilienceConfig};
pub use logging::{ApiLogger, OperationContext, OperationMetrics};
pub use metrics::{
    EntityMetrics, GlobalMetrics, MetricsCollector, MetricsSnapshot, OperationKindMetrics,
};
pub use rate_limiter::{RateLimiter, RateLimiterStats};
pub use retry::{RetryConfig, RetryCoordinator, RetryOutcome};
