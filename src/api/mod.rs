//! SuperOps GraphQL API Module
//!
//! A complete, typed interface to the SuperOps API: deterministic operation
//! building, token bucket rate limiting, retrying transport with backoff,
//! typed response mapping, cursor pagination and a short-TTL response cache.

pub mod cache;
pub mod client;
pub mod error;
pub mod managers;
pub mod models;
pub mod pager;
pub mod query;
pub mod resilience;
pub mod response;
pub mod transport;

pub use cache::{CacheConfig, QueryCache};
pub use client::SuperOpsClient;
pub use error::SuperOpsError;
pub use managers::{AssetManager, ClientManager, ResourceManager, TicketManager};
pub use pager::Pager;
pub use query::{DetailLevel, EntityType, Operation, OperationBuilder, OperationKind};
pub use resilience::{
    ApiLogger, LogLevel, MetricsCollector, MetricsSnapshot, MonitoringConfig, OperationContext,
    OperationMetrics, RateLimitConfig, RateLimiter, RateLimiterStats, ResilienceConfig,
    RetryConfig, RetryCoordinator,
};
pub use response::{GraphQlResponse, Page};
pub use transport::{ExecutionOutcome, GraphQlTransport, HttpTransport, RetryableReason};
