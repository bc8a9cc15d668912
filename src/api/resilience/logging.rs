//! Structured logging with correlation tracking for API operations
//!
//! Emits structured log lines that include correlation IDs, timing and
//! request/response detail for debugging and monitoring. Credentials are
//! redacted before headers reach the log.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use serde_json::json;

use super::config::{LogLevel, MonitoringConfig};

/// Structured logger for API operations with correlation tracking
#[derive(Debug, Clone)]
pub struct ApiLogger {
    config: MonitoringConfig,
}

/// Context for a single API operation with correlation tracking
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Unique correlation ID for this operation
    pub correlation_id: String,
    /// Operation kind (query or mutation)
    pub operation_kind: String,
    /// Operation name
    pub operation_name: String,
    /// Entity being operated on
    pub entity: String,
    /// Start time for performance tracking
    pub start_time: Instant,
}

/// Performance metrics for an API operation
#[derive(Debug, Clone)]
pub struct OperationMetrics {
    /// Total duration of the operation
    pub duration: Duration,
    /// Number of transport attempts made
    pub attempts: u32,
    /// Whether the operation succeeded
    pub success: bool,
    /// Whether the result came from the cache
    pub cache_hit: bool,
    /// Error message if failed
    pub error_message: Option<String>,
}

impl ApiLogger {
    /// Create a new API logger with the given configuration
    pub fn new(config: MonitoringConfig) -> Self {
        Self { config }
    }

    /// Start tracking a new operation
    pub fn start_operation(
        &self,
        operation_kind: &str,
        operation_name: &str,
        entity: &str,
        correlation_id: &str,
    ) -> OperationContext {
        let context = OperationContext {
            correlation_id: correlation_id.to_string(),
            operation_kind: operation_kind.to_string(),
            operation_name: operation_name.to_string(),
            entity: entity.to_string(),
            start_time: Instant::now(),
        };

        if self.config.request_logging && self.should_log(&LogLevel::Info) {
            let log_data = json!({
                "event": "operation_started",
                "correlation_id": context.correlation_id,
                "operation_kind": context.operation_kind,
                "operation_name": context.operation_name,
                "entity": context.entity,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });

            info!("API Operation Started: {}", log_data);
        }

        context
    }

    /// Log a cache hit that short-circuited dispatch
    pub fn log_cache_hit(&self, context: &OperationContext) {
        if !self.should_log(&LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "cache_hit",
            "correlation_id": context.correlation_id,
            "operation_name": context.operation_name,
            "entity": context.entity,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("Cache Hit: {}", log_data);
    }

    /// Log retry attempt
    pub fn log_retry(&self, context: &OperationContext, attempt: u32, cause: &str, delay: Duration) {
        if !self.should_log(&LogLevel::Warn) {
            return;
        }

        let log_data = json!({
            "event": "retry_attempt",
            "correlation_id": context.correlation_id,
            "operation_name": context.operation_name,
            "entity": context.entity,
            "attempt": attempt,
            "cause": cause,
            "delay_ms": delay.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        warn!("Retry Attempt: {}", log_data);
    }

    /// Log time spent waiting on the rate limiter
    pub fn log_rate_limit_wait(&self, context: &OperationContext, waited: Duration) {
        if waited.is_zero() || !self.should_log(&LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "rate_limited",
            "correlation_id": context.correlation_id,
            "operation_name": context.operation_name,
            "entity": context.entity,
            "waited_ms": waited.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("Rate Limited: {}", log_data);
    }

    /// Complete an operation and log metrics
    pub fn complete_operation(&self, context: &OperationContext, metrics: &OperationMetrics) {
        if self.config.performance_metrics && self.should_log(&LogLevel::Info) {
            let log_data = json!({
                "event": "operation_completed",
                "correlation_id": context.correlation_id,
                "operation_kind": context.operation_kind,
                "operation_name": context.operation_name,
                "entity": context.entity,
                "duration_ms": metrics.duration.as_millis(),
                "attempts": metrics.attempts,
                "success": metrics.success,
                "cache_hit": metrics.cache_hit,
                "error_message": metrics.error_message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });

            if metrics.success {
                info!("API Operation Completed: {}", log_data);
            } else {
                error!("API Operation Failed: {}", log_data);
            }
        }
    }

    /// Check if we should log at the given level
    fn should_log(&self, level: &LogLevel) -> bool {
        match (&self.config.log_level, level) {
            (LogLevel::Error, LogLevel::Error) => true,
            (LogLevel::Warn, LogLevel::Error | LogLevel::Warn) => true,
            (LogLevel::Info, LogLevel::Error | LogLevel::Warn | LogLevel::Info) => true,
            (
                LogLevel::Debug,
                LogLevel::Error | LogLevel::Warn | LogLevel::Info | LogLevel::Debug,
            ) => true,
            (LogLevel::Trace, _) => true,
            _ => false,
        }
    }

    /// Sanitize headers to remove sensitive information
    pub fn sanitize_headers(&self, headers: &HashMap<String, String>) -> HashMap<String, String> {
        let mut sanitized = HashMap::new();

        for (key, value) in headers {
            let key_lower = key.to_lowercase();
            if key_lower.contains("authorization")
                || key_lower.contains("token")
                || key_lower.contains("key")
            {
                sanitized.insert(key.clone(), "[REDACTED]".to_string());
            } else {
                sanitized.insert(key.clone(), value.clone());
            }
        }

        sanitized
    }
}

impl OperationContext {
    /// Calculate elapsed time since operation started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Create metrics from this context
    pub fn create_metrics(
        &self,
        success: bool,
        attempts: u32,
        cache_hit: bool,
        error_message: Option<String>,
    ) -> OperationMetrics {
        OperationMetrics {
            duration: self.elapsed(),
            attempts,
            success,
            cache_hit,
            error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debug_config() -> MonitoringConfig {
        MonitoringConfig {
            correlation_ids: true,
            request_logging: true,
            performance_metrics: true,
            log_level: LogLevel::Debug,
        }
    }

    #[test]
    fn test_operation_context_creation() {
        let logger = ApiLogger::new(debug_config());
        let context = logger.start_operation("query", "ListTickets", "Ticket", "test-123");

        assert_eq!(context.correlation_id, "test-123");
        assert_eq!(context.operation_kind, "query");
        assert_eq!(context.operation_name, "ListTickets");
        assert_eq!(context.entity, "Ticket");
    }

    #[test]
    fn test_operation_metrics() {
        let logger = ApiLogger::new(debug_config());
        let context = logger.start_operation("mutation", "CreateTicket", "Ticket", "test-456");

        let metrics = context.create_metrics(true, 2, false, None);
        assert_eq!(metrics.attempts, 2);
        assert!(metrics.success);
        assert!(!metrics.cache_hit);
        assert!(metrics.error_message.is_none());
    }

    #[test]
    fn test_header_sanitization() {
        let logger = ApiLogger::new(debug_config());
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer secret-token".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Idempotency-Key".to_string(), "abc".to_string());

        let sanitized = logger.sanitize_headers(&headers);

        assert_eq!(sanitized.get("Authorization"), Some(&"[REDACTED]".to_string()));
        assert_eq!(
            sanitized.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(sanitized.get("Idempotency-Key"), Some(&"[REDACTED]".to_string()));
    }

    #[test]
    fn test_log_level_filtering() {
        let config = MonitoringConfig {
            correlation_ids: true,
            request_logging: true,
            performance_metrics: true,
            log_level: LogLevel::Warn,
        };

        let logger = ApiLogger::new(config);

        assert!(logger.should_log(&LogLevel::Error));
        assert!(logger.should_log(&LogLevel::Warn));
        assert!(!logger.should_log(&LogLevel::Info));
        assert!(!logger.should_log(&LogLevel::Debug));
    }
}
