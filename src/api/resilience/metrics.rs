//! Performance metrics collection and aggregation for API operations
//!
//! Tracks response times, attempt counts, cache efficiency and error rates
//! per operation kind and per entity, aggregated behind a shared collector.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::MonitoringConfig;
use super::logging::OperationMetrics;

/// Global performance metrics collector
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsCollectorInner>>,
    config: MonitoringConfig,
}

#[derive(Debug, Default)]
struct MetricsCollectorInner {
    /// Per-operation kind metrics (query, mutation)
    kind_metrics: HashMap<String, OperationKindMetrics>,
    /// Per-entity metrics
    entity_metrics: HashMap<String, EntityMetrics>,
    /// Global aggregated metrics
    global: GlobalMetrics,
}

/// Metrics for one operation kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationKindMetrics {
    pub total_operations: u64,
    pub successful_operations: u64,
    pub failed_operations: u64,
    pub total_attempts: u64,
    pub cache_hits: u64,
    pub total_duration: Duration,
    pub max_duration: Duration,
}

impl OperationKindMetrics {
    pub fn success_rate(&self) -> f64 {
        if self.total_operations == 0 {
            100.0
        } else {
            self.successful_operations as f64 / self.total_operations as f64 * 100.0
        }
    }

    pub fn average_duration(&self) -> Duration {
        if self.total_operations == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.total_operations as u32
        }
    }
}

/// Metrics for one entity type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityMetrics {
    pub total_operations: u64,
    pub successful_operations: u64,
    pub failed_operations: u64,
}

impl EntityMetrics {
    pub fn success_rate(&self) -> f64 {
        if self.total_operations == 0 {
            100.0
        } else {
            self.successful_operations as f64 / self.total_operations as f64 * 100.0
        }
    }
}

/// Global metrics across all operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalMetrics {
    pub total_operations: u64,
    pub successful_operations: u64,
    pub failed_operations: u64,
    pub total_attempts: u64,
    pub cache_hits: u64,
    pub error_rate: f64,
}

/// Serializable snapshot for dashboards and tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub global: GlobalMetrics,
    pub kinds: HashMap<String, OperationKindMetrics>,
    pub entities: HashMap<String, EntityMetrics>,
}

impl MetricsCollector {
    pub fn new(config: MonitoringConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsCollectorInner::default())),
            config,
        }
    }

    /// Record one completed operation.
    pub fn record_operation(&self, kind: &str, entity: &str, metrics: &OperationMetrics) {
        if !self.config.performance_metrics {
            return;
        }

        let Ok(mut inner) = self.inner.lock() else {
            return;
        };

        let kind_entry = inner.kind_metrics.entry(kind.to_string()).or_default();
        kind_entry.total_operations += 1;
        kind_entry.total_attempts += u64::from(metrics.attempts);
        kind_entry.total_duration += metrics.duration;
        kind_entry.max_duration = kind_entry.max_duration.max(metrics.duration);
        if metrics.cache_hit {
            kind_entry.cache_hits += 1;
        }
        if metrics.success {
            kind_entry.successful_operations += 1;
        } else {
            kind_entry.failed_operations += 1;
        }

        let entity_entry = inner.entity_metrics.entry(entity.to_string()).or_default();
        entity_entry.total_operations += 1;
        if metrics.success {
            entity_entry.successful_operations += 1;
        } else {
            entity_entry.failed_operations += 1;
        }

        inner.global.total_operations += 1;
        inner.global.total_attempts += u64::from(metrics.attempts);
        if metrics.cache_hit {
            inner.global.cache_hits += 1;
        }
        if metrics.success {
            inner.global.successful_operations += 1;
        } else {
            inner.global.failed_operations += 1;
        }
        inner.global.error_rate =
            inner.global.failed_operations as f64 / inner.global.total_operations as f64 * 100.0;
    }

    /// Get a point-in-time snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            global: inner.global.clone(),
            kinds: inner.kind_metrics.clone(),
            entities: inner.entity_metrics.clone(),
        }
    }

    /// Metrics for one operation kind, if any were recorded.
    pub fn kind_metrics(&self, kind: &str) -> Option<OperationKindMetrics> {
        let inner = self.inner.lock().ok()?;
        inner.kind_metrics.get(kind).cloned()
    }

    /// Metrics for one entity, if any were recorded.
    pub fn entity_metrics(&self, entity: &str) -> Option<EntityMetrics> {
        let inner = self.inner.lock().ok()?;
        inner.entity_metrics.get(entity).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resilience::config::LogLevel;

    fn collector() -> MetricsCollector {
        MetricsCollector::new(MonitoringConfig {
            correlation_ids: true,
            request_logging: false,
            performance_metrics: true,
            log_level: LogLevel::Info,
        })
    }

    fn sample_metrics(success: bool, attempts: u32, cache_hit: bool) -> OperationMetrics {
        OperationMetrics {
            duration: Duration::from_millis(120),
            attempts,
            success,
            cache_hit,
            error_message: if success { None } else { Some("boom".to_string()) },
        }
    }

    #[test]
    fn test_record_and_snapshot() {
        let collector = collector();

        collector.record_operation("query", "Ticket", &sample_metrics(true, 1, false));
        collector.record_operation("mutation", "Ticket", &sample_metrics(false, 2, false));

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.global.total_operations, 2);
        assert_eq!(snapshot.global.successful_operations, 1);
        assert_eq!(snapshot.global.failed_operations, 1);
        assert_eq!(snapshot.global.error_rate, 50.0);
        assert_eq!(snapshot.global.total_attempts, 3);

        let query = collector.kind_metrics("query").unwrap();
        assert_eq!(query.total_operations, 1);
        assert_eq!(query.success_rate(), 100.0);
        assert_eq!(query.average_duration(), Duration::from_millis(120));

        let ticket = collector.entity_metrics("Ticket").unwrap();
        assert_eq!(ticket.total_operations, 2);
        assert_eq!(ticket.success_rate(), 50.0);
    }

    #[test]
    fn test_cache_hits_are_counted() {
        let collector = collector();
        collector.record_operation("query", "Client", &sample_metrics(true, 0, true));

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.global.cache_hits, 1);
        assert_eq!(collector.kind_metrics("query").unwrap().cache_hits, 1);
    }

    #[test]
    fn test_disabled_collector_records_nothing() {
        let collector = MetricsCollector::new(MonitoringConfig {
            correlation_ids: false,
            request_logging: false,
            performance_metrics: false,
            log_level: LogLevel::Error,
        });

        collector.record_operation("query", "Ticket", &sample_metrics(true, 1, false));
        assert_eq!(collector.snapshot().global.total_operations, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let collector = collector();
        collector.record_operation("query", "Asset", &sample_metrics(true, 1, false));
        let json = serde_json::to_string(&collector.snapshot());
        assert!(json.is_ok());
    }
}
