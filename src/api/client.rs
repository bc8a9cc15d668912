//! SuperOps API client
//!
//! The pipeline facade: checks the cache, schedules the request under the
//! shared rate budget, drives the transport through the retry coordinator,
//! maps the payload into typed values and keeps the cache coherent with
//! successful mutations. All clones of a client share one rate limiter, one
//! cache and one metrics collector.

use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::cache::QueryCache;
use super::error::SuperOpsError;
use super::managers::{AssetManager, ClientManager, TicketManager};
use super::pager::Pager;
use super::query::{Operation, OperationKind};
use super::resilience::{
    ApiLogger, MetricsCollector, MetricsSnapshot, RateLimiter, RateLimiterStats, RetryConfig,
    RetryCoordinator,
};
use super::response::{self, Page};
use super::transport::{GraphQlTransport, HttpTransport};
use crate::config::SuperOpsConfig;

/// Asynchronous client for the SuperOps GraphQL API
#[derive(Clone)]
pub struct SuperOpsClient {
    config: Arc<SuperOpsConfig>,
    transport: Arc<dyn GraphQlTransport>,
    rate_limiter: RateLimiter,
    cache: QueryCache,
    logger: ApiLogger,
    metrics: MetricsCollector,
}

impl std::fmt::Debug for SuperOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperOpsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SuperOpsClient {
    /// Build a client over the production HTTP transport.
    pub fn new(config: SuperOpsConfig) -> Result<Self, SuperOpsError> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Build a client over a caller-supplied transport. Used by tests to run
    /// the full pipeline without a network.
    pub fn with_transport(
        config: SuperOpsConfig,
        transport: Arc<dyn GraphQlTransport>,
    ) -> Result<Self, SuperOpsError> {
        config.validate()?;
        Ok(Self {
            rate_limiter: RateLimiter::new(config.resilience.rate_limit.clone()),
            cache: QueryCache::new(config.cache.clone()),
            logger: ApiLogger::new(config.resilience.monitoring.clone()),
            metrics: MetricsCollector::new(config.resilience.monitoring.clone()),
            transport,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SuperOpsConfig {
        &self.config
    }

    /// Execute an operation and return its raw `data` payload.
    ///
    /// Queries consult the cache first; a hit never touches the rate budget.
    /// A successful mutation evicts every cached read for its entity type.
    pub async fn execute(&self, operation: &Operation) -> Result<Value, SuperOpsError> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        let context = self.logger.start_operation(
            operation.kind().keyword(),
            operation.name(),
            operation.entity().type_name(),
            &correlation_id,
        );

        let signature = operation.signature();
        if operation.cacheable() && self.cache.enabled() {
            if let Some(payload) = self.cache.get(&signature) {
                self.logger.log_cache_hit(&context);
                let metrics = context.create_metrics(true, 0, true, None);
                self.logger.complete_operation(&context, &metrics);
                self.metrics.record_operation(
                    operation.kind().keyword(),
                    operation.entity().type_name(),
                    &metrics,
                );
                return Ok(payload);
            }
        }

        let coordinator = RetryCoordinator::new(self.retry_config_for(operation));
        let result = coordinator
            .execute(
                operation,
                &correlation_id,
                self.transport.as_ref(),
                &self.rate_limiter,
            )
            .await;

        match result {
            Ok(outcome) => {
                match operation.kind() {
                    OperationKind::Mutation => {
                        debug!(
                            "Mutation '{}' succeeded, invalidating {} cache entries",
                            operation.name(),
                            operation.entity().type_name()
                        );
                        self.cache.invalidate(operation.entity());
                    }
                    OperationKind::Query => {
                        if operation.cacheable() && self.cache.enabled() {
                            self.cache.put(
                                signature,
                                operation.entity(),
                                outcome.payload.clone(),
                            );
                        }
                    }
                }

                let metrics = context.create_metrics(true, outcome.attempts, false, None);
                self.logger.complete_operation(&context, &metrics);
                self.metrics.record_operation(
                    operation.kind().keyword(),
                    operation.entity().type_name(),
                    &metrics,
                );
                Ok(outcome.payload)
            }
            Err(error) => {
                let attempts = match &error {
                    SuperOpsError::RateLimitExceeded { attempts, .. }
                    | SuperOpsError::TransientTransport { attempts, .. } => *attempts,
                    _ => 1,
                };
                let metrics =
                    context.create_metrics(false, attempts, false, Some(error.to_string()));
                self.logger.complete_operation(&context, &metrics);
                self.metrics.record_operation(
                    operation.kind().keyword(),
                    operation.entity().type_name(),
                    &metrics,
                );
                Err(error)
            }
        }
    }

    /// Execute and map the payload into one typed page.
    pub async fn execute_page<T: DeserializeOwned>(
        &self,
        operation: &Operation,
    ) -> Result<Page<T>, SuperOpsError> {
        let payload = self.execute(operation).await?;
        response::map_page(&payload, operation.response_field())
    }

    /// Execute and map the payload into a single typed record.
    pub async fn execute_single<T: DeserializeOwned>(
        &self,
        operation: &Operation,
    ) -> Result<Option<T>, SuperOpsError> {
        let payload = self.execute(operation).await?;
        response::map_single(&payload, operation.response_field())
    }

    /// Walk a list operation lazily, one page at a time.
    pub fn execute_paged<T: DeserializeOwned>(&self, operation: Operation) -> Pager<T> {
        Pager::new(self.clone(), operation)
    }

    /// Mutations without an idempotency key get the single-attempt policy;
    /// a key opts the mutation into the query retry policy, since the server
    /// can deduplicate it.
    fn retry_config_for(&self, operation: &Operation) -> RetryConfig {
        match operation.kind() {
            OperationKind::Query => self.config.resilience.query_retry.clone(),
            OperationKind::Mutation => {
                if operation.idempotency_key().is_some() {
                    self.config.resilience.query_retry.clone()
                } else {
                    self.config.resilience.mutation_retry.clone()
                }
            }
        }
    }

    /// Manager for ticket operations.
    pub fn tickets(&self) -> TicketManager {
        TicketManager::new(self.clone())
    }

    /// Manager for client (customer) operations.
    pub fn clients(&self) -> ClientManager {
        ClientManager::new(self.clone())
    }

    /// Manager for asset operations.
    pub fn assets(&self) -> AssetManager {
        AssetManager::new(self.clone())
    }

    /// Rate limiter statistics for monitoring.
    pub async fn rate_limiter_stats(&self) -> RateLimiterStats {
        self.rate_limiter.stats().await
    }

    /// Performance metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of live cache entries, for diagnostics.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
