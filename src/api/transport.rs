//! Single-attempt GraphQL transport
//!
//! Sends one request over HTTPS and classifies the raw result into an
//! [`ExecutionOutcome`]. No retry decision is made here; the executor is a
//! pure per-attempt classifier consumed by the retry coordinator.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::{Value, json};

use super::error::SuperOpsError;
use super::query::Operation;
use super::response::GraphQlResponse;
use crate::config::SuperOpsConfig;

/// Fallback wait for 429 responses that carry no Retry-After signal.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Why a single attempt failed in a way worth retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryableReason {
    /// Connection-level failure (DNS, refused, reset).
    Network(String),
    /// The request timed out.
    Timeout,
    /// HTTP 5xx from the service.
    ServerError(u16),
    /// HTTP 429 or a rate-limited GraphQL error.
    RateLimited,
    /// A GraphQL error whose code is classified as transient.
    TransientGraphQl(String),
}

impl RetryableReason {
    pub fn describe(&self) -> String {
        match self {
            Self::Network(message) => format!("network error: {message}"),
            Self::Timeout => "request timed out".to_string(),
            Self::ServerError(status) => format!("server error (HTTP {status})"),
            Self::RateLimited => "rate limited by service".to_string(),
            Self::TransientGraphQl(code) => format!("transient GraphQL error [{code}]"),
        }
    }
}

/// Result of one transport attempt.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// HTTP 200 with a `data` object and no errors.
    Success(Value),
    /// Worth another attempt, optionally with a server-provided wait hint.
    Retryable {
        reason: RetryableReason,
        retry_after: Option<Duration>,
    },
    /// Retrying cannot help; surfaced to the caller as-is.
    Fatal(SuperOpsError),
}

/// One-shot request execution, mockable for tests.
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    async fn send(&self, operation: &Operation, correlation_id: &str) -> ExecutionOutcome;
}

/// Production transport over reqwest with connection pooling
pub struct HttpTransport {
    endpoint: String,
    http: reqwest::Client,
    api_key: String,
    transient_codes: BTreeSet<String>,
}

impl HttpTransport {
    pub fn new(config: &SuperOpsConfig) -> Result<Self, SuperOpsError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("superops-rs/0.1")
            .build()
            .map_err(|e| SuperOpsError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.base_url.clone(),
            http,
            api_key: config.api_key.clone(),
            transient_codes: config.resilience.transient_error_codes.clone(),
        })
    }

    fn classify_http_error(err: reqwest::Error) -> ExecutionOutcome {
        if err.is_timeout() {
            ExecutionOutcome::Retryable {
                reason: RetryableReason::Timeout,
                retry_after: None,
            }
        } else if let Some(status) = err.status() {
            Self::classify_status(status.as_u16(), err.to_string(), None)
        } else {
            // Connect failures, resets and anything else below HTTP.
            ExecutionOutcome::Retryable {
                reason: RetryableReason::Network(err.to_string()),
                retry_after: None,
            }
        }
    }

    fn classify_status(status: u16, body: String, retry_after: Option<Duration>) -> ExecutionOutcome {
        match status {
            401 | 403 => ExecutionOutcome::Fatal(SuperOpsError::Authentication {
                status,
                message: truncate(&body),
            }),
            429 => ExecutionOutcome::Retryable {
                reason: RetryableReason::RateLimited,
                retry_after: Some(retry_after.unwrap_or(DEFAULT_RETRY_AFTER)),
            },
            500..=599 => ExecutionOutcome::Retryable {
                reason: RetryableReason::ServerError(status),
                retry_after,
            },
            _ => ExecutionOutcome::Fatal(SuperOpsError::Validation {
                message: format!("unexpected HTTP {status}: {}", truncate(&body)),
            }),
        }
    }

    /// Classify an HTTP 200 body: either clean data, or a GraphQL error list
    /// split into transient and fatal codes.
    fn classify_payload(&self, response: GraphQlResponse) -> ExecutionOutcome {
        if !response.errors.is_empty() {
            for error in &response.errors {
                let code = error.code();
                if !self.transient_codes.contains(code) {
                    return ExecutionOutcome::Fatal(SuperOpsError::GraphQl {
                        code: code.to_string(),
                        message: error.message.clone(),
                    });
                }
            }
            let first = &response.errors[0];
            let code = first.code().to_string();
            let reason = if code == "RATE_LIMITED" {
                RetryableReason::RateLimited
            } else {
                RetryableReason::TransientGraphQl(code)
            };
            return ExecutionOutcome::Retryable {
                reason,
                retry_after: None,
            };
        }

        match response.data {
            Some(data) => ExecutionOutcome::Success(data),
            None => ExecutionOutcome::Fatal(SuperOpsError::schema_mismatch(
                "data",
                "response carried neither data nor errors",
            )),
        }
    }
}

#[async_trait]
impl GraphQlTransport for HttpTransport {
    async fn send(&self, operation: &Operation, correlation_id: &str) -> ExecutionOutcome {
        let body = json!({
            "query": operation.document(),
            "variables": operation.variables_json(),
            "operationName": operation.name(),
        });

        let mut request = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("X-Correlation-Id", correlation_id);
        if let Some(key) = operation.idempotency_key() {
            request = request.header("Idempotency-Key", key);
        }

        let response = match request.json(&body).send().await {
            Ok(response) => response,
            Err(err) => return Self::classify_http_error(err),
        };

        let status = response.status().as_u16();
        let retry_after = parse_retry_after(response.headers());
        debug!(
            "Transport: {} '{}' -> HTTP {}",
            operation.kind().keyword(),
            operation.name(),
            status
        );

        if !(200..300).contains(&status) {
            let text = response.text().await.unwrap_or_default();
            return Self::classify_status(status, text, retry_after);
        }

        match response.json::<GraphQlResponse>().await {
            Ok(payload) => self.classify_payload(payload),
            Err(err) => ExecutionOutcome::Fatal(SuperOpsError::schema_mismatch(
                "$",
                format!("response body was not a GraphQL envelope: {err}"),
            )),
        }
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn truncate(body: &str) -> String {
    const MAX_LEN: usize = 512;
    if body.len() > MAX_LEN {
        format!("{}…", &body[..MAX_LEN])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::response::WireError;

    fn transport() -> HttpTransport {
        let config = SuperOpsConfig::new("https://example.test/graphql", "token");
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            HttpTransport::classify_status(401, String::new(), None),
            ExecutionOutcome::Fatal(SuperOpsError::Authentication { status: 401, .. })
        ));
        assert!(matches!(
            HttpTransport::classify_status(403, String::new(), None),
            ExecutionOutcome::Fatal(SuperOpsError::Authentication { status: 403, .. })
        ));
        assert!(matches!(
            HttpTransport::classify_status(503, String::new(), None),
            ExecutionOutcome::Retryable {
                reason: RetryableReason::ServerError(503),
                ..
            }
        ));
        assert!(matches!(
            HttpTransport::classify_status(400, String::new(), None),
            ExecutionOutcome::Fatal(SuperOpsError::Validation { .. })
        ));
    }

    #[test]
    fn test_429_uses_retry_after_hint() {
        match HttpTransport::classify_status(429, String::new(), Some(Duration::from_secs(7))) {
            ExecutionOutcome::Retryable {
                reason: RetryableReason::RateLimited,
                retry_after,
            } => assert_eq!(retry_after, Some(Duration::from_secs(7))),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_429_falls_back_to_default_hint() {
        match HttpTransport::classify_status(429, String::new(), None) {
            ExecutionOutcome::Retryable { retry_after, .. } => {
                assert_eq!(retry_after, Some(DEFAULT_RETRY_AFTER));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_clean_payload_is_success() {
        let response = GraphQlResponse {
            data: Some(json!({"tickets": {"items": []}})),
            errors: Vec::new(),
        };
        assert!(matches!(
            transport().classify_payload(response),
            ExecutionOutcome::Success(_)
        ));
    }

    #[test]
    fn test_transient_graphql_error_is_retryable() {
        let response = GraphQlResponse {
            data: None,
            errors: vec![WireError::with_code("backend hiccup", "INTERNAL_SERVER_ERROR")],
        };
        assert!(matches!(
            transport().classify_payload(response),
            ExecutionOutcome::Retryable {
                reason: RetryableReason::TransientGraphQl(_),
                ..
            }
        ));
    }

    #[test]
    fn test_rate_limited_graphql_error_maps_to_rate_limited() {
        let response = GraphQlResponse {
            data: None,
            errors: vec![WireError::with_code("slow down", "RATE_LIMITED")],
        };
        assert!(matches!(
            transport().classify_payload(response),
            ExecutionOutcome::Retryable {
                reason: RetryableReason::RateLimited,
                ..
            }
        ));
    }

    #[test]
    fn test_business_graphql_error_is_fatal() {
        let response = GraphQlResponse {
            data: None,
            errors: vec![WireError::with_code("ticket is closed", "TICKET_CLOSED")],
        };
        match transport().classify_payload(response) {
            ExecutionOutcome::Fatal(SuperOpsError::GraphQl { code, message }) => {
                assert_eq!(code, "TICKET_CLOSED");
                assert_eq!(message, "ticket is closed");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_missing_data_is_schema_mismatch() {
        let response = GraphQlResponse {
            data: None,
            errors: Vec::new(),
        };
        assert!(matches!(
            transport().classify_payload(response),
            ExecutionOutcome::Fatal(SuperOpsError::SchemaMismatch { .. })
        ));
    }
}
