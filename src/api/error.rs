//! Typed error taxonomy for the SuperOps API client
//!
//! Every failure that crosses the pipeline boundary is one of these variants;
//! raw transport errors never leak to callers.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to SDK callers.
#[derive(Debug, Clone, Error)]
pub enum SuperOpsError {
    /// Credentials were rejected (HTTP 401/403). Never retried.
    #[error("authentication rejected by the SuperOps API (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    /// The caller supplied an invalid request (bad ID, unserializable input).
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// An operation document referenced variables that were not supplied,
    /// or carried variables the document never uses.
    #[error("malformed operation '{operation}': missing variables {missing:?}, unused variables {extra:?}")]
    MalformedOperation {
        operation: String,
        missing: Vec<String>,
        extra: Vec<String>,
    },

    /// Retries exhausted while the service kept answering 429/rate-limited.
    #[error("rate limit exceeded for '{operation}' after {attempts} attempts")]
    RateLimitExceeded {
        operation: String,
        attempts: u32,
        retry_after: Option<Duration>,
    },

    /// Retries exhausted on network errors, timeouts or 5xx responses.
    #[error("transient transport failure for '{operation}' after {attempts} attempts: {last_cause}")]
    TransientTransport {
        operation: String,
        attempts: u32,
        last_cause: String,
    },

    /// The service rejected the operation at the GraphQL level.
    #[error("GraphQL error [{code}]: {message}")]
    GraphQl { code: String, message: String },

    /// The response payload did not match the expected shape. Retrying will
    /// not fix a contract drift, so this is always terminal.
    #[error("response shape mismatch at '{path}': {message}")]
    SchemaMismatch { path: String, message: String },

    /// A cursor walk could not continue; terminal for that pager only.
    #[error("pagination failed: {message}")]
    Pagination { message: String },

    /// A single-record lookup matched nothing.
    #[error("{entity} with ID '{id}' not found")]
    NotFound { entity: String, id: String },

    /// The client was constructed with an unusable configuration.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl SuperOpsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn schema_mismatch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            path: path.into(),
            message: message.into(),
        }
    }
}
