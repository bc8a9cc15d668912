//! Async Rust SDK for the SuperOps GraphQL API
//!
//! The crate is organized around a request execution pipeline: managers
//! phrase entity operations, the [`api::SuperOpsClient`] schedules them
//! under a shared rate budget, retries transient failures with backoff and
//! maps responses into typed models.
//!
//! ```no_run
//! use superops::{SuperOpsClient, SuperOpsConfig};
//!
//! # async fn run() -> Result<(), superops::SuperOpsError> {
//! let config = SuperOpsConfig::from_env()?;
//! let client = SuperOpsClient::new(config)?;
//!
//! let mut tickets = client.tickets().list(None)?;
//! while let Some(ticket) = tickets.next_item().await? {
//!     println!("{}: {}", ticket.id, ticket.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;

pub use api::{SuperOpsClient, SuperOpsError};
pub use config::SuperOpsConfig;
