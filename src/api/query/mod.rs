//! GraphQL Operation Building Module
//!
//! Provides fragment registration, operation description and deterministic
//! document assembly for requests against the SuperOps API.

pub mod builder;
pub mod fragments;
pub mod operation;

pub use builder::OperationBuilder;
pub use fragments::{DetailLevel, EntityType, Fragment};
pub use operation::{Operation, OperationKind};
