//! Shared resource manager plumbing
//!
//! Entity managers are thin wrappers over this generic core: it knows how to
//! phrase list/get/create/update/delete operations for an entity and hand
//! them to the pipeline. Managers own no state beyond a client handle, so
//! they are freely cloneable and safe to share across tasks.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::client::SuperOpsClient;
use crate::api::error::SuperOpsError;
use crate::api::models::DeleteAck;
use crate::api::pager::Pager;
use crate::api::query::{DetailLevel, EntityType, Operation, OperationBuilder};

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Clone)]
pub struct ResourceManager<T> {
    client: SuperOpsClient,
    entity: EntityType,
    detail: DetailLevel,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> ResourceManager<T> {
    pub fn new(client: SuperOpsClient, entity: EntityType) -> Self {
        Self {
            client,
            entity,
            detail: DetailLevel::default(),
            _marker: PhantomData,
        }
    }

    pub fn with_detail(mut self, detail: DetailLevel) -> Self {
        self.detail = detail;
        self
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    /// Build the list operation this manager pages through.
    pub fn list_operation(
        &self,
        filter: Option<Value>,
        page_size: u32,
    ) -> Result<Operation, SuperOpsError> {
        validate_page_size(page_size)?;
        let fragment = crate::api::query::fragments::entity_fragment(self.entity, self.detail);

        OperationBuilder::query(list_operation_name(self.entity), self.entity)
            .variable("filter", self.entity.filter_type(), filter.unwrap_or(Value::Null))
            .variable("limit", "Int", page_size)
            .variable("cursor", "String", Value::Null)
            .root(
                self.entity.plural_field(),
                "filter: $filter, limit: $limit, cursor: $cursor",
            )
            .selection(format!("items {{\n  {}\n}}", fragment.spread()))
            .selection("pageInfo {\n  ...PageInfoFields\n}")
            .fragment(fragment.name)
            .fragment("PageInfoFields")
            .build()
    }

    /// Lazily page through every record matching the filter.
    pub fn list(&self, filter: Option<Value>, page_size: u32) -> Result<Pager<T>, SuperOpsError> {
        let operation = self.list_operation(filter, page_size)?;
        Ok(self.client.execute_paged(operation))
    }

    /// Fetch one record by ID.
    pub async fn get(&self, id: &str) -> Result<T, SuperOpsError> {
        validate_id(id)?;
        let fragment = crate::api::query::fragments::entity_fragment(self.entity, self.detail);

        let operation = OperationBuilder::query(get_operation_name(self.entity), self.entity)
            .variable("id", "ID!", id)
            .root(self.entity.singular_field(), "id: $id")
            .selection(fragment.spread())
            .fragment(fragment.name)
            .build()?;

        self.client
            .execute_single(&operation)
            .await?
            .ok_or_else(|| SuperOpsError::NotFound {
                entity: self.entity.type_name().to_string(),
                id: id.to_string(),
            })
    }

    /// Create a record. Pass an idempotency key to make the mutation
    /// safely retryable.
    pub async fn create(
        &self,
        input: &impl Serialize,
        idempotency_key: Option<String>,
    ) -> Result<T, SuperOpsError> {
        let fragment = crate::api::query::fragments::entity_fragment(self.entity, self.detail);

        let mut builder =
            OperationBuilder::mutation(create_operation_name(self.entity), self.entity)
                .variable(
                    "input",
                    format!("{}!", self.entity.input_type()),
                    serialize_input(input)?,
                )
                .root(self.entity.create_field(), "input: $input")
                .selection(fragment.spread())
                .fragment(fragment.name);
        if let Some(key) = idempotency_key {
            builder = builder.idempotency_key(key);
        }
        let operation = builder.build()?;

        self.expect_record(&operation).await
    }

    /// Update a record by ID.
    pub async fn update(
        &self,
        id: &str,
        input: &impl Serialize,
        idempotency_key: Option<String>,
    ) -> Result<T, SuperOpsError> {
        validate_id(id)?;
        let fragment = crate::api::query::fragments::entity_fragment(self.entity, self.detail);

        let mut builder =
            OperationBuilder::mutation(update_operation_name(self.entity), self.entity)
                .variable("id", "ID!", id)
                .variable(
                    "input",
                    format!("{}!", self.entity.input_type()),
                    serialize_input(input)?,
                )
                .root(self.entity.update_field(), "id: $id, input: $input")
                .selection(fragment.spread())
                .fragment(fragment.name);
        if let Some(key) = idempotency_key {
            builder = builder.idempotency_key(key);
        }
        let operation = builder.build()?;

        self.expect_record(&operation).await
    }

    /// Delete a record by ID. Returns the service's acknowledgement.
    pub async fn delete(&self, id: &str) -> Result<DeleteAck, SuperOpsError> {
        validate_id(id)?;

        let operation = OperationBuilder::mutation(delete_operation_name(self.entity), self.entity)
            .variable("id", "ID!", id)
            .root(self.entity.delete_field(), "id: $id")
            .selection("success")
            .selection("message")
            .build()?;

        let ack: Option<DeleteAck> = self.client.execute_single(&operation).await?;
        ack.ok_or_else(|| SuperOpsError::NotFound {
            entity: self.entity.type_name().to_string(),
            id: id.to_string(),
        })
    }

    async fn expect_record(&self, operation: &Operation) -> Result<T, SuperOpsError> {
        self.client
            .execute_single(operation)
            .await?
            .ok_or_else(|| {
                SuperOpsError::schema_mismatch(
                    format!("data.{}", operation.response_field()),
                    "mutation returned null",
                )
            })
    }
}

/// Reject empty or whitespace-only IDs before they reach the wire.
pub fn validate_id(id: &str) -> Result<(), SuperOpsError> {
    if id.trim().is_empty() {
        return Err(SuperOpsError::validation("ID cannot be empty"));
    }
    Ok(())
}

pub fn validate_page_size(page_size: u32) -> Result<(), SuperOpsError> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(SuperOpsError::validation(format!(
            "page size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}

pub fn serialize_input(input: &impl Serialize) -> Result<Value, SuperOpsError> {
    serde_json::to_value(input)
        .map_err(|e| SuperOpsError::validation(format!("failed to serialize input: {e}")))
}

fn list_operation_name(entity: EntityType) -> String {
    format!("List{}s", entity.type_name())
}

fn get_operation_name(entity: EntityType) -> String {
    format!("Get{}", entity.type_name())
}

fn create_operation_name(entity: EntityType) -> String {
    format!("Create{}", entity.type_name())
}

fn update_operation_name(entity: EntityType) -> String {
    format!("Update{}", entity.type_name())
}

fn delete_operation_name(entity: EntityType) -> String {
    format!("Delete{}", entity.type_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("abc-123").is_ok());
        assert!(validate_id("").is_err());
        assert!(validate_id("   ").is_err());
    }

    #[test]
    fn test_validate_page_size() {
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(MAX_PAGE_SIZE).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(MAX_PAGE_SIZE + 1).is_err());
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(list_operation_name(EntityType::Ticket), "ListTickets");
        assert_eq!(get_operation_name(EntityType::Client), "GetClient");
        assert_eq!(create_operation_name(EntityType::Asset), "CreateAsset");
        assert_eq!(delete_operation_name(EntityType::Ticket), "DeleteTicket");
    }
}
