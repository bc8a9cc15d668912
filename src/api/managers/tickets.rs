//! Ticket manager

use super::base::{DEFAULT_PAGE_SIZE, ResourceManager, serialize_input};
use crate::api::client::SuperOpsClient;
use crate::api::error::SuperOpsError;
use crate::api::models::{DeleteAck, Ticket, TicketFilter, TicketInput};
use crate::api::pager::Pager;
use crate::api::query::{DetailLevel, EntityType};

/// Typed operations on service desk tickets.
#[derive(Clone)]
pub struct TicketManager {
    inner: ResourceManager<Ticket>,
}

impl TicketManager {
    pub(crate) fn new(client: SuperOpsClient) -> Self {
        Self {
            inner: ResourceManager::new(client, EntityType::Ticket),
        }
    }

    /// Select how much of each ticket to fetch.
    pub fn with_detail(mut self, detail: DetailLevel) -> Self {
        self.inner = self.inner.with_detail(detail);
        self
    }

    /// Page lazily through tickets matching the filter.
    pub fn list(&self, filter: Option<TicketFilter>) -> Result<Pager<Ticket>, SuperOpsError> {
        self.list_with_page_size(filter, DEFAULT_PAGE_SIZE)
    }

    pub fn list_with_page_size(
        &self,
        filter: Option<TicketFilter>,
        page_size: u32,
    ) -> Result<Pager<Ticket>, SuperOpsError> {
        let filter = filter.map(|f| serialize_input(&f)).transpose()?;
        self.inner.list(filter, page_size)
    }

    pub async fn get(&self, id: &str) -> Result<Ticket, SuperOpsError> {
        self.inner.get(id).await
    }

    pub async fn create(&self, input: TicketInput) -> Result<Ticket, SuperOpsError> {
        self.inner.create(&input, None).await
    }

    /// Create with an idempotency key so the mutation may be retried safely.
    pub async fn create_idempotent(
        &self,
        input: TicketInput,
        idempotency_key: impl Into<String>,
    ) -> Result<Ticket, SuperOpsError> {
        self.inner.create(&input, Some(idempotency_key.into())).await
    }

    pub async fn update(&self, id: &str, input: TicketInput) -> Result<Ticket, SuperOpsError> {
        self.inner.update(id, &input, None).await
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteAck, SuperOpsError> {
        self.inner.delete(id).await
    }
}
