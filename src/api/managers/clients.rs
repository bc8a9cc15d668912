//! Client (customer) manager

use super::base::{DEFAULT_PAGE_SIZE, ResourceManager, serialize_input};
use crate::api::client::SuperOpsClient;
use crate::api::error::SuperOpsError;
use crate::api::models::{Client, ClientFilter, ClientInput, DeleteAck};
use crate::api::pager::Pager;
use crate::api::query::{DetailLevel, EntityType};

/// Typed operations on managed clients.
#[derive(Clone)]
pub struct ClientManager {
    inner: ResourceManager<Client>,
}

impl ClientManager {
    pub(crate) fn new(client: SuperOpsClient) -> Self {
        Self {
            inner: ResourceManager::new(client, EntityType::Client),
        }
    }

    pub fn with_detail(mut self, detail: DetailLevel) -> Self {
        self.inner = self.inner.with_detail(detail);
        self
    }

    pub fn list(&self, filter: Option<ClientFilter>) -> Result<Pager<Client>, SuperOpsError> {
        self.list_with_page_size(filter, DEFAULT_PAGE_SIZE)
    }

    pub fn list_with_page_size(
        &self,
        filter: Option<ClientFilter>,
        page_size: u32,
    ) -> Result<Pager<Client>, SuperOpsError> {
        let filter = filter.map(|f| serialize_input(&f)).transpose()?;
        self.inner.list(filter, page_size)
    }

    pub async fn get(&self, id: &str) -> Result<Client, SuperOpsError> {
        self.inner.get(id).await
    }

    pub async fn create(&self, input: ClientInput) -> Result<Client, SuperOpsError> {
        self.inner.create(&input, None).await
    }

    pub async fn create_idempotent(
        &self,
        input: ClientInput,
        idempotency_key: impl Into<String>,
    ) -> Result<Client, SuperOpsError> {
        self.inner.create(&input, Some(idempotency_key.into())).await
    }

    pub async fn update(&self, id: &str, input: ClientInput) -> Result<Client, SuperOpsError> {
        self.inner.update(id, &input, None).await
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteAck, SuperOpsError> {
        self.inner.delete(id).await
    }
}
