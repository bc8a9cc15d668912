//! Asset manager

use super::base::{DEFAULT_PAGE_SIZE, ResourceManager, serialize_input};
use crate::api::client::SuperOpsClient;
use crate::api::error::SuperOpsError;
use crate::api::models::{Asset, AssetFilter, AssetInput, DeleteAck};
use crate::api::pager::Pager;
use crate::api::query::{DetailLevel, EntityType};

/// Typed operations on managed assets.
#[derive(Clone)]
pub struct AssetManager {
    inner: ResourceManager<Asset>,
}

impl AssetManager {
    pub(crate) fn new(client: SuperOpsClient) -> Self {
        Self {
            inner: ResourceManager::new(client, EntityType::Asset),
        }
    }

    pub fn with_detail(mut self, detail: DetailLevel) -> Self {
        self.inner = self.inner.with_detail(detail);
        self
    }

    pub fn list(&self, filter: Option<AssetFilter>) -> Result<Pager<Asset>, SuperOpsError> {
        self.list_with_page_size(filter, DEFAULT_PAGE_SIZE)
    }

    pub fn list_with_page_size(
        &self,
        filter: Option<AssetFilter>,
        page_size: u32,
    ) -> Result<Pager<Asset>, SuperOpsError> {
        let filter = filter.map(|f| serialize_input(&f)).transpose()?;
        self.inner.list(filter, page_size)
    }

    pub async fn get(&self, id: &str) -> Result<Asset, SuperOpsError> {
        self.inner.get(id).await
    }

    pub async fn create(&self, input: AssetInput) -> Result<Asset, SuperOpsError> {
        self.inner.create(&input, None).await
    }

    pub async fn create_idempotent(
        &self,
        input: AssetInput,
        idempotency_key: impl Into<String>,
    ) -> Result<Asset, SuperOpsError> {
        self.inner.create(&input, Some(idempotency_key.into())).await
    }

    pub async fn update(&self, id: &str, input: AssetInput) -> Result<Asset, SuperOpsError> {
        self.inner.update(id, &input, None).await
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteAck, SuperOpsError> {
        self.inner.delete(id).await
    }
}
