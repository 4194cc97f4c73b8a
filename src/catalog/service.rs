use std::sync::Arc;

use super::query::{QueryPlan, SongFilter};
use crate::config::CatalogConfig;
use crate::error::ApiError;
use crate::models::{CatalogKey, Song};
use crate::store::{CatalogStore, Page};

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    fn page_size(&self, limit: Option<u32>) -> Result<u32, ApiError> {
        match limit {
            None => Ok(self.config.default_page_size),
            Some(0) => Err(ApiError::validation("limit must be greater than 0")),
            Some(n) => Ok(n.min(self.config.max_page_size)),
        }
    }

    /// Continuation tokens are the JSON text of the previous page's key.
    pub fn decode_cursor(raw: Option<&str>) -> Result<Option<CatalogKey>, ApiError> {
        match raw.filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(text) => serde_json::from_str(text)
                .map(Some)
                .map_err(|_| ApiError::validation("Invalid last_evaluated_key")),
        }
    }

    /// One page of the catalog in store scan order.
    pub async fn list(
        &self,
        limit: Option<u32>,
        last_evaluated_key: Option<&str>,
    ) -> Result<Page<Song>, ApiError> {
        let limit = self.page_size(limit)?;
        let start_after = Self::decode_cursor(last_evaluated_key)?;

        self.store
            .scan_page(limit, start_after.as_ref())
            .await
            .map_err(ApiError::store("Error retrieving music"))
    }

    pub async fn query(&self, filter: SongFilter) -> Result<Vec<Song>, ApiError> {
        let filter = filter.normalized();
        let plan = filter.plan().ok_or_else(|| {
            ApiError::validation("At least one query parameter must be provided.")
        })?;

        let items = match plan {
            QueryPlan::Index { index, value } => {
                tracing::debug!(index = index.index_name(), "Catalog query via index");
                self.store.query_index(index, &value).await
            }
            QueryPlan::Scan(filter) => {
                tracing::debug!(fields = filter.fields().len(), "Catalog query via scan");
                self.store.scan_filtered(&filter).await
            }
        }
        .map_err(ApiError::store("Error querying music"))?;

        if items.is_empty() {
            return Err(ApiError::not_found(
                "No result is retrieved. Please query again.",
            ));
        }
        Ok(items)
    }
}
