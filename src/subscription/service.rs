use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{Song, Subscription};
use crate::store::{CatalogStore, SubscriptionStore};

pub struct SubscriptionService {
    subscriptions: Arc<dyn SubscriptionStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl SubscriptionService {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            subscriptions,
            catalog,
        }
    }

    /// Flip membership of `(email, album_id)` and return the new state.
    ///
    /// Two conditional writes: a delete that reports whether a row existed,
    /// then (only if nothing was deleted) an insert-if-absent. A concurrent
    /// toggle that wins the insert still leaves the pair subscribed.
    pub async fn toggle(&self, email: &str, album_id: &str) -> Result<bool, ApiError> {
        if album_id.is_empty() {
            return Err(ApiError::validation("composite_id is required"));
        }

        let removed = self
            .subscriptions
            .remove_subscription(email, album_id)
            .await
            .map_err(ApiError::store("Error updating subscription"))?;
        if removed {
            tracing::info!("{} unsubscribed from {}", email, album_id);
            return Ok(false);
        }

        let inserted = self
            .subscriptions
            .insert_subscription(&Subscription::new(email, album_id))
            .await
            .map_err(ApiError::store("Error updating subscription"))?;
        if !inserted {
            tracing::debug!("Concurrent subscribe for {} / {}", email, album_id);
        }
        tracing::info!("{} subscribed to {}", email, album_id);
        Ok(true)
    }

    /// Catalog entries for every album the user is subscribed to.
    ///
    /// One catalog lookup per subscription (N+1).
    pub async fn albums_for(&self, email: &str) -> Result<Vec<Song>, ApiError> {
        let subscriptions = self
            .subscriptions
            .list_subscriptions(email)
            .await
            .map_err(ApiError::store("Error retrieving subscriptions"))?;

        let mut albums = Vec::with_capacity(subscriptions.len());
        for sub in &subscriptions {
            let songs = self
                .catalog
                .find_by_composite_id(&sub.album_id)
                .await
                .map_err(ApiError::store("Error retrieving subscriptions"))?;
            if songs.is_empty() {
                tracing::warn!("Subscription {} has no catalog entry", sub.album_id);
            }
            albums.extend(songs);
        }
        Ok(albums)
    }
}
