//! Store access layer
//!
//! Three narrow traits, one per collection. Handlers never see a backend type;
//! `AppState` holds them as trait objects.
//!
//! - [`postgres::PgStore`]: sqlx / PostgreSQL
//! - [`memory::MemoryStore`]: in-process maps (tests, local development)

pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::query::{CatalogIndex, SongFilter};
use crate::models::{CatalogKey, Song, Subscription, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure reported by a backend that does not speak sqlx. Custom
    /// `CatalogStore` / `UserStore` implementations report through this.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// One page of a bounded scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Exclusive start key for the next page. `None` once the scan is exhausted.
    pub last_evaluated_key: Option<CatalogKey>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert-if-absent keyed by email. Returns `false` when the email is taken.
    async fn insert_user(&self, user: &User) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Scan in primary-key order, starting strictly after `start_after`.
    async fn scan_page(
        &self,
        limit: u32,
        start_after: Option<&CatalogKey>,
    ) -> Result<Page<Song>, StoreError>;

    /// Exact-match lookup through a secondary index.
    async fn query_index(&self, index: CatalogIndex, value: &str)
    -> Result<Vec<Song>, StoreError>;

    /// Full scan keeping songs that satisfy every field of `filter`.
    async fn scan_filtered(&self, filter: &SongFilter) -> Result<Vec<Song>, StoreError>;

    async fn find_by_composite_id(&self, composite_id: &str) -> Result<Vec<Song>, StoreError>;

    /// Upsert by primary key (bulk loader).
    async fn put_song(&self, song: &Song) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Delete the membership. Returns whether it existed.
    async fn remove_subscription(&self, email: &str, album_id: &str) -> Result<bool, StoreError>;

    /// Insert-if-absent. Returns `false` when the membership already existed.
    async fn insert_subscription(&self, subscription: &Subscription) -> Result<bool, StoreError>;

    async fn list_subscriptions(&self, email: &str) -> Result<Vec<Subscription>, StoreError>;
}
