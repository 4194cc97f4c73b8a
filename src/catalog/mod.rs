//! Song catalog: paged browsing, query policy and bulk loading.

pub mod loader;
pub mod query;
pub mod service;

pub use query::{CatalogIndex, QueryPlan, SongField, SongFilter};
pub use service::CatalogService;
