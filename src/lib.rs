//! Music Catalog - subscription web service
//!
//! Users register and log in with hashed passwords, receive a bearer JWT,
//! browse a paginated song catalog and subscribe to albums.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing subscriber setup
//! - [`models`] - User, Song and Subscription records
//! - [`store`] - Storage traits with Postgres and in-memory backends
//! - [`db`] - Postgres connection pool
//! - [`catalog`] - Catalog listing, querying and bulk loading
//! - [`user_auth`] - Registration, login, password hashing and tokens
//! - [`subscription`] - Album subscription toggling and listing
//! - [`gateway`] - HTTP router, handlers and OpenAPI docs

pub mod config;
pub mod error;
pub mod logging;
pub mod models;

// Persistence
pub mod db;
pub mod store;

// Services
pub mod catalog;
pub mod subscription;
pub mod user_auth;

pub mod gateway;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use error::ApiError;
pub use gateway::{AppState, build_router};
pub use models::{CatalogKey, Song, Subscription, User, UserProfile};
pub use store::{MemoryStore, PgStore, StoreError};
