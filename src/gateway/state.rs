use chrono::Duration;
use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::config::AppConfig;
use crate::store::{CatalogStore, SubscriptionStore, UserStore};
use crate::subscription::SubscriptionService;
use crate::user_auth::{PasswordError, PasswordHasher, TokenIssuer, UserAuthService};

/// Shared gateway state. Every store client is injected here; nothing is global.
#[derive(Clone)]
pub struct AppState {
    pub user_auth: Arc<UserAuthService>,
    pub catalog: Arc<CatalogService>,
    pub subscriptions: Arc<SubscriptionService>,
}

impl AppState {
    pub fn new(
        user_auth: Arc<UserAuthService>,
        catalog: Arc<CatalogService>,
        subscriptions: Arc<SubscriptionService>,
    ) -> Self {
        Self {
            user_auth,
            catalog,
            subscriptions,
        }
    }

    /// Wire all services onto one backend implementing every store trait.
    pub fn from_store<S>(store: Arc<S>, config: &AppConfig) -> Result<Self, PasswordError>
    where
        S: UserStore + CatalogStore + SubscriptionStore + 'static,
    {
        let hasher =
            PasswordHasher::new(config.auth.argon2_memory_kib, config.auth.argon2_iterations)?;
        let tokens = TokenIssuer::new(
            &config.auth.jwt_secret,
            Duration::try_hours(config.auth.token_ttl_hours).unwrap_or(Duration::MAX),
        );

        let users: Arc<dyn UserStore> = store.clone();
        let catalog: Arc<dyn CatalogStore> = store.clone();
        let subscriptions: Arc<dyn SubscriptionStore> = store;

        Ok(Self::new(
            Arc::new(UserAuthService::new(users, hasher, tokens)),
            Arc::new(CatalogService::new(catalog.clone(), config.catalog.clone())),
            Arc::new(SubscriptionService::new(subscriptions, catalog)),
        ))
    }
}
