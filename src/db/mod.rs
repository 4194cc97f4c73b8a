//! PostgreSQL pool for the catalog store

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::{Duration, Instant};

use crate::config::StoreConfig;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Connect using the `store` section and fail fast if the server does not answer.
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        let url = config
            .postgres_url
            .as_deref()
            .context("store.postgres_url is not set (or export DATABASE_URL)")?;
        let db = Self::connect(url, config.max_connections)
            .await
            .context("Failed to connect to PostgreSQL")?;
        db.health_check()
            .await
            .context("PostgreSQL health check failed")?;
        Ok(db)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        let started = Instant::now();
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "PostgreSQL ping");
        Ok(())
    }
}
