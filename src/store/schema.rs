use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::catalog::query::CatalogIndex;

pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    email         TEXT PRIMARY KEY,
    user_name     TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

pub const CREATE_MUSIC_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS music (
    title        TEXT NOT NULL,
    album        TEXT NOT NULL,
    artist       TEXT NOT NULL,
    year         TEXT NOT NULL,
    composite_id TEXT NOT NULL,
    web_url      TEXT,
    img_url      TEXT,
    PRIMARY KEY (title, album)
)
"#;

pub const CREATE_SUBSCRIPTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS subscriptions (
    email         TEXT NOT NULL,
    album_id      TEXT NOT NULL,
    subscribed_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (email, album_id)
)
"#;

const CREATE_COMPOSITE_ID_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS music_composite_id_idx ON music (composite_id)";

fn create_index_sql(index: CatalogIndex) -> String {
    // Secondary indexes sort by the primary key inside each partition
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON music ({}, title, album)",
        index.index_name(),
        index.column()
    )
}

/// Create tables and secondary indexes. Safe to run repeatedly.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing music catalog schema...");

    sqlx::query(CREATE_USERS_TABLE)
        .execute(pool)
        .await
        .context("Failed to create users table")?;

    sqlx::query(CREATE_MUSIC_TABLE)
        .execute(pool)
        .await
        .context("Failed to create music table")?;

    sqlx::query(CREATE_SUBSCRIPTIONS_TABLE)
        .execute(pool)
        .await
        .context("Failed to create subscriptions table")?;

    for index in [CatalogIndex::Artist, CatalogIndex::Year, CatalogIndex::Album] {
        sqlx::query(&create_index_sql(index))
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create index {}", index.index_name()))?;
    }

    sqlx::query(CREATE_COMPOSITE_ID_INDEX)
        .execute(pool)
        .await
        .context("Failed to create composite id index")?;

    tracing::info!("Music catalog schema initialized successfully");
    Ok(())
}
