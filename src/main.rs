//! Music Catalog gateway
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│  Store   │───▶│   Services   │───▶│ Gateway  │
//! │  (YAML)  │    │(PG / Mem)│    │(auth/catalog)│    │ (axum)   │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use music_catalog::catalog::loader::{load_songs, read_catalog};
use music_catalog::config::{AppConfig, StoreBackend};
use music_catalog::db::Database;
use music_catalog::gateway::{AppState, run_server};
use music_catalog::logging::init_logging;
use music_catalog::store::{MemoryStore, PgStore};

#[derive(Parser, Debug)]
#[command(name = "music_catalog")]
#[command(about = "Music catalog and album subscription service")]
#[command(version)]
struct Args {
    /// Config environment; reads config/{env}.yaml
    #[arg(short, long, default_value = "dev", env = "APP_ENV")]
    env: String,

    /// Override gateway.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.env)?;
    if let Some(port) = args.port {
        config.gateway.port = port;
    }
    let _log_guard = init_logging(&config)?;

    tracing::info!(
        env = %args.env,
        backend = ?config.store.backend,
        "Starting music catalog v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = match config.store.backend {
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            if let Some(seed) = &config.store.seed_file {
                let parsed = read_catalog(seed)
                    .with_context(|| format!("Failed to read seed catalog {}", seed))?;
                let report = load_songs(store.as_ref(), parsed).await;
                tracing::info!(
                    inserted = report.inserted,
                    skipped = report.skipped,
                    failed = report.failed,
                    "Seeded in-memory catalog from {}",
                    seed
                );
            }
            AppState::from_store(store, &config)?
        }
        StoreBackend::Postgres => {
            let db = Database::from_config(&config.store).await?;
            tracing::info!("Connected to PostgreSQL");
            AppState::from_store(Arc::new(PgStore::new(db.pool().clone())), &config)?
        }
    };

    run_server(&config.gateway, state).await
}
