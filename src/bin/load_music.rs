//! Bulk-load a catalog JSON file (`{"songs": [...]}`) into PostgreSQL.
//!
//! Usage:
//!   DATABASE_URL=postgresql://... cargo run --bin load_music -- 2025a1.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use music_catalog::catalog::loader::{load_songs, read_catalog};
use music_catalog::db::Database;
use music_catalog::store::PgStore;

#[derive(Parser, Debug)]
#[command(about = "Load songs from a catalog file into the music table")]
struct Args {
    /// Catalog file
    #[arg(default_value = "2025a1.json")]
    path: PathBuf,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let args = Args::parse();
    let parsed = read_catalog(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    tracing::info!(
        songs = parsed.songs.len(),
        skipped = parsed.skipped,
        "Parsed {}",
        args.path.display()
    );

    let db = Database::connect(&args.database_url, 4)
        .await
        .context("Failed to connect to PostgreSQL")?;
    let store = PgStore::new(db.pool().clone());

    let report = load_songs(&store, parsed).await;
    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped,
        failed = report.failed,
        "Load finished"
    );
    if report.failed > 0 {
        anyhow::bail!("{} songs failed to load", report.failed);
    }
    Ok(())
}
