//! Create the users, music and subscriptions tables and their indexes.
//!
//! Usage:
//!   DATABASE_URL=postgresql://... cargo run --bin provision

use anyhow::{Context, Result};
use clap::Parser;

use music_catalog::db::Database;
use music_catalog::store::schema::init_schema;

#[derive(Parser, Debug)]
#[command(about = "Provision the music catalog schema in PostgreSQL")]
struct Args {
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
    let db = Database::connect(&args.database_url, 1)
        .await
        .context("Failed to connect to PostgreSQL")?;

    init_schema(db.pool()).await?;
    tracing::info!("Schema ready");
    Ok(())
}
