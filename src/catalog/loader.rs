//! Bulk catalog loader
//!
//! Reads a `{"songs": [...]}` document, normalises each entry and puts it into
//! a [`CatalogStore`] one song at a time.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use crate::models::Song;
use crate::store::CatalogStore;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_YEAR: &str = "Unknown Year";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    songs: Vec<RawSong>,
}

#[derive(Debug, Deserialize)]
struct RawSong {
    title: Option<String>,
    album: Option<String>,
    artist: Option<String>,
    /// Either `"1989"` or `1989` in the wild
    year: Option<Value>,
    web_url: Option<String>,
    img_url: Option<String>,
}

/// Parsed catalog, with the number of entries rejected for a missing key.
#[derive(Debug, Default)]
pub struct ParsedCatalog {
    pub songs: Vec<Song>,
    pub skipped: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn year_text(v: Option<Value>) -> Option<String> {
    match v? {
        Value::String(s) => non_empty(Some(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl RawSong {
    fn into_song(self) -> Option<Song> {
        let title = non_empty(self.title)?;
        let album = non_empty(self.album)?;
        let artist = non_empty(self.artist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let year = year_text(self.year).unwrap_or_else(|| UNKNOWN_YEAR.to_string());

        let mut song = Song::new(title, album, artist, year);
        song.web_url = non_empty(self.web_url);
        song.img_url = non_empty(self.img_url);
        Some(song)
    }
}

pub fn parse_catalog(json: &str) -> Result<ParsedCatalog, LoadError> {
    let file: CatalogFile = serde_json::from_str(json)?;
    let mut parsed = ParsedCatalog::default();

    for raw in file.songs {
        let label = format!("{:?} / {:?}", raw.title, raw.album);
        match raw.into_song() {
            Some(song) => parsed.songs.push(song),
            None => {
                tracing::warn!("Skipping incomplete song (missing title/album): {}", label);
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

pub fn read_catalog(path: impl AsRef<Path>) -> Result<ParsedCatalog, LoadError> {
    let content = std::fs::read_to_string(path)?;
    parse_catalog(&content)
}

/// Put every song; a failed put is logged and the load carries on.
pub async fn load_songs(store: &dyn CatalogStore, parsed: ParsedCatalog) -> LoadReport {
    let mut report = LoadReport {
        skipped: parsed.skipped,
        ..Default::default()
    };

    for song in &parsed.songs {
        match store.put_song(song).await {
            Ok(()) => report.inserted += 1,
            Err(e) => {
                tracing::error!("Error inserting {} - {}: {}", song.title, song.album, e);
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped,
        failed = report.failed,
        "Catalog load finished"
    );
    report
}
