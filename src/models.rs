//! Records persisted by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Separator between title and album in a composite id
pub const COMPOSITE_ID_SEPARATOR: &str = "|||";

/// Derive the composite identifier of a song.
pub fn composite_id(title: &str, album: &str) -> String {
    format!("{}{}{}", title, COMPOSITE_ID_SEPARATOR, album)
}

/// Registered user, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub user_name: String,
    /// PHC-format argon2 hash
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user (never carries the hash).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct UserProfile {
    #[schema(example = "a@b.com")]
    pub email: String,
    #[schema(example = "A")]
    pub user_name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            user_name: user.user_name.clone(),
        }
    }
}

/// Primary key of the catalog: (title, album).
///
/// Also the continuation token of a paged scan, exchanged with clients as JSON.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema,
)]
pub struct CatalogKey {
    pub title: String,
    pub album: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Song {
    #[schema(example = "Free Fallin'")]
    pub title: String,
    #[schema(example = "Full Moon Fever")]
    pub album: String,
    #[schema(example = "Tom Petty")]
    pub artist: String,
    #[schema(example = "1989")]
    pub year: String,
    #[schema(example = "Free Fallin'|||Full Moon Fever")]
    pub composite_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        album: impl Into<String>,
        artist: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let album = album.into();
        Self {
            composite_id: composite_id(&title, &album),
            title,
            album,
            artist: artist.into(),
            year: year.into(),
            web_url: None,
            img_url: None,
        }
    }

    pub fn key(&self) -> CatalogKey {
        CatalogKey {
            title: self.title.clone(),
            album: self.album.clone(),
        }
    }
}

/// Membership of a user in an album's subscriber set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub email: String,
    /// Composite id of the subscribed song/album
    pub album_id: String,
    pub subscribed_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(email: impl Into<String>, album_id: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            album_id: album_id.into(),
            subscribed_at: Utc::now(),
        }
    }
}
