//! Catalog query policy
//!
//! A lone artist, year or album goes through the matching secondary index
//! (exact match). Any other combination, including a lone title, falls back to
//! a full scan AND-ing substring filters over every supplied field.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::models::Song;

/// Secondary indexes over the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogIndex {
    Artist,
    Year,
    Album,
}

impl CatalogIndex {
    pub fn column(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Year => "year",
            Self::Album => "album",
        }
    }

    pub fn index_name(self) -> &'static str {
        match self {
            Self::Artist => "music_artist_idx",
            Self::Year => "music_year_idx",
            Self::Album => "music_album_idx",
        }
    }

    pub fn value_of(self, song: &Song) -> &str {
        match self {
            Self::Artist => &song.artist,
            Self::Year => &song.year,
            Self::Album => &song.album,
        }
    }
}

/// Searchable song fields, in the order filters are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongField {
    Title,
    Artist,
    Year,
    Album,
}

impl SongField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Artist => "artist",
            Self::Year => "year",
            Self::Album => "album",
        }
    }

    pub fn value_of(self, song: &Song) -> &str {
        match self {
            Self::Title => &song.title,
            Self::Artist => &song.artist,
            Self::Year => &song.year,
            Self::Album => &song.album,
        }
    }
}

/// Query parameters of `GET /music/query`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SongFilter {
    /// Substring of the song title
    pub title: Option<String>,
    /// Artist (exact when given alone)
    pub artist: Option<String>,
    /// Release year (exact when given alone)
    pub year: Option<String>,
    /// Album (exact when given alone)
    pub album: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    Index { index: CatalogIndex, value: String },
    Scan(SongFilter),
}

impl SongFilter {
    /// Drop empty values so `?artist=` behaves like an absent parameter.
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Self {
            title: keep(self.title),
            artist: keep(self.artist),
            year: keep(self.year),
            album: keep(self.album),
        }
    }

    /// Supplied (field, value) pairs.
    pub fn fields(&self) -> Vec<(SongField, &str)> {
        [
            (SongField::Title, &self.title),
            (SongField::Artist, &self.artist),
            (SongField::Year, &self.year),
            (SongField::Album, &self.album),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Conjunction of case-sensitive substring containment.
    pub fn matches(&self, song: &Song) -> bool {
        self.fields()
            .into_iter()
            .all(|(field, value)| field.value_of(song).contains(value))
    }

    /// `None` when no field is supplied.
    pub fn plan(&self) -> Option<QueryPlan> {
        let fields = self.fields();
        match fields.as_slice() {
            [] => None,
            [(field, value)] => {
                let index = match field {
                    SongField::Artist => Some(CatalogIndex::Artist),
                    SongField::Year => Some(CatalogIndex::Year),
                    SongField::Album => Some(CatalogIndex::Album),
                    SongField::Title => None,
                };
                Some(match index {
                    Some(index) => QueryPlan::Index {
                        index,
                        value: (*value).to_string(),
                    },
                    None => QueryPlan::Scan(self.clone()),
                })
            }
            _ => Some(QueryPlan::Scan(self.clone())),
        }
    }
}
