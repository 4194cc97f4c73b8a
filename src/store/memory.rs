//! In-process store backend.
//!
//! Users and subscriptions live in `DashMap`s so insert-if-absent and delete
//! are single atomic map operations. The catalog is a `BTreeMap` keyed by
//! (title, album), which gives scans a stable primary-key order.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BTreeMap;
use std::ops::Bound;
use tokio::sync::RwLock;

use super::{CatalogStore, Page, StoreError, SubscriptionStore, UserStore};
use crate::catalog::query::{CatalogIndex, SongFilter};
use crate::models::{CatalogKey, Song, Subscription, User};

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    songs: RwLock<BTreeMap<CatalogKey, Song>>,
    /// (email, album_id) -> record
    subscriptions: DashMap<(String, String), Subscription>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn song_count(&self) -> usize {
        self.songs.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(email).map(|u| u.value().clone()))
    }

    async fn insert_user(&self, user: &User) -> Result<bool, StoreError> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn scan_page(
        &self,
        limit: u32,
        start_after: Option<&CatalogKey>,
    ) -> Result<Page<Song>, StoreError> {
        let songs = self.songs.read().await;
        let lower = match start_after {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Unbounded,
        };

        let items: Vec<Song> = songs
            .range((lower, Bound::Unbounded))
            .take(limit as usize)
            .map(|(_, song)| song.clone())
            .collect();

        // A full page may or may not be the last one; the client finds out
        // with one more (empty) request, same as any bounded scan.
        let last_evaluated_key = if items.len() == limit as usize {
            items.last().map(Song::key)
        } else {
            None
        };

        Ok(Page {
            items,
            last_evaluated_key,
        })
    }

    async fn query_index(
        &self,
        index: CatalogIndex,
        value: &str,
    ) -> Result<Vec<Song>, StoreError> {
        let songs = self.songs.read().await;
        Ok(songs
            .values()
            .filter(|song| index.value_of(song) == value)
            .cloned()
            .collect())
    }

    async fn scan_filtered(&self, filter: &SongFilter) -> Result<Vec<Song>, StoreError> {
        let songs = self.songs.read().await;
        Ok(songs
            .values()
            .filter(|song| filter.matches(song))
            .cloned()
            .collect())
    }

    async fn find_by_composite_id(&self, composite_id: &str) -> Result<Vec<Song>, StoreError> {
        let songs = self.songs.read().await;
        Ok(songs
            .values()
            .filter(|song| song.composite_id == composite_id)
            .cloned()
            .collect())
    }

    async fn put_song(&self, song: &Song) -> Result<(), StoreError> {
        self.songs.write().await.insert(song.key(), song.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn remove_subscription(&self, email: &str, album_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .subscriptions
            .remove(&(email.to_string(), album_id.to_string()))
            .is_some())
    }

    async fn insert_subscription(&self, subscription: &Subscription) -> Result<bool, StoreError> {
        let key = (subscription.email.clone(), subscription.album_id.clone());
        match self.subscriptions.entry(key) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(subscription.clone());
                Ok(true)
            }
        }
    }

    async fn list_subscriptions(&self, email: &str) -> Result<Vec<Subscription>, StoreError> {
        let mut subs: Vec<Subscription> = self
            .subscriptions
            .iter()
            .filter(|entry| entry.key().0 == email)
            .map(|entry| entry.value().clone())
            .collect();
        subs.sort_by(|a, b| a.album_id.cmp(&b.album_id));
        Ok(subs)
    }
}
