//! PostgreSQL store backend.
//!
//! Conditional writes (`ON CONFLICT DO NOTHING`, `DELETE` row counts) stand in
//! for read-then-write sequences, so concurrent registrations or toggles
//! cannot both succeed.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use super::{CatalogStore, Page, StoreError, SubscriptionStore, UserStore};
use crate::catalog::query::{CatalogIndex, SongFilter};
use crate::models::{CatalogKey, Song, Subscription, User};

const SELECT_SONG: &str =
    "SELECT title, album, artist, year, composite_id, web_url, img_url FROM music";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn song_from_row(row: &PgRow) -> Result<Song, sqlx::Error> {
    Ok(Song {
        title: row.try_get("title")?,
        album: row.try_get("album")?,
        artist: row.try_get("artist")?,
        year: row.try_get("year")?,
        composite_id: row.try_get("composite_id")?,
        web_url: row.try_get("web_url")?,
        img_url: row.try_get("img_url")?,
    })
}

fn songs_from_rows(rows: &[PgRow]) -> Result<Vec<Song>, StoreError> {
    rows.iter()
        .map(|row| song_from_row(row).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"SELECT email, user_name, password_hash, created_at
               FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };
        Ok(Some(User {
            email: r.try_get("email")?,
            user_name: r.try_get("user_name")?,
            password_hash: r.try_get("password_hash")?,
            created_at: r.try_get("created_at")?,
        }))
    }

    async fn insert_user(&self, user: &User) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"INSERT INTO users (email, user_name, password_hash, created_at)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (email) DO NOTHING"#,
        )
        .bind(&user.email)
        .bind(&user.user_name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn scan_page(
        &self,
        limit: u32,
        start_after: Option<&CatalogKey>,
    ) -> Result<Page<Song>, StoreError> {
        let rows = match start_after {
            Some(key) => {
                let sql = format!(
                    "{} WHERE (title, album) > ($1, $2) ORDER BY title, album LIMIT $3",
                    SELECT_SONG
                );
                sqlx::query(&sql)
                    .bind(&key.title)
                    .bind(&key.album)
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{} ORDER BY title, album LIMIT $1", SELECT_SONG);
                sqlx::query(&sql)
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let items = songs_from_rows(&rows)?;
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
        // Column comes from a closed enum, never from the request
        let sql = format!(
            "{} WHERE {} = $1 ORDER BY title, album",
            SELECT_SONG,
            index.column()
        );
        let rows = sqlx::query(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        songs_from_rows(&rows)
    }

    async fn scan_filtered(&self, filter: &SongFilter) -> Result<Vec<Song>, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_SONG);
        qb.push(" WHERE TRUE");
        for (field, value) in filter.fields() {
            qb.push(" AND strpos(")
                .push(field.column())
                .push(", ")
                .push_bind(value.to_string())
                .push(") > 0");
        }
        qb.push(" ORDER BY title, album");

        let rows = qb.build().fetch_all(&self.pool).await?;
        songs_from_rows(&rows)
    }

    async fn find_by_composite_id(&self, composite_id: &str) -> Result<Vec<Song>, StoreError> {
        let sql = format!("{} WHERE composite_id = $1", SELECT_SONG);
        let rows = sqlx::query(&sql)
            .bind(composite_id)
            .fetch_all(&self.pool)
            .await?;
        songs_from_rows(&rows)
    }

    async fn put_song(&self, song: &Song) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO music (title, album, artist, year, composite_id, web_url, img_url)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (title, album) DO UPDATE SET
                   artist = EXCLUDED.artist,
                   year = EXCLUDED.year,
                   composite_id = EXCLUDED.composite_id,
                   web_url = EXCLUDED.web_url,
                   img_url = EXCLUDED.img_url"#,
        )
        .bind(&song.title)
        .bind(&song.album)
        .bind(&song.artist)
        .bind(&song.year)
        .bind(&song.composite_id)
        .bind(&song.web_url)
        .bind(&song.img_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn remove_subscription(&self, email: &str, album_id: &str) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM subscriptions WHERE email = $1 AND album_id = $2")
            .bind(email)
            .bind(album_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_subscription(&self, subscription: &Subscription) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"INSERT INTO subscriptions (email, album_id, subscribed_at)
               VALUES ($1, $2, $3)
               ON CONFLICT (email, album_id) DO NOTHING"#,
        )
        .bind(&subscription.email)
        .bind(&subscription.album_id)
        .bind(subscription.subscribed_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn list_subscriptions(&self, email: &str) -> Result<Vec<Subscription>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT email, album_id, subscribed_at
               FROM subscriptions WHERE email = $1
               ORDER BY album_id"#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| -> Result<Subscription, StoreError> {
                Ok(Subscription {
                    email: r.try_get("email")?,
                    album_id: r.try_get("album_id")?,
                    subscribed_at: r.try_get("subscribed_at")?,
                })
            })
            .collect()
    }
}
