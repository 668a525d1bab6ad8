use std::str::FromStr;

use async_trait::async_trait;
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::errors::StorageError;
use crate::services::{PageCatalog, PageStore};
use crate::types::{Page, Title};

/// Upper bound on the number of titles returned by [`DatabaseStore::list`]
pub const DEFAULT_CATALOG_LIMIT: usize = 100;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS pages (
    perma TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    body  BLOB NOT NULL
)";

/// Storage key used by the database backend: the title lower-cased.
///
/// `Foo` and `foo` share a permalink and therefore a single document.
pub fn permalink(title: &Title) -> String {
    title.as_str().to_ascii_lowercase()
}

/// Page store backed by a SQLite `pages` table, one row per permalink
#[derive(Clone, Debug)]
pub struct DatabaseStore {
    pool: SqlitePool,
    catalog_limit: usize,
}

impl DatabaseStore {
    /// Connect to `url` and make sure the `pages` table exists.
    ///
    /// In-memory databases are pinned to one long-lived connection, since each
    /// SQLite connection would otherwise see its own empty database.
    pub async fn connect(url: &str, catalog_limit: usize) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;

        info!("Using database store at {} (catalog limit {})", url, catalog_limit);
        Ok(Self { pool, catalog_limit })
    }

    /// Drain the connection pool
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Database pool closed");
    }
}

#[async_trait]
impl PageStore for DatabaseStore {
    async fn load(&self, title: &Title) -> Result<Page, StorageError> {
        let perma = permalink(title);
        let row = sqlx::query_as::<_, (String, Vec<u8>)>(
            "SELECT title, body FROM pages WHERE perma = ?1",
        )
        .bind(&perma)
        .fetch_optional(&self.pool)
        .await;

        match row {
            Ok(Some((stored_title, body))) => {
                // Rows are only written through validated titles
                let title = Title::parse(&stored_title).unwrap_or_else(|_| title.clone());
                Ok(Page::new(title, body))
            }
            Ok(None) => Err(StorageError::NotFound),
            Err(e) => {
                debug!("Could not load page '{}': {}", perma, e);
                Err(StorageError::NotFound)
            }
        }
    }

    async fn save(&self, page: &Page) -> Result<(), StorageError> {
        let perma = permalink(&page.title);
        sqlx::query(
            "INSERT INTO pages (perma, title, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(perma) DO UPDATE SET title = excluded.title, body = excluded.body",
        )
        .bind(&perma)
        .bind(page.title.as_str())
        .bind(page.body.as_slice())
        .execute(&self.pool)
        .await?;
        info!("Upserted page '{}', {} bytes", perma, page.body.len());
        Ok(())
    }
}

#[async_trait]
impl PageCatalog for DatabaseStore {
    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let limit = i64::try_from(self.catalog_limit).unwrap_or(i64::MAX);
        let titles = sqlx::query_scalar::<_, String>("SELECT title FROM pages LIMIT ?1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        debug!("Listed {} pages", titles.len());
        Ok(titles)
    }
}
