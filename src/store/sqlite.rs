// src/store/sqlite.rs
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
    },
    Pool, Row, Sqlite,
};
use tokio::time::Duration;
use tracing::{debug, info, instrument};

use super::{ts_from_sql, ts_to_sql, Item, NewItem, NewSource, Source, Store, UpsertOutcome};
use crate::error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    enabled BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER,
    title TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    guid TEXT,
    published_at TEXT,
    summary TEXT,
    author TEXT,
    tags TEXT NOT NULL DEFAULT '[]'
);
CREATE INDEX IF NOT EXISTS idx_items_published_at ON items (published_at);
CREATE INDEX IF NOT EXISTS idx_items_source_id ON items (source_id);
"#;

const ITEM_COLUMNS: &str =
    "id, source_id, title, url, guid, published_at, summary, author, tags";
const SOURCE_COLUMNS: &str = "id, name, url, enabled, created_at";

#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `database_url` and ensure the schema.
    #[instrument(target = "store", level = "info", skip_all, fields(url = %database_url))]
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        info!(target: "store", "database pool created");

        let store = Self { pool };
        store.initialize_schema().await?;
        Ok(store)
    }

    /// Private in-memory database, kept on a single long-lived connection.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.initialize_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn initialize_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        debug!(target: "store", "schema ensured");
        Ok(())
    }
}

fn source_from_row(row: &SqliteRow) -> Result<Source, StoreError> {
    let created_at: String = row.try_get("created_at")?;
    Ok(Source {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        url: row.try_get("url")?,
        enabled: row.try_get("enabled")?,
        created_at: ts_from_sql(&created_at)?,
    })
}

fn item_from_row(row: &SqliteRow) -> Result<Item, StoreError> {
    let published_at: Option<String> = row.try_get("published_at")?;
    let tags: String = row.try_get("tags")?;
    Ok(Item {
        id: row.try_get("id")?,
        source_id: row.try_get("source_id")?,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        guid: row.try_get("guid")?,
        published_at: published_at.as_deref().map(ts_from_sql).transpose()?,
        summary: row.try_get("summary")?,
        author: row.try_get("author")?,
        tags: serde_json::from_str(&tags)?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn enabled_sources(&self) -> Result<Vec<Source>, StoreError> {
        let sql = format!("SELECT {SOURCE_COLUMNS} FROM sources WHERE enabled = 1 ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(source_from_row).collect()
    }

    async fn list_sources(&self) -> Result<Vec<Source>, StoreError> {
        let sql = format!("SELECT {SOURCE_COLUMNS} FROM sources ORDER BY name, id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(source_from_row).collect()
    }

    async fn upsert_source(&self, source: &NewSource) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sources (name, url, enabled, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(url) DO UPDATE SET name = excluded.name, enabled = excluded.enabled
            "#,
        )
        .bind(&source.name)
        .bind(&source.url)
        .bind(source.enabled)
        .bind(ts_to_sql(Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(target = "store", level = "debug", skip_all, fields(batch = items.len()))]
    async fn insert_items(&self, items: &[NewItem]) -> Result<UpsertOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;

        for item in items {
            let tags = serde_json::to_string(&item.tags)?;
            let res = sqlx::query(
                r#"
                INSERT INTO items (source_id, title, url, guid, published_at, summary, author, tags)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(url) DO NOTHING
                "#,
            )
            .bind(item.source_id)
            .bind(&item.title)
            .bind(&item.url)
            .bind(&item.guid)
            .bind(item.published_at.map(ts_to_sql))
            .bind(&item.summary)
            .bind(&item.author)
            .bind(tags)
            .execute(&mut *tx)
            .await?;
            inserted += res.rows_affected() as usize;
        }

        tx.commit().await?;
        Ok(UpsertOutcome {
            attempted: items.len(),
            inserted,
        })
    }

    async fn items_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Item>, StoreError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE published_at IS NOT NULL AND published_at >= ?1 \
             ORDER BY published_at DESC, id DESC LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(ts_to_sql(cutoff))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn recent_items(
        &self,
        limit: usize,
        source_id: Option<i64>,
    ) -> Result<Vec<Item>, StoreError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE (?1 IS NULL OR source_id = ?1) \
             ORDER BY published_at IS NULL, published_at DESC, id DESC LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(source_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(item_from_row).collect()
    }
}
