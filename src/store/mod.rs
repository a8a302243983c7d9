// src/store/mod.rs
//! Persistent collections for sources and items.
//!
//! The `Store` trait is the seam between the pipeline and persistence. The only
//! concurrency guarantee the service relies on lives here: `url` is unique in
//! `items`, and `insert_items` never overwrites an existing row.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A configured feed origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Source definition as it appears in configuration, before the store assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSource {
    pub name: String,
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Normalized feed entry ready to be written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewItem {
    pub source_id: i64,
    pub title: String,
    pub url: String,
    pub guid: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
}

/// A persisted item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub source_id: Option<i64>,
    pub title: String,
    pub url: String,
    pub guid: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
}

/// Result of one batch write.
///
/// `attempted` is the batch size; `inserted` is how many rows were new.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub attempted: usize,
    pub inserted: usize,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Sources with `enabled = true`, in creation order.
    async fn enabled_sources(&self) -> Result<Vec<Source>, StoreError>;

    /// All sources ordered by name.
    async fn list_sources(&self) -> Result<Vec<Source>, StoreError>;

    /// Insert a source, or refresh `name`/`enabled` of the one sharing its url.
    async fn upsert_source(&self, source: &NewSource) -> Result<(), StoreError>;

    /// Insert-if-absent keyed on `url`, atomically for the whole batch.
    async fn insert_items(&self, items: &[NewItem]) -> Result<UpsertOutcome, StoreError>;

    /// Items published at or after `cutoff`, newest first.
    async fn items_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Item>, StoreError>;

    /// Newest items first, undated ones last, optionally for one source.
    async fn recent_items(
        &self,
        limit: usize,
        source_id: Option<i64>,
    ) -> Result<Vec<Item>, StoreError>;
}

/// Fixed-width UTC text form so that string order matches time order in SQL.
pub(crate) fn ts_to_sql(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn ts_from_sql(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sql_timestamps_sort_lexicographically() {
        let a = Utc.with_ymd_and_hms(2026, 1, 9, 23, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 1, 10, 1, 0, 0).unwrap();
        assert!(ts_to_sql(a) < ts_to_sql(b));
        assert_eq!(ts_from_sql(&ts_to_sql(a)).unwrap(), a);
    }

    #[test]
    fn new_source_defaults_to_enabled() {
        let s: NewSource = serde_json::from_str(r#"{"name":"A","url":"https://a/feed"}"#).unwrap();
        assert!(s.enabled);
    }
}
