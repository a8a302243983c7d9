// src/store/memory.rs
//! In-process `Store` used by tests and local tooling. Same semantics as SQLite:
//! unique `url`, insert-if-absent, store-generated ids.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Item, NewItem, NewSource, Source, Store, UpsertOutcome};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    sources: Vec<Source>,
    items: Vec<Item>,
    next_source_id: i64,
    next_item_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items.
    pub fn item_count(&self) -> usize {
        self.inner.lock().expect("memory store mutex poisoned").items.len()
    }
}

/// Newest first; undated items sort after every dated one.
fn newest_first(a: &Item, b: &Item) -> std::cmp::Ordering {
    match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x).then(b.id.cmp(&a.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn enabled_sources(&self) -> Result<Vec<Source>, StoreError> {
        let g = self.inner.lock().expect("memory store mutex poisoned");
        Ok(g.sources.iter().filter(|s| s.enabled).cloned().collect())
    }

    async fn list_sources(&self) -> Result<Vec<Source>, StoreError> {
        let g = self.inner.lock().expect("memory store mutex poisoned");
        let mut out = g.sources.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn upsert_source(&self, source: &NewSource) -> Result<(), StoreError> {
        let mut g = self.inner.lock().expect("memory store mutex poisoned");
        if let Some(existing) = g.sources.iter_mut().find(|s| s.url == source.url) {
            existing.name = source.name.clone();
            existing.enabled = source.enabled;
            return Ok(());
        }
        g.next_source_id += 1;
        let id = g.next_source_id;
        g.sources.push(Source {
            id,
            name: source.name.clone(),
            url: source.url.clone(),
            enabled: source.enabled,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn insert_items(&self, items: &[NewItem]) -> Result<UpsertOutcome, StoreError> {
        let mut g = self.inner.lock().expect("memory store mutex poisoned");
        let mut inserted = 0usize;
        for it in items {
            if g.items.iter().any(|existing| existing.url == it.url) {
                continue;
            }
            g.next_item_id += 1;
            let id = g.next_item_id;
            g.items.push(Item {
                id,
                source_id: Some(it.source_id),
                title: it.title.clone(),
                url: it.url.clone(),
                guid: it.guid.clone(),
                published_at: it.published_at,
                summary: it.summary.clone(),
                author: it.author.clone(),
                tags: it.tags.clone(),
            });
            inserted += 1;
        }
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
        let g = self.inner.lock().expect("memory store mutex poisoned");
        let mut out: Vec<Item> = g
            .items
            .iter()
            .filter(|it| it.published_at.is_some_and(|ts| ts >= cutoff))
            .cloned()
            .collect();
        out.sort_by(newest_first);
        out.truncate(limit);
        Ok(out)
    }

    async fn recent_items(
        &self,
        limit: usize,
        source_id: Option<i64>,
    ) -> Result<Vec<Item>, StoreError> {
        let g = self.inner.lock().expect("memory store mutex poisoned");
        let mut out: Vec<Item> = g
            .items
            .iter()
            .filter(|it| source_id.is_none() || it.source_id == source_id)
            .cloned()
            .collect();
        out.sort_by(newest_first);
        out.truncate(limit);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_item(url: &str, day: u32) -> NewItem {
        NewItem {
            source_id: 1,
            title: format!("item {url}"),
            url: url.to_string(),
            guid: None,
            published_at: Some(Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()),
            summary: None,
            author: None,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn duplicate_urls_are_ignored_but_counted_as_attempted() {
        let store = MemoryStore::new();
        let out = store
            .insert_items(&[new_item("https://x/a", 1), new_item("https://x/a", 2)])
            .await
            .unwrap();
        assert_eq!(out, UpsertOutcome { attempted: 2, inserted: 1 });
        assert_eq!(store.item_count(), 1);
        // the first write wins; nothing is updated
        let kept = store.recent_items(10, None).await.unwrap();
        assert_eq!(kept[0].published_at.unwrap().format("%d").to_string(), "01");
    }

    #[tokio::test]
    async fn recent_items_put_undated_last() {
        let store = MemoryStore::new();
        let mut undated = new_item("https://x/u", 1);
        undated.published_at = None;
        store
            .insert_items(&[undated, new_item("https://x/a", 1), new_item("https://x/b", 5)])
            .await
            .unwrap();
        let urls: Vec<String> = store
            .recent_items(10, None)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.url)
            .collect();
        assert_eq!(urls, vec!["https://x/b", "https://x/a", "https://x/u"]);
    }
}
