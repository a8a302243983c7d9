// tests/common/mod.rs
// Shared doubles for integration tests: a scripted fetcher and a store with failure switches.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gearnews::error::{FetchError, StoreError};
use gearnews::ingest::parse::parse_feed;
use gearnews::ingest::types::{FeedFetcher, RawEntry};
use gearnews::store::{Item, MemoryStore, NewItem, NewSource, Source, Store, UpsertOutcome};

pub enum Scripted {
    Entries(Vec<RawEntry>),
    Xml(String),
    Timeout,
    Status(u16),
}

/// Fetcher that answers from a url → response table and records call order.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: HashMap<String, Scripted>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, response: Scripted) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Scripted::Entries(v)) => Ok(v.clone()),
            Some(Scripted::Xml(xml)) => parse_feed(xml),
            Some(Scripted::Timeout) => Err(FetchError::Timeout(Duration::from_secs(15))),
            Some(Scripted::Status(code)) => Err(FetchError::Status(*code)),
            None => Err(FetchError::Status(404)),
        }
    }
}

pub fn entry(title: &str, link: &str, iso_date: Option<&str>) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        link: Some(link.to_string()),
        iso_date: iso_date.map(str::to_string),
        ..Default::default()
    }
}

pub fn source(name: &str, url: &str) -> NewSource {
    NewSource {
        name: name.to_string(),
        url: url.to_string(),
        enabled: true,
    }
}

pub async fn memory_store_with(sources: &[NewSource]) -> MemoryStore {
    let store = MemoryStore::new();
    for s in sources {
        store.upsert_source(s).await.unwrap();
    }
    store
}

/// MemoryStore wrapper whose reads or writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_reads: AtomicBool,
    pub fail_writes_for_source: Mutex<Option<i64>>,
}

impl FlakyStore {
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes_for(&self, source_id: i64) {
        *self.fail_writes_for_source.lock().unwrap() = Some(source_id);
    }

    fn read_guard(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Corrupt("simulated read failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn enabled_sources(&self) -> Result<Vec<Source>, StoreError> {
        self.read_guard()?;
        self.inner.enabled_sources().await
    }

    async fn list_sources(&self) -> Result<Vec<Source>, StoreError> {
        self.read_guard()?;
        self.inner.list_sources().await
    }

    async fn upsert_source(&self, source: &NewSource) -> Result<(), StoreError> {
        self.inner.upsert_source(source).await
    }

    async fn insert_items(&self, items: &[NewItem]) -> Result<UpsertOutcome, StoreError> {
        let failing = *self.fail_writes_for_source.lock().unwrap();
        if items.iter().any(|it| Some(it.source_id) == failing) {
            return Err(StoreError::Corrupt("simulated write failure".into()));
        }
        self.inner.insert_items(items).await
    }

    async fn items_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Item>, StoreError> {
        self.read_guard()?;
        self.inner.items_since(cutoff, limit).await
    }

    async fn recent_items(
        &self,
        limit: usize,
        source_id: Option<i64>,
    ) -> Result<Vec<Item>, StoreError> {
        self.read_guard()?;
        self.inner.recent_items(limit, source_id).await
    }
}
