// src/digest/mod.rs
//! Weekly digest: recent items grouped by category, each bucket capped.

pub mod categories;

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::{Item, Store};

pub use categories::{categorize, category_infos, CategoryInfo, CATEGORIES, OTHER_KEY};

pub const DEFAULT_DAYS: i64 = 7;
pub const DEFAULT_LIMIT: usize = 120;
pub const MAX_DAYS: i64 = 365;
pub const MAX_LIMIT: usize = 1000;
/// Items kept per category bucket.
pub const BUCKET_CAP: usize = 10;

/// Window + cap for one digest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestQuery {
    pub days: i64,
    pub limit: usize,
}

impl Default for DigestQuery {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl DigestQuery {
    /// Fill in defaults and clamp to sane bounds.
    pub fn new(days: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            days: days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS),
            limit: limit
                .map(|l| l.clamp(1, MAX_LIMIT as i64) as usize)
                .unwrap_or(DEFAULT_LIMIT),
        }
    }
}

/// Item fields shown in a digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DigestItem {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

impl From<Item> for DigestItem {
    fn from(it: Item) -> Self {
        Self {
            id: it.id,
            title: it.title,
            url: it.url,
            published_at: it.published_at,
            summary: it.summary,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub since: DateTime<Utc>,
    pub days: i64,
    pub counts: BTreeMap<&'static str, usize>,
    pub categories: Vec<CategoryInfo>,
    pub grouped: BTreeMap<&'static str, Vec<DigestItem>>,
}

/// Read the window from the store and group it. Read failures yield no digest.
pub async fn build_digest(
    store: &dyn Store,
    query: DigestQuery,
    now: DateTime<Utc>,
) -> Result<Digest, StoreError> {
    counter!("digest_requests_total").increment(1);

    let since = now - Duration::days(query.days);
    let items = store.items_since(since, query.limit).await?;
    tracing::debug!(target: "digest", days = query.days, fetched = items.len(), "digest window read");

    Ok(group_items(since, query.days, items))
}

/// Partition already-ordered items into every known bucket, capping each one.
pub fn group_items(since: DateTime<Utc>, days: i64, items: Vec<Item>) -> Digest {
    let mut grouped: BTreeMap<&'static str, Vec<DigestItem>> = categories::all_keys()
        .map(|k| (k, Vec::new()))
        .collect();

    for it in items {
        let bucket = grouped.entry(categorize(&it.title)).or_default();
        if bucket.len() < BUCKET_CAP {
            bucket.push(DigestItem::from(it));
        }
    }

    let counts = grouped.iter().map(|(k, v)| (*k, v.len())).collect();

    Digest {
        since,
        days,
        counts,
        categories: category_infos(),
        grouped,
    }
}

/// Copy-pasteable text rendering. Empty buckets are skipped, `other` goes last.
pub fn render_text(digest: &Digest) -> String {
    let mut lines: Vec<String> = vec![
        format!("ToneShift Weekly Gear News - last {} days", digest.days),
        format!("Since: {}", digest.since.format("%d/%m/%Y")),
        String::new(),
    ];

    for key in categories::all_keys() {
        let Some(items) = digest.grouped.get(key).filter(|v| !v.is_empty()) else {
            continue;
        };
        lines.push(categories::label_for(key).to_string());
        for it in items {
            lines.push(format!("- {}", it.title));
            lines.push(format!("  {}", it.url));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
