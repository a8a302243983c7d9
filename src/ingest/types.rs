// src/ingest/types.rs
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One entry as it came out of a feed document, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    /// ISO-style date (`dc:date`, Atom `published`/`updated`).
    pub iso_date: Option<String>,
    /// RSS `pubDate`, usually RFC 2822.
    pub pub_date: Option<String>,
    /// Plain-text snippet of the entry body.
    pub content_snippet: Option<String>,
    pub creator: Option<String>,
    pub author: Option<String>,
}

#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch and parse the feed at `url`, returning at most the first
    /// `MAX_ENTRIES_PER_FEED` entries in feed order.
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FetchError>;
}
