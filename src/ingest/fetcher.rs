// src/ingest/fetcher.rs
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;

use crate::error::FetchError;
use crate::ingest::parse::parse_feed;
use crate::ingest::types::{FeedFetcher, RawEntry};

/// Per-request bound for one feed download.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Identifying header sent with every feed request.
pub const USER_AGENT: &str = "ToneShiftGearNews/1.0";
/// Entries taken from the top of each feed.
pub const MAX_ENTRIES_PER_FEED: usize = 25;

/// Fetches feeds over HTTP with a single attempt per call.
#[derive(Clone)]
pub struct HttpFeedFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFeedFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Request(e)
        }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FetchError> {
        let t0 = Instant::now();

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.text().await.map_err(|e| self.classify(e))?;

        let mut entries = parse_feed(&body)?;
        entries.truncate(MAX_ENTRIES_PER_FEED);

        histogram!("import_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(target: "ingest", url, entries = entries.len(), "feed fetched");
        Ok(entries)
    }
}
