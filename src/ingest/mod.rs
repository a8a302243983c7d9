// src/ingest/mod.rs
pub mod fetcher;
pub mod normalize;
pub mod parse;
pub mod types;

use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, SourceError, StoreError};
use crate::ingest::normalize::normalize_entry;
use crate::ingest::types::FeedFetcher;
use crate::store::{NewItem, Source, Store};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("import_runs_total", "Import runs started.");
        describe_counter!(
            "import_feeds_fetched_total",
            "Feeds fetched and parsed successfully."
        );
        describe_counter!(
            "import_source_errors_total",
            "Sources that failed during an import run."
        );
        describe_counter!(
            "import_items_upserted_total",
            "Rows submitted to the store (batch sizes)."
        );
        describe_counter!(
            "import_items_inserted_total",
            "Rows actually created by the store."
        );
        describe_histogram!("import_fetch_ms", "Feed fetch + parse time in milliseconds.");
    });
}

/// Per-source failure recorded in a run summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

/// Aggregate result of one import invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub ok: bool,
    pub sources_enabled: usize,
    pub feeds_fetched: usize,
    /// Sum of batch sizes handed to the store, including rows that already existed.
    pub items_upserted: usize,
    /// Rows that were new.
    pub items_inserted: usize,
    pub errors: Vec<SourceFailure>,
}

/// Gate on the shared secret, then import every enabled source.
pub async fn run_import(
    import_key: Option<&str>,
    provided_key: Option<&str>,
    store: &dyn Store,
    fetcher: &dyn FeedFetcher,
) -> Result<RunSummary, ImportError> {
    crate::auth::authorize(import_key, provided_key)?;
    Ok(import_enabled_sources(store, fetcher).await?)
}

/// Import every enabled source, one at a time.
///
/// Only the initial source read can fail the run; anything that goes wrong
/// for a single source lands in `RunSummary::errors`.
pub async fn import_enabled_sources(
    store: &dyn Store,
    fetcher: &dyn FeedFetcher,
) -> Result<RunSummary, StoreError> {
    ensure_metrics_described();
    counter!("import_runs_total").increment(1);

    let sources = store.enabled_sources().await?;
    let mut summary = RunSummary {
        ok: true,
        sources_enabled: sources.len(),
        ..Default::default()
    };

    for source in &sources {
        if let Err(e) = import_source(source, store, fetcher, &mut summary).await {
            tracing::warn!(
                target: "ingest",
                source = %source.name,
                url = %source.url,
                error = %e,
                "source import failed"
            );
            counter!("import_source_errors_total").increment(1);
            summary.errors.push(SourceFailure {
                source: source.name.clone(),
                error: e.to_string(),
            });
        }
    }

    counter!("import_feeds_fetched_total").increment(summary.feeds_fetched as u64);
    counter!("import_items_upserted_total").increment(summary.items_upserted as u64);
    counter!("import_items_inserted_total").increment(summary.items_inserted as u64);
    tracing::info!(
        target: "ingest",
        sources = summary.sources_enabled,
        fetched = summary.feeds_fetched,
        upserted = summary.items_upserted,
        inserted = summary.items_inserted,
        errors = summary.errors.len(),
        "import run finished"
    );

    Ok(summary)
}

async fn import_source(
    source: &Source,
    store: &dyn Store,
    fetcher: &dyn FeedFetcher,
    summary: &mut RunSummary,
) -> Result<(), SourceError> {
    let entries = fetcher.fetch(&source.url).await?;
    summary.feeds_fetched += 1;

    let rows: Vec<NewItem> = entries
        .iter()
        .filter_map(|e| normalize_entry(e, source.id))
        .collect();
    if rows.is_empty() {
        return Ok(());
    }

    let outcome = store.insert_items(&rows).await?;
    summary.items_upserted += outcome.attempted;
    summary.items_inserted += outcome.inserted;
    tracing::debug!(
        target: "ingest",
        source = %source.name,
        attempted = outcome.attempted,
        inserted = outcome.inserted,
        "batch written"
    );
    Ok(())
}
