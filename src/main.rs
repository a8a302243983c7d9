//! Gear News service: binary entrypoint.
//! Boots the Axum HTTP server, wiring the store, the feed fetcher, and metrics.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use gearnews::config::{sources, AppConfig};
use gearnews::ingest::fetcher::HttpFeedFetcher;
use gearnews::metrics::Metrics;
use gearnews::store::SqliteStore;
use gearnews::{api, logging, AppState};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    if logging::dev_logging_requested() {
        logging::init_tracing();
    }

    let cfg = AppConfig::from_env();
    if cfg.import_key.is_none() {
        tracing::warn!("IMPORT_KEY is not set; /api/import will answer 500");
    }

    let store = SqliteStore::connect(&cfg.database_url)
        .await
        .context("opening database")?;

    let seed = cfg.load_sources(Path::new(".")).context("loading sources config")?;
    sources::seed_sources(&store, &seed).await?;

    let fetcher = HttpFeedFetcher::new().context("building http client")?;
    let metrics = Metrics::init()?;

    let state = AppState {
        store: Arc::new(store),
        fetcher: Arc::new(fetcher),
        import_key: cfg.import_key,
    };
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
