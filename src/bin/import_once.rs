//! Run one import against DATABASE_URL and print the run summary as JSON.
//! Skips the HTTP credential gate; whoever can run this already has the database.

use std::path::Path;

use anyhow::Context;

use gearnews::config::{sources, AppConfig};
use gearnews::ingest::{fetcher::HttpFeedFetcher, import_enabled_sources};
use gearnews::logging;
use gearnews::store::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    logging::init_tracing();

    let cfg = AppConfig::from_env();
    let store = SqliteStore::connect(&cfg.database_url)
        .await
        .context("opening database")?;

    let seed = cfg.load_sources(Path::new(".")).context("loading sources config")?;
    sources::seed_sources(&store, &seed).await?;

    let fetcher = HttpFeedFetcher::new().context("building http client")?;
    let summary = import_enabled_sources(&store, &fetcher).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
