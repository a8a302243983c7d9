// src/logging.rs
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Event targets used across the crate.
pub const LOG_TARGETS: &[&str] = &["gearnews", "ingest", "store", "api", "digest", "config"];

pub const DEFAULT_LOG_FILTER: &str =
    "gearnews=info,ingest=info,store=info,api=info,digest=info,config=info,sqlx=warn,warn";

/// Install a compact stdout subscriber. `RUST_LOG` overrides the default filter.
/// A second call (or a subscriber installed by the runtime) is left alone.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

/// Dev logging gate for the hosted entrypoint: `GEARNEWS_DEV_LOG=1` in a dev build
/// or with SHUTTLE_ENV in {local, development, dev}.
pub fn dev_logging_requested() -> bool {
    let on = std::env::var("GEARNEWS_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        )
}
