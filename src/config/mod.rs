// src/config/mod.rs
pub mod sources;

use std::path::{Path, PathBuf};

use anyhow::{ensure, Result};

use crate::auth::ENV_IMPORT_KEY;
use crate::store::NewSource;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://gearnews.db";
pub const ENV_SOURCES_CONFIG_PATH: &str = "SOURCES_CONFIG_PATH";
/// Looked up under the project root, in order, when no explicit path is set.
pub const SOURCES_FALLBACKS: [&str; 2] = ["config/sources.toml", "config/sources.json"];

/// Runtime settings read from the environment (after `.env`, if present).
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Shared secret for the import trigger. `None` makes imports answer 500.
    pub import_key: Option<String>,
    pub database_url: String,
    /// Explicit seed file; wins over the `config/` fallbacks.
    pub sources_path: Option<PathBuf>,
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            import_key: non_blank_env(ENV_IMPORT_KEY),
            database_url: non_blank_env(ENV_DATABASE_URL)
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            sources_path: non_blank_env(ENV_SOURCES_CONFIG_PATH).map(PathBuf::from),
        }
    }

    /// Seed file to read, if any. A configured path that does not exist is an
    /// error rather than a silent fallback.
    pub fn sources_file(&self, root: &Path) -> Result<Option<PathBuf>> {
        if let Some(p) = &self.sources_path {
            ensure!(
                p.exists(),
                "{ENV_SOURCES_CONFIG_PATH} points to non-existent path {}",
                p.display()
            );
            return Ok(Some(p.clone()));
        }
        Ok(SOURCES_FALLBACKS
            .iter()
            .map(|rel| root.join(rel))
            .find(|p| p.exists()))
    }

    /// Source definitions to seed; empty when no file is configured or found.
    pub fn load_sources(&self, root: &Path) -> Result<Vec<NewSource>> {
        match self.sources_file(root)? {
            Some(path) => sources::read_sources(&path),
            None => {
                tracing::info!(target: "config", "no sources file found; stored sources kept as-is");
                Ok(Vec::new())
            }
        }
    }
}
