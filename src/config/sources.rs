// src/config/sources.rs
//! Seed file for the `sources` table: TOML `[[sources]]` tables or a JSON array.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::store::{NewSource, Store};

#[derive(Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: Vec<NewSource>,
}

/// Read and clean one seed file. The extension picks the format; anything
/// else is sniffed (JSON first).
pub fn read_sources(path: &Path) -> Result<Vec<NewSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);

    let parsed = match ext.as_deref() {
        Some("toml") => from_toml(&content)?,
        Some("json") => from_json(&content)?,
        _ => sniff(&content)
            .ok_or_else(|| anyhow!("unsupported sources format in {}", path.display()))?,
    };
    Ok(clean_list(parsed))
}

/// Write every configured source into the store. Returns how many were applied.
pub async fn seed_sources(store: &dyn Store, sources: &[NewSource]) -> Result<usize> {
    for s in sources {
        store
            .upsert_source(s)
            .await
            .with_context(|| format!("seeding source {}", s.name))?;
    }
    tracing::info!(target: "config", count = sources.len(), "sources seeded");
    Ok(sources.len())
}

fn from_toml(s: &str) -> Result<Vec<NewSource>> {
    let file: SourcesFile = toml::from_str(s).context("parsing sources toml")?;
    Ok(file.sources)
}

fn from_json(s: &str) -> Result<Vec<NewSource>> {
    serde_json::from_str(s).context("parsing sources json")
}

fn sniff(s: &str) -> Option<Vec<NewSource>> {
    from_json(s).or_else(|_| from_toml(s)).ok()
}

/// Trim fields, drop blanks, keep the first definition per url.
fn clean_list(items: Vec<NewSource>) -> Vec<NewSource> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(|it| {
            let name = it.name.trim();
            let url = it.url.trim();
            if name.is_empty() || url.is_empty() || !seen.insert(url.to_string()) {
                return None;
            }
            Some(NewSource {
                name: name.to_string(),
                url: url.to_string(),
                enabled: it.enabled,
            })
        })
        .collect()
}
