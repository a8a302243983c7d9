// src/error.rs
//! Error taxonomy for the import and digest pipelines.
//!
//! `FetchError` stays inside one source's import step, `StoreError` is fatal for
//! whatever operation raised it, and `ImportError` gates the whole run.

use std::time::Duration;

use thiserror::Error;

/// Feed retrieval or parsing failure for a single source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to parse feed: {0}")]
    Parse(String),
}

/// Persistence read/write failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("tags encoding: {0}")]
    Tags(#[from] serde_json::Error),
}

/// Anything that stops one source's fetch → normalize → write step.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestration-level failures that abort an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Missing {0}")]
    Configuration(&'static str),

    #[error("Forbidden")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),
}
