// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod digest;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::error::{FetchError, ImportError, StoreError};
pub use crate::ingest::{run_import, RunSummary};
