// src/api.rs
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::digest::{self, Digest, DigestQuery};
use crate::error::{ImportError, StoreError};
use crate::ingest::{self, types::FeedFetcher, RunSummary};
use crate::store::{Item, Source, Store};

pub const DEFAULT_HEADLINES_LIMIT: usize = 60;
pub const MAX_HEADLINES_LIMIT: usize = 500;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub fetcher: Arc<dyn FeedFetcher>,
    pub import_key: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/import", get(import))
        .route("/api/weekly", get(weekly))
        .route("/api/weekly/text", get(weekly_text))
        .route("/api/headlines", get(headlines))
        .route("/api/sources", get(sources))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// HTTP mapping of pipeline errors.
#[derive(Debug)]
pub enum ApiError {
    Import(ImportError),
    Store(StoreError),
}

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        ApiError::Import(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
}

fn store_failure(e: &StoreError) -> Response {
    tracing::error!(target: "api", error = %e, "store failure");
    let body = ErrorBody {
        ok: false,
        error: e.to_string(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Import(ImportError::Configuration(_)) => {
                tracing::error!(target: "api", "import key is not configured");
                (StatusCode::INTERNAL_SERVER_ERROR, self.message()).into_response()
            }
            ApiError::Import(ImportError::Unauthorized) => {
                tracing::warn!(target: "api", "import rejected: bad key");
                (StatusCode::FORBIDDEN, self.message()).into_response()
            }
            ApiError::Import(ImportError::Store(e)) | ApiError::Store(e) => store_failure(e),
        }
    }
}

impl ApiError {
    fn message(&self) -> String {
        match self {
            ApiError::Import(e) => e.to_string(),
            ApiError::Store(e) => e.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ImportParams {
    key: Option<String>,
}

async fn import(
    State(state): State<AppState>,
    Query(q): Query<ImportParams>,
) -> Result<Json<RunSummary>, ApiError> {
    let summary = ingest::run_import(
        state.import_key.as_deref(),
        q.key.as_deref(),
        state.store.as_ref(),
        state.fetcher.as_ref(),
    )
    .await?;
    Ok(Json(summary))
}

#[derive(Deserialize)]
struct DigestParams {
    days: Option<i64>,
    limit: Option<i64>,
}

#[derive(Serialize)]
struct DigestOut {
    ok: bool,
    #[serde(flatten)]
    digest: Digest,
}

async fn load_digest(state: &AppState, q: DigestParams) -> Result<Digest, ApiError> {
    let query = DigestQuery::new(q.days, q.limit);
    Ok(digest::build_digest(state.store.as_ref(), query, chrono::Utc::now()).await?)
}

async fn weekly(
    State(state): State<AppState>,
    Query(q): Query<DigestParams>,
) -> Result<Json<DigestOut>, ApiError> {
    let digest = load_digest(&state, q).await?;
    Ok(Json(DigestOut { ok: true, digest }))
}

async fn weekly_text(
    State(state): State<AppState>,
    Query(q): Query<DigestParams>,
) -> Result<Response, ApiError> {
    let digest = load_digest(&state, q).await?;
    let text = digest::render_text(&digest);
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
}

#[derive(Deserialize)]
struct HeadlineParams {
    source: Option<i64>,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct HeadlinesOut {
    ok: bool,
    items: Vec<Item>,
}

async fn headlines(
    State(state): State<AppState>,
    Query(q): Query<HeadlineParams>,
) -> Result<Json<HeadlinesOut>, ApiError> {
    let limit = q
        .limit
        .unwrap_or(DEFAULT_HEADLINES_LIMIT)
        .clamp(1, MAX_HEADLINES_LIMIT);
    let items = state.store.recent_items(limit, q.source).await?;
    Ok(Json(HeadlinesOut { ok: true, items }))
}

#[derive(Serialize)]
struct SourcesOut {
    ok: bool,
    sources: Vec<Source>,
}

async fn sources(State(state): State<AppState>) -> Result<Json<SourcesOut>, ApiError> {
    let sources = state.store.list_sources().await?;
    Ok(Json(SourcesOut { ok: true, sources }))
}
