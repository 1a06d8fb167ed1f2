//! HTTP API for the bookmark organizer front-end
//!
//! Endpoints:
//! - POST /categorize - Categorize a bookmark snapshot `{bookmarks, metadataByUrl}`
//! - GET /taxonomy - Active taxonomy table
//! - GET /health - Liveness and version

use crate::models::{CategorizeRequest, CategorizeResponse};
use crate::pipeline;
use crate::taxonomy::Taxonomy;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::error;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// AppState
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub taxonomy: Arc<Taxonomy>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy: Arc::new(taxonomy),
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// Error type
// ============================================================================

pub struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({"error": self.1}))).into_response()
    }
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError(StatusCode::INTERNAL_SERVER_ERROR, s)
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    version: String,
    taxonomy_categories: usize,
    uptime_secs: u64,
}

// POST /categorize
async fn categorize_handler(
    State(state): State<AppState>,
    Json(req): Json<CategorizeRequest>,
) -> Result<Json<CategorizeResponse>, AppError> {
    let taxonomy = state.taxonomy.clone();
    // CPU-bound; keep it off the async workers
    let response = tokio::task::spawn_blocking(move || pipeline::categorize(&taxonomy, &req))
        .await
        .map_err(|e| {
            error!("[Server] categorize task failed: {}", e);
            AppError::from(format!("categorization failed: {}", e))
        })?;
    Ok(Json(response))
}

// GET /taxonomy
async fn taxonomy_handler(State(state): State<AppState>) -> Json<Taxonomy> {
    Json(state.taxonomy.as_ref().clone())
}

// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        taxonomy_categories: state.taxonomy.len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/categorize", post(categorize_handler))
        .route("/taxonomy", get(taxonomy_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
