//! HTTP route handlers.
//!
//! Handlers stay thin; the pipeline lives in `QueryService`.

use std::sync::Arc;

use axum::{extract::State, Json};

use rabbithole_core::{QueryResponse, SearchRequest};

use super::models::{ApiError, HealthResponse};
use super::AppState;

/// POST `/api/rabbitholes/search` - Answer one query.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let response = state.service.handle(&request).await?;
    Ok(Json(response))
}

/// GET `/api/health` - Liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
