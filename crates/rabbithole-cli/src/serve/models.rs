//! API response models.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use rabbithole_core::query::ErrorBody;
use rabbithole_core::QueryError;

/// Body of `/api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Failure of a search request, rendered as `{error, details}`.
#[derive(Debug)]
pub struct ApiError(pub QueryError);

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self.0 {
            QueryError::EmptyQuery => (StatusCode::BAD_REQUEST, "Invalid search request"),
            QueryError::Search(_) | QueryError::Model(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process search request",
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "search request failed");
        }

        let body = ErrorBody {
            error: error.to_string(),
            details: Some(self.0.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
