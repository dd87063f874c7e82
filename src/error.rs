//! Error types for API responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// API error type
///
/// The load endpoint's contract is a bare 400 with an empty body for any
/// internal failure, so a single variant carries the underlying error for
/// logging only.
#[derive(Debug)]
pub enum ApiError {
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "Request failed");
                StatusCode::BAD_REQUEST.into_response()
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}
