//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use vitrine::Error;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Directory(#[from] Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "validation",
            Self::Directory(e) if e.is_not_found() => "not_found",
            Self::Directory(e) => e.category(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Directory(e) => match e {
                Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                e if e.is_not_found() => StatusCode::NOT_FOUND,
                Error::RateLimited { .. } | Error::Unavailable { .. } => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                Error::Protocol(p) if p.is_rate_limited() => StatusCode::SERVICE_UNAVAILABLE,
                Error::Corrupted { .. } | Error::Protocol(_) | Error::Transport(_) => {
                    StatusCode::BAD_GATEWAY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            ok: false,
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
