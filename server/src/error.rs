//! API error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use licsrv_store::StoreError;
use licsrv_token::TokenError;
use thiserror::Error;
use tracing::error;

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to API callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or mismatched API key.
    #[error("Invalid or missing API key")]
    Unauthorized,

    /// The request body is well-formed JSON but not acceptable.
    #[error("{0}")]
    Validation(String),

    /// Reading or writing the license store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The offline token could not be issued.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) | ApiError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Backend failures are not echoed.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Store(StoreError::Config(_)) => self.to_string(),
            ApiError::Store(_) => "license store unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = serde_json::json!({ "detail": self.detail() });
        (status, Json(body)).into_response()
    }
}
