//! Static API key check.
//!
//! Every license route requires the `X-API-Key` header to equal the
//! configured key. With no key configured the check is skipped.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tracing::warn;

/// Header carrying the client's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware rejecting requests without the configured API key.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.api_key.as_deref() {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        if provided != Some(expected) {
            warn!(
                "Rejected {} {}: {}",
                request.method(),
                request.uri().path(),
                if provided.is_some() { "wrong API key" } else { "no API key" }
            );
            return Err(ApiError::Unauthorized);
        }
    }

    Ok(next.run(request).await)
}
