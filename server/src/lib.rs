//! HTTP API for the license server.
//!
//! Routes:
//! - `GET /health`: liveness probe, no authentication
//! - `POST /license/get-or-create`: fetch or create a machine's license
//! - `POST /license/increment-run`: record one run and return the license
//! - `POST /license/issue-token`: issue a signed offline token
//!
//! License routes require the `X-API-Key` header when a key is configured.

mod auth;
mod config;
mod error;
mod handlers;

use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use licsrv_store::{LicenseRegistry, MemoryStore, RecordStore, SheetsStore};
use licsrv_token::TokenIssuer;
use std::sync::Arc;

pub use auth::API_KEY_HEADER;
pub use config::{Args, Settings, StoreBackend, StoreSettings};
pub use error::{ApiError, ApiResult};
pub use handlers::{HealthResponse, LicenseRequest, LicenseResponse, TokenResponse};

/// Shared state handed to every request.
pub struct AppState {
    pub registry: LicenseRegistry,
    pub issuer: TokenIssuer,
    pub api_key: Option<String>,
}

impl AppState {
    /// Creates the state. A blank API key disables authentication.
    pub fn new(registry: LicenseRegistry, issuer: TokenIssuer, api_key: Option<String>) -> Self {
        Self {
            registry,
            issuer,
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    /// Builds the state, including the configured record store.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store: Arc<dyn RecordStore> = match &settings.store {
            StoreSettings::Memory => Arc::new(MemoryStore::new()),
            StoreSettings::Sheets(config) => Arc::new(SheetsStore::new(config.clone())?),
        };
        let registry = LicenseRegistry::new(store, settings.clock, settings.activation_days);
        let issuer = TokenIssuer::new(settings.issuer.clone());

        Ok(Self::new(registry, issuer, settings.api_key.clone()))
    }
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let licensed = Router::new()
        .route("/license/get-or-create", post(handlers::get_or_create))
        .route("/license/increment-run", post(handlers::increment_run))
        .route("/license/issue-token", post(handlers::issue_token))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(licensed)
        .with_state(state)
}
