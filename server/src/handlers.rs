//! Request handlers and wire types.

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::State;
use axum::Json;
use licsrv_store::{format_iso, Activation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Body of every license request.
///
/// `machine_key` is trimmed before use, and responses echo the trimmed key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LicenseRequest {
    pub machine_key: String,
}

/// License state returned by get-or-create and increment-run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LicenseResponse {
    pub machine_key: String,
    pub activated_at: String,
    pub expires_at: String,
    pub run_count: u64,
    pub created: bool,
}

impl From<Activation> for LicenseResponse {
    fn from(activation: Activation) -> Self {
        let record = activation.record;
        Self {
            machine_key: record.machine_key,
            activated_at: record.activated_at,
            expires_at: record.expires_at,
            run_count: record.run_count,
            created: activation.created,
        }
    }
}

/// Offline token returned by issue-token.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
}

/// Liveness probe body.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HealthResponse {
    pub ok: bool,
    pub now: String,
}

impl LicenseRequest {
    /// Returns the trimmed machine key, rejecting blank keys.
    fn machine_key(&self) -> ApiResult<&str> {
        let key = self.machine_key.trim();
        if key.is_empty() {
            return Err(ApiError::Validation("machine_key must not be empty".to_string()));
        }
        Ok(key)
    }
}

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        now: format_iso(&state.registry.clock().now()),
    })
}

pub(crate) async fn get_or_create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LicenseRequest>,
) -> ApiResult<Json<LicenseResponse>> {
    let machine_key = request.machine_key()?;
    debug!("get-or-create {}", machine_key);

    let activation = state.registry.get_or_create(machine_key).await?;
    Ok(Json(activation.into()))
}

pub(crate) async fn increment_run(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LicenseRequest>,
) -> ApiResult<Json<LicenseResponse>> {
    let machine_key = request.machine_key()?;
    debug!("increment-run {}", machine_key);

    let activation = state.registry.increment_run(machine_key).await?;
    Ok(Json(activation.into()))
}

pub(crate) async fn issue_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LicenseRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let machine_key = request.machine_key()?;

    let record = state.registry.get_or_create(machine_key).await?.record;
    let token = state
        .issuer
        .issue(machine_key, record.run_count, &record.expires_at)?;

    info!("Issued offline token for {}", machine_key);
    Ok(Json(TokenResponse { token }))
}
