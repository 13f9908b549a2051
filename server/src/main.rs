//! Drive Uploader Pro license server
//!
//! Tracks one license record per machine in a Google Sheets worksheet and
//! issues signed offline tokens for the desktop client.
//!
//! Usage:
//!   licsrv-server --port 8000
//!
//! All options can also be set through environment variables; see `--help`.

use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use licsrv_server::{build_router, AppState, Args, Settings, StoreSettings};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("License server starting...");
    let settings = Settings::from_args(args).context("invalid configuration")?;

    if settings.api_key.is_none() {
        warn!("LICENSE_API_KEY is empty; license routes accept unauthenticated requests");
    }
    if !settings.issuer.signing_key.is_configured() {
        warn!("No signing key configured; issue-token will fail");
    }
    let backend = match &settings.store {
        StoreSettings::Sheets(config) => {
            if config.spreadsheet_id.is_empty() {
                warn!("SHEET_ID is empty; license requests will fail");
            }
            format!("sheets ({})", config.worksheet)
        }
        StoreSettings::Memory => {
            warn!("Using the in-memory store; records are lost on exit");
            "memory".to_string()
        }
    };

    let state = Arc::new(AppState::from_settings(&settings).context("failed to initialize state")?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.listen_addr))?;

    println!("\n========================================");
    println!("  License Server Running");
    println!("========================================");
    println!("  Listening: http://{}", settings.listen_addr);
    println!("  Store:     {}", backend);
    println!("  TZ offset: {}", settings.clock.offset());
    println!("  Auth:      {}", if settings.api_key.is_some() { "API key" } else { "disabled" });
    println!("========================================\n");

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
