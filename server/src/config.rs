//! Process configuration.
//!
//! Every setting comes from the environment (or the matching CLI flag) and
//! is read once at startup into an immutable [`Settings`].

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use licsrv_store::sheets::DEFAULT_WORKSHEET;
use licsrv_store::{
    CredentialSource, LocalClock, SheetsConfig, DEFAULT_ACTIVATION_DAYS, DEFAULT_TZ_OFFSET_HOURS,
};
use licsrv_token::{IssuerConfig, SigningKeySource, DEFAULT_TOKEN_TTL_DAYS};

/// Upper bound for `TOKEN_TTL_DAYS` and `ACTIVATION_DAYS` (100 years).
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Which record store backs the server.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Google Sheets worksheet.
    Sheets,
    /// Process memory; records are lost on exit.
    Memory,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "licsrv-server")]
#[command(about = "License activation server for Drive Uploader Pro", version)]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP port
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Spreadsheet identifier
    #[arg(long, env = "SHEET_ID", default_value = "")]
    pub sheet_id: String,

    /// Worksheet holding the license rows
    #[arg(long, env = "SHEET_NAME", default_value = DEFAULT_WORKSHEET)]
    pub sheet_name: String,

    /// Static API key required on license routes (empty disables the check)
    #[arg(long, env = "LICENSE_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Local timezone offset in hours, used for generated timestamps
    #[arg(
        long,
        env = "TZ_OFFSET_HOURS",
        default_value_t = DEFAULT_TZ_OFFSET_HOURS,
        allow_negative_numbers = true
    )]
    pub tz_offset_hours: i32,

    /// Inline RSA private key (PEM) for signing offline tokens
    #[arg(long, env = "PRIVATE_KEY_PEM", default_value = "", hide_env_values = true)]
    pub private_key_pem: String,

    /// Path to the RSA private key (PEM) for signing offline tokens
    #[arg(long, env = "PRIVATE_KEY_FILE", default_value = "")]
    pub private_key_file: String,

    /// Audience claim for offline tokens (empty omits it)
    #[arg(long, env = "LICENSE_AUD", default_value = "")]
    pub audience: String,

    /// Maximum offline token lifetime in days
    #[arg(long, env = "TOKEN_TTL_DAYS", default_value_t = DEFAULT_TOKEN_TTL_DAYS)]
    pub token_ttl_days: i64,

    /// License window given to newly activated machines, in days
    #[arg(long, env = "ACTIVATION_DAYS", default_value_t = DEFAULT_ACTIVATION_DAYS)]
    pub activation_days: i64,

    /// Inline service-account JSON for the Sheets API
    #[arg(long, env = "SA_JSON", default_value = "", hide_env_values = true)]
    pub sa_json: String,

    /// Path to a service-account JSON file for the Sheets API
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS", default_value = "")]
    pub credentials_file: String,

    /// Record store backend
    #[arg(long, env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Sheets)]
    pub store: StoreBackend,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Store selection with its backend configuration.
#[derive(Debug, Clone)]
pub enum StoreSettings {
    Sheets(SheetsConfig),
    Memory,
}

/// Immutable server configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `host:port` to bind.
    pub listen_addr: String,
    /// Required API key, `None` when authentication is disabled.
    pub api_key: Option<String>,
    /// Clock for generated timestamps.
    pub clock: LocalClock,
    /// License window for new records, in days.
    pub activation_days: i64,
    /// Record store.
    pub store: StoreSettings,
    /// Offline token issuer.
    pub issuer: IssuerConfig,
    /// Debug logging requested.
    pub verbose: bool,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Settings {
    /// Validates raw arguments and builds the settings.
    pub fn from_args(args: Args) -> Result<Self> {
        let clock = LocalClock::from_offset_hours(args.tz_offset_hours)
            .context("invalid TZ_OFFSET_HOURS")?;
        ensure!(
            (1..=MAX_WINDOW_DAYS).contains(&args.token_ttl_days),
            "TOKEN_TTL_DAYS must be between 1 and {MAX_WINDOW_DAYS}, got {}",
            args.token_ttl_days
        );
        ensure!(
            (1..=MAX_WINDOW_DAYS).contains(&args.activation_days),
            "ACTIVATION_DAYS must be between 1 and {MAX_WINDOW_DAYS}, got {}",
            args.activation_days
        );

        let store = match args.store {
            StoreBackend::Memory => StoreSettings::Memory,
            StoreBackend::Sheets => StoreSettings::Sheets(SheetsConfig {
                spreadsheet_id: args.sheet_id.trim().to_string(),
                worksheet: non_empty(&args.sheet_name)
                    .unwrap_or_else(|| DEFAULT_WORKSHEET.to_string()),
                credentials: CredentialSource::from_settings(
                    &args.sa_json,
                    &args.credentials_file,
                ),
                ..Default::default()
            }),
        };

        Ok(Self {
            listen_addr: format!("{}:{}", args.host.trim(), args.port),
            api_key: non_empty(&args.api_key),
            clock,
            activation_days: args.activation_days,
            store,
            issuer: IssuerConfig {
                ttl_days: args.token_ttl_days,
                audience: non_empty(&args.audience),
                signing_key: SigningKeySource::from_settings(
                    &args.private_key_pem,
                    &args.private_key_file,
                ),
            },
            verbose: args.verbose,
        })
    }
}
