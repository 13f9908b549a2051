//! Service-account authentication for Google APIs.
//!
//! Uses the OAuth2 JWT-bearer grant: a short-lived assertion is signed with
//! the service account's RSA key and exchanged for an access token at the
//! key's `token_uri`.

use crate::error::{StoreError, StoreResult};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// OAuth scope granting read/write access to spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Token endpoint used when a key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for signed assertions.
const ASSERTION_LIFETIME_SECS: i64 = 60 * 60;

/// Cached tokens are dropped this long before they expire.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Where service-account credentials come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CredentialSource {
    /// No credentials configured.
    #[default]
    Missing,
    /// Service-account JSON held in configuration.
    Inline(String),
    /// Path to a service-account JSON file.
    File(PathBuf),
}

impl CredentialSource {
    /// Picks a source from the inline JSON and file path settings. Inline
    /// JSON wins when both are set; blank values count as unset.
    #[must_use]
    pub fn from_settings(inline_json: &str, file_path: &str) -> Self {
        let inline_json = inline_json.trim();
        let file_path = file_path.trim();
        if !inline_json.is_empty() {
            Self::Inline(inline_json.to_string())
        } else if !file_path.is_empty() {
            Self::File(PathBuf::from(file_path))
        } else {
            Self::Missing
        }
    }

    /// Loads and parses the service-account key.
    pub fn load(&self) -> StoreResult<ServiceAccountKey> {
        let json = match self {
            Self::Missing => {
                return Err(StoreError::Config(
                    "service account credentials not provided; \
                     set SA_JSON or GOOGLE_APPLICATION_CREDENTIALS"
                        .to_string(),
                ));
            }
            Self::Inline(json) => json.clone(),
            Self::File(path) => std::fs::read_to_string(path).map_err(|e| {
                StoreError::Config(format!(
                    "failed to read service account file {}: {e}",
                    path.display()
                ))
            })?,
        };
        serde_json::from_str(&json)
            .map_err(|e| StoreError::Config(format!("invalid service account JSON: {e}")))
    }
}

/// The fields of a service-account key file this crate needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account identity, used as the assertion issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: SystemTime,
}

/// Issues and caches access tokens for a service account.
pub struct ServiceAccountAuth {
    source: CredentialSource,
    client: Client,
    token: RwLock<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Creates an authenticator. Credentials are not read until the first
    /// token is needed.
    #[must_use]
    pub fn new(source: CredentialSource, client: Client) -> Self {
        Self {
            source,
            client,
            token: RwLock::new(None),
        }
    }

    /// Returns a valid access token, exchanging a new assertion if the
    /// cached one is missing or about to expire.
    pub async fn access_token(&self) -> StoreResult<String> {
        if let Some(cached) = self.token.read().await.as_ref()
            && SystemTime::now() < cached.expires_at
        {
            return Ok(cached.access_token.clone());
        }

        self.exchange().await
    }

    async fn exchange(&self) -> StoreResult<String> {
        let key = self.source.load()?;
        let assertion = sign_assertion(&key)?;

        debug!("Requesting access token for {}", key.client_email);

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Network(format!("token exchange failed: {e}")))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("token exchange failed: {error}")));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Auth(format!("failed to parse token response: {e}")))?;

        let lifetime = token_response
            .expires_in
            .unwrap_or(ASSERTION_LIFETIME_SECS as u64)
            .saturating_sub(EXPIRY_MARGIN_SECS);
        let cached = CachedToken {
            access_token: token_response.access_token.clone(),
            expires_at: SystemTime::now() + Duration::from_secs(lifetime),
        };
        *self.token.write().await = Some(cached);
        info!("Obtained access token for {}", key.client_email);

        Ok(token_response.access_token)
    }
}

fn sign_assertion(key: &ServiceAccountKey) -> StoreResult<String> {
    let now = Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SHEETS_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| StoreError::Auth(format!("invalid service account key: {e}")))?;
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {e}")))
}
