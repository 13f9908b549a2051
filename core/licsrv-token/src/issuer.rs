//! RS256 offline token issuer.

use crate::claims::{clamp_expiry, OfflineClaims};
use crate::error::{TokenError, TokenResult};
use crate::key::SigningKeySource;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, Header};
use tracing::debug;

/// Signature algorithm used for every offline token.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::RS256;

/// Default maximum token lifetime, in days.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 14;

/// Issuer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerConfig {
    /// Upper bound on token lifetime, in days.
    pub ttl_days: i64,
    /// `aud` claim; omitted from tokens when `None`.
    pub audience: Option<String>,
    /// Private key used for signing.
    pub signing_key: SigningKeySource,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            audience: None,
            signing_key: SigningKeySource::default(),
        }
    }
}

/// Builds and signs offline license tokens.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: IssuerConfig,
}

impl TokenIssuer {
    /// Creates an issuer.
    #[must_use]
    pub fn new(config: IssuerConfig) -> Self {
        Self { config }
    }

    /// Returns the issuer configuration.
    #[must_use]
    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// Builds the claims for a token issued at `now`.
    ///
    /// # Errors
    ///
    /// Fails if the configured lifetime overflows the calendar.
    pub fn claims_at(
        &self,
        machine_key: &str,
        run_count: u64,
        stored_expiry: &str,
        now: DateTime<Utc>,
    ) -> TokenResult<OfflineClaims> {
        let issued_at = now.timestamp();
        Ok(OfflineClaims {
            machine_key: machine_key.to_string(),
            rc: run_count,
            iat: issued_at,
            nbf: issued_at,
            exp: clamp_expiry(stored_expiry, now, self.config.ttl_days)?.timestamp(),
            aud: self.config.audience.clone(),
        })
    }

    /// Issues a signed token for a license record, valid from now until the
    /// earlier of its stored expiry and the configured TTL.
    ///
    /// # Errors
    ///
    /// Fails if no signing key is available, the key cannot sign, or the
    /// configured lifetime overflows the calendar.
    pub fn issue(
        &self,
        machine_key: &str,
        run_count: u64,
        stored_expiry: &str,
    ) -> TokenResult<String> {
        self.issue_at(machine_key, run_count, stored_expiry, Utc::now())
    }

    /// Issues a signed token as of `now`.
    pub fn issue_at(
        &self,
        machine_key: &str,
        run_count: u64,
        stored_expiry: &str,
        now: DateTime<Utc>,
    ) -> TokenResult<String> {
        let encoding_key = self.config.signing_key.encoding_key()?;
        let claims = self.claims_at(machine_key, run_count, stored_expiry, now)?;

        debug!(
            "Issuing token for {} (rc {}, exp {})",
            claims.machine_key, claims.rc, claims.exp
        );

        jsonwebtoken::encode(&Header::new(TOKEN_ALGORITHM), &claims, &encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
