//! Offline token claims and expiry clamping.

use crate::error::{TokenError, TokenResult};
use chrono::{DateTime, Duration, Utc};
use licsrv_store::parse_iso_utc;
use serde::{Deserialize, Serialize};

/// Claims carried by an offline license token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineClaims {
    /// Machine the token was issued to.
    pub machine_key: String,
    /// Run count at issue time.
    pub rc: u64,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Not-before (seconds since epoch), equal to `iat`.
    pub nbf: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Audience, present only when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Computes when a token issued at `now` expires.
///
/// The result is the earlier of the license's stored expiry and
/// `now + ttl_days`. A blank or unparseable stored expiry counts as
/// `now + ttl_days`.
///
/// # Errors
///
/// Returns [`TokenError::Lifetime`] if `now + ttl_days` is not a
/// representable date.
pub fn clamp_expiry(
    stored_expiry: &str,
    now: DateTime<Utc>,
    ttl_days: i64,
) -> TokenResult<DateTime<Utc>> {
    let ttl_expiry = Duration::try_days(ttl_days)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or(TokenError::Lifetime(ttl_days))?;
    Ok(parse_iso_utc(stored_expiry)
        .map_or(ttl_expiry, |license_expiry| license_expiry.min(ttl_expiry)))
}
