//! Error types for offline token issuance.

use thiserror::Error;

/// Token-specific errors.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Neither an inline key nor a readable key file is configured.
    #[error("signing key not configured: set PRIVATE_KEY_PEM or PRIVATE_KEY_FILE")]
    MissingKey,

    /// The key file exists but could not be read.
    #[error("failed to read signing key file: {0}")]
    KeyFile(#[from] std::io::Error),

    /// The key material is not a usable RSA private key.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// The configured token lifetime overflows the calendar.
    #[error("token lifetime out of range: {0} days")]
    Lifetime(i64),

    /// Encoding or signing the token failed.
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;
