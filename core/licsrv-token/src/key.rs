//! Signing key material.
//!
//! The RSA private key is read on every issue so a rotated key file takes
//! effect without a restart. An inline PEM always wins over a file path.

use crate::error::{TokenError, TokenResult};
use jsonwebtoken::EncodingKey;
use std::path::PathBuf;

/// Where the token signing key comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningKeySource {
    inline_pem: Option<String>,
    file: Option<PathBuf>,
}

impl SigningKeySource {
    /// Builds a source from the inline PEM and file path settings. Blank
    /// values count as unset.
    #[must_use]
    pub fn from_settings(inline_pem: &str, file_path: &str) -> Self {
        let inline_pem = inline_pem.trim();
        let file_path = file_path.trim();
        Self {
            inline_pem: (!inline_pem.is_empty()).then(|| inline_pem.to_string()),
            file: (!file_path.is_empty()).then(|| PathBuf::from(file_path)),
        }
    }

    /// A source holding an inline PEM.
    #[must_use]
    pub fn inline(pem: impl Into<String>) -> Self {
        Self {
            inline_pem: Some(pem.into()),
            file: None,
        }
    }

    /// A source reading a PEM file.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            inline_pem: None,
            file: Some(path.into()),
        }
    }

    /// Returns true if some key material is configured. A configured file
    /// may still turn out to be missing when loaded.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inline_pem.is_some() || self.file.is_some()
    }

    /// Returns the PEM text.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingKey`] if nothing is configured or the
    /// configured file does not exist.
    pub fn load_pem(&self) -> TokenResult<String> {
        if let Some(pem) = &self.inline_pem {
            return Ok(pem.clone());
        }
        match &self.file {
            Some(path) if path.exists() => Ok(std::fs::read_to_string(path)?),
            _ => Err(TokenError::MissingKey),
        }
    }

    /// Loads and parses the RSA private key.
    pub fn encoding_key(&self) -> TokenResult<EncodingKey> {
        let pem = self.load_pem()?;
        EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| TokenError::InvalidKey(e.to_string()))
    }
}
