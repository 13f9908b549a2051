//! Error types for the license record store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing license records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Required store configuration is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Backend credentials could not be loaded or exchanged.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Network error talking to the backend.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Row index outside the addressable range of the table.
    #[error("invalid row index: {0}")]
    InvalidRow(u32),
}
