//! Error types for Wabex core functionality.

use thiserror::Error;

/// Main error type for Wabex.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Backup decryption error.
    #[error("Decryption error: {0}")]
    Decryption(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for Wabex operations.
pub type Result<T> = std::result::Result<T, Error>;
