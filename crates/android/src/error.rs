//! Error types for Android backup decryption.

use thiserror::Error;

/// Main error type for Android backup decryption.
#[derive(Error, Debug)]
pub enum AndroidError {
    /// I/O error (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The provided key material is malformed for its format
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The container is malformed for its claimed format
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    /// The key file and backup file do not belong together
    #[error("The signature of key file and backup file mismatch")]
    SignatureMismatch,

    /// Exhaustive offset search finished without a valid candidate
    #[error("Could not find the correct offsets for decryption")]
    OffsetNotFound,

    /// Brute force was interrupted before the search space was exhausted
    #[error("Offset search cancelled before completion")]
    Cancelled,

    /// A required capability is disabled or unavailable
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// An output path is required unless the run is a dry run
    #[error("The path to the decrypted database must be specified unless dry_run is set")]
    MissingOutputPath,

    /// Decryption with a deterministic layout produced no valid plaintext
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Other errors wrapped in anyhow
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result alias for Android backup operations.
pub type AndroidResult<T> = Result<T, AndroidError>;

impl From<AndroidError> for wabex_core::Error {
    fn from(err: AndroidError) -> Self {
        match err {
            AndroidError::Io(e) => wabex_core::Error::Io(e),
            AndroidError::Unsupported(msg) => wabex_core::Error::Unsupported(msg),
            AndroidError::MissingOutputPath => {
                wabex_core::Error::Validation(AndroidError::MissingOutputPath.to_string())
            }
            AndroidError::Internal(e) => wabex_core::Error::Internal(e.to_string()),
            other => wabex_core::Error::Decryption(other.to_string()),
        }
    }
}
