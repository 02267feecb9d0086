//! Storage error types.

use thiserror::Error;

/// Errors that can occur when reading or writing stored documents.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Storage directory could not be created or opened.
    #[error("Cannot open storage directory: {0}")]
    OpenError(String),

    /// Document is not valid JSON for the requested type.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be used by this backend.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}
