//! Error types for persistence operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during persistence operations.
///
/// Callers treat every variant the same way: the operation did not happen.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to read a collection file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a collection file.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode or decode a document.
    #[error("failed to serialize: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to create the store directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection string could not be parsed.
    #[error("invalid store URI: {0}")]
    InvalidUri(String),

    /// Connection string names a backend we don't have.
    #[error("unsupported store scheme: {0}")]
    UnsupportedUri(String),

    /// The database server rejected or failed the operation.
    #[error("database error: {0}")]
    DatabaseError(String),

    /// Backend refused or lost the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
