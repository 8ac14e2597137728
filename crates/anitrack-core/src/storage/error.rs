//! Store error handling
//!
//! Typed errors for watchlist store operations with descriptive messages
//! and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during watchlist store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create the directory holding the database
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Collection path could not be built
    #[error("Invalid collection path: {0}")]
    InvalidPath(String),

    /// Stored document could not be decoded
    #[error("Document '{doc_id}' is malformed: {details}")]
    MalformedDocument { doc_id: String, details: String },

    /// The backing store cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Create an error from an I/O error with path context
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                path,
                source: error,
            },
            _ => StoreError::CreateDirectory {
                path,
                source: error,
            },
        }
    }

    /// Check if retrying the operation later can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_)
                | StoreError::PermissionDenied { .. }
                | StoreError::Database(_)
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Unavailable(_) => Some("Check that the store is reachable and try again."),
            StoreError::PermissionDenied { .. } => {
                Some("Check file and directory permissions for the data directory.")
            }
            StoreError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StoreError::MalformedDocument { .. } => {
                Some("Remove the broken entry from your watchlist and add it again.")
            }
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
