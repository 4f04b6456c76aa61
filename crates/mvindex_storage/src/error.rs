//! Error types for storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The map has been removed from its store.
    #[error("map is closed: {name}")]
    Closed {
        /// Name the map had when it was removed.
        name: String,
    },

    /// A rename target is already taken.
    #[error("map already exists: {name}")]
    MapExists {
        /// The conflicting name.
        name: String,
    },
}
