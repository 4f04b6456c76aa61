//! Error types for mvindex core.

use crate::types::RowId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in mvindex core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] mvindex_storage::StorageError),

    /// Key or row codec error.
    #[error("codec error: {0}")]
    Codec(#[from] mvindex_codec::CodecError),

    /// An index column has a type that cannot be indexed.
    #[error("feature not supported: index {index} on large-object column {column}")]
    UnsupportedColumnType {
        /// Index being created.
        index: String,
        /// SQL-ish description of the offending column.
        column: String,
    },

    /// A unique index already holds an equal key.
    #[error("duplicate key in unique index {index}: {key} (conflicts with row {conflicting_row})")]
    DuplicateKey {
        /// Index that rejected the row.
        index: String,
        /// Rendered index-column values of the rejected row.
        key: String,
        /// Row already holding the key.
        conflicting_row: RowId,
    },

    /// Index entry to delete does not exist.
    #[error("row not found when deleting from index {index}: {row_id}")]
    RowNotFoundOnDelete {
        /// Index being modified.
        index: String,
        /// Row whose entry was missing.
        row_id: RowId,
    },

    /// Row does not exist in its table.
    #[error("row {row_id} not found in table {table}")]
    RowNotFound {
        /// Table searched.
        table: String,
        /// Missing row.
        row_id: RowId,
    },

    /// Column name does not exist in the table.
    #[error("column not found: {name}")]
    ColumnNotFound {
        /// Name of the column.
        name: String,
    },

    /// Index name does not exist on the table.
    #[error("index not found: {name}")]
    IndexNotFound {
        /// Name of the index.
        name: String,
    },

    /// Index name is already used on the table.
    #[error("index already exists: {name}")]
    IndexExists {
        /// Name of the index.
        name: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an unsupported column type error.
    pub fn unsupported_column_type(index: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnsupportedColumnType {
            index: index.into(),
            column: column.into(),
        }
    }

    /// Creates a duplicate key error.
    pub fn duplicate_key(
        index: impl Into<String>,
        key: impl Into<String>,
        conflicting_row: RowId,
    ) -> Self {
        Self::DuplicateKey {
            index: index.into(),
            key: key.into(),
            conflicting_row,
        }
    }

    /// Creates a row-not-found-on-delete error.
    pub fn row_not_found_on_delete(index: impl Into<String>, row_id: RowId) -> Self {
        Self::RowNotFoundOnDelete {
            index: index.into(),
            row_id,
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true for [`CoreError::DuplicateKey`].
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}
