//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a value or row.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a value or row.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// Large objects have no key encoding.
    #[error("value of type {type_name} cannot be part of an index key")]
    NotIndexable {
        /// Name of the offending value type.
        type_name: &'static str,
    },

    /// Unknown type tag in an encoded key.
    #[error("unknown key tag 0x{tag:02x} at offset {offset}")]
    UnknownTag {
        /// The tag byte as read (after direction correction).
        tag: u8,
        /// Offset of the tag in the key.
        offset: usize,
    },

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Input left over after a complete key was read.
    #[error("{remaining} trailing bytes after key")]
    TrailingBytes {
        /// Number of unread bytes.
        remaining: usize,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }
}
