//! Order-preserving key encoding.
//!
//! Composite index keys are stored in a bytewise-ordered map, so every
//! component is written in a form whose byte order equals the logical
//! order of [`Value`]:
//!
//! | Value     | Encoding                                              |
//! |-----------|-------------------------------------------------------|
//! | `Null`    | `0x00`                                                |
//! | `Bool`    | `0x01`, then `0x00` or `0x01`                         |
//! | `Integer` | `0x02`, then 8 bytes big-endian with the sign bit flipped |
//! | `Text`    | `0x03`, escaped UTF-8, terminator `0x00 0x00`         |
//! | `Bytes`   | `0x04`, escaped bytes, terminator `0x00 0x00`         |
//!
//! Escaping replaces each `0x00` with `0x00 0xFF`. Every component is
//! prefix-free, so inverting all bytes of a component reverses its order;
//! that is how descending columns are written. Row identifiers are plain
//! big-endian `u64` and are never inverted.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const TAG_NULL: u8 = 0x00;
const TAG_BOOL: u8 = 0x01;
const TAG_INTEGER: u8 = 0x02;
const TAG_TEXT: u8 = 0x03;
const TAG_BYTES: u8 = 0x04;

const ESCAPE: u8 = 0xFF;
const SIGN_BIT: u64 = 1 << 63;

/// Encoded length of a row identifier.
pub const ROW_ID_LEN: usize = 8;

/// Sort direction of an index column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first; NULL sorts first.
    #[default]
    Ascending,
    /// Largest first; NULL sorts last.
    Descending,
}

impl SortDirection {
    /// Returns true for [`SortDirection::Descending`].
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, SortDirection::Descending)
    }

    /// Applies this direction to an ascending comparison result.
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Builds an encoded composite key one component at a time.
#[derive(Debug, Default)]
pub struct KeyEncoder {
    buf: BytesMut,
}

impl KeyEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Appends one column value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::NotIndexable`] for large-object values.
    pub fn push_value(&mut self, value: &Value, direction: SortDirection) -> CodecResult<()> {
        let start = self.buf.len();
        match value {
            Value::Null => self.buf.put_u8(TAG_NULL),
            Value::Bool(b) => {
                self.buf.put_u8(TAG_BOOL);
                self.buf.put_u8(u8::from(*b));
            }
            Value::Integer(n) => {
                self.buf.put_u8(TAG_INTEGER);
                self.buf.put_u64(*n as u64 ^ SIGN_BIT);
            }
            Value::Text(s) => {
                self.buf.put_u8(TAG_TEXT);
                self.put_escaped(s.as_bytes());
            }
            Value::Bytes(b) => {
                self.buf.put_u8(TAG_BYTES);
                self.put_escaped(b);
            }
            Value::Clob(_) | Value::Blob(_) => {
                return Err(CodecError::NotIndexable {
                    type_name: value.type_name(),
                });
            }
        }
        if direction.is_descending() {
            for byte in self.buf[start..].iter_mut() {
                *byte = !*byte;
            }
        }
        Ok(())
    }

    /// Appends the trailing row identifier.
    pub fn push_row_id(&mut self, row_id: u64) {
        self.buf.put_u64(row_id);
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume this encoder and return the encoded key.
    pub fn finish(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    fn put_escaped(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.buf.put_u8(b);
            if b == 0 {
                self.buf.put_u8(ESCAPE);
            }
        }
        self.buf.put_u8(0);
        self.buf.put_u8(0);
    }
}

/// Encodes a bare row identifier, as used for primary row storage keys.
pub fn encode_row_id(row_id: u64) -> Vec<u8> {
    row_id.to_be_bytes().to_vec()
}

/// Decodes a bare row identifier written by [`encode_row_id`].
///
/// # Errors
///
/// Fails if `bytes` is not exactly [`ROW_ID_LEN`] long.
pub fn decode_row_id(bytes: &[u8]) -> CodecResult<u64> {
    let mut decoder = KeyDecoder::new(bytes);
    let row_id = decoder.read_row_id()?;
    decoder.finish()?;
    Ok(row_id)
}

/// Reads the components of an encoded key back, in order.
#[derive(Debug)]
pub struct KeyDecoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> KeyDecoder<'a> {
    /// Create a decoder over an encoded key.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Reads one column value written with the given direction.
    ///
    /// # Errors
    ///
    /// Fails on truncated input, unknown tags or malformed payloads.
    pub fn read_value(&mut self, direction: SortDirection) -> CodecResult<Value> {
        let invert = direction.is_descending();
        let offset = self.pos;
        let tag = self.next_byte(invert)?;
        match tag {
            TAG_NULL => Ok(Value::Null),
            TAG_BOOL => match self.next_byte(invert)? {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                other => Err(CodecError::decoding_failed(format!(
                    "invalid boolean byte 0x{other:02x}"
                ))),
            },
            TAG_INTEGER => {
                let raw = self.read_u64(invert)?;
                Ok(Value::Integer((raw ^ SIGN_BIT) as i64))
            }
            TAG_TEXT => {
                let bytes = self.read_escaped(invert)?;
                String::from_utf8(bytes)
                    .map(Value::Text)
                    .map_err(|_| CodecError::InvalidUtf8)
            }
            TAG_BYTES => Ok(Value::Bytes(self.read_escaped(invert)?)),
            tag => Err(CodecError::UnknownTag { tag, offset }),
        }
    }

    /// Reads the trailing row identifier.
    ///
    /// # Errors
    ///
    /// Fails if fewer than [`ROW_ID_LEN`] bytes remain.
    pub fn read_row_id(&mut self) -> CodecResult<u64> {
        self.read_u64(false)
    }

    /// Checks that the whole key has been consumed.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TrailingBytes`] if input is left over.
    pub fn finish(self) -> CodecResult<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(CodecError::TrailingBytes { remaining }),
        }
    }

    fn next_byte(&mut self, invert: bool) -> CodecResult<u8> {
        let byte = *self.input.get(self.pos).ok_or(CodecError::UnexpectedEof)?;
        self.pos += 1;
        Ok(if invert { !byte } else { byte })
    }

    fn read_u64(&mut self, invert: bool) -> CodecResult<u64> {
        let mut raw = [0u8; ROW_ID_LEN];
        for slot in &mut raw {
            *slot = self.next_byte(invert)?;
        }
        Ok(u64::from_be_bytes(raw))
    }

    fn read_escaped(&mut self, invert: bool) -> CodecResult<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let byte = self.next_byte(invert)?;
            if byte != 0 {
                out.push(byte);
                continue;
            }
            match self.next_byte(invert)? {
                ESCAPE => out.push(0),
                0 => return Ok(out),
                other => {
                    return Err(CodecError::decoding_failed(format!(
                        "invalid escape byte 0x{other:02x}"
                    )))
                }
            }
        }
    }
}
