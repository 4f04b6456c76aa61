//! # mvindex Codec
//!
//! Typed values and key encoding for mvindex.
//!
//! This crate provides:
//! - [`Value`], the column value type, with a total order where NULL sorts
//!   lowest
//! - an order-preserving, prefix-free byte encoding of composite index keys
//!   ([`KeyEncoder`], [`KeyDecoder`]) honouring per-column sort direction
//! - CBOR encoding of full rows for primary storage
//!
//! ## Usage
//!
//! ```
//! use mvindex_codec::{KeyDecoder, KeyEncoder, SortDirection, Value};
//!
//! let mut encoder = KeyEncoder::new();
//! encoder.push_value(&Value::Integer(30), SortDirection::Ascending).unwrap();
//! encoder.push_row_id(1);
//! let key = encoder.finish();
//!
//! let mut decoder = KeyDecoder::new(&key);
//! assert_eq!(decoder.read_value(SortDirection::Ascending).unwrap(), Value::Integer(30));
//! assert_eq!(decoder.read_row_id().unwrap(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod key;
mod row;
mod value;

pub use error::{CodecError, CodecResult};
pub use key::{decode_row_id, encode_row_id, KeyDecoder, KeyEncoder, SortDirection, ROW_ID_LEN};
pub use row::{decode_row, encode_row};
pub use value::{ColumnType, Value};
