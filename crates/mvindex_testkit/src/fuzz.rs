//! Fuzz testing harnesses for mvindex.
//!
//! This module provides fuzz targets that can be used with cargo-fuzz
//! or other fuzzing frameworks.

use crate::generators::TableOperation;
use crate::integration::IntegrationHarness;
use mvindex_codec::{decode_row, encode_row, KeyDecoder, SortDirection, Value};
use mvindex_core::{IndexColumn, KeyCodec};

/// Fuzz target for key component decoding.
///
/// Arbitrary bytes must either decode or return an error; never panic.
pub fn fuzz_key_decode(data: &[u8]) {
    for direction in [SortDirection::Ascending, SortDirection::Descending] {
        let mut decoder = KeyDecoder::new(data);
        while decoder.remaining() > 0 {
            if decoder.read_value(direction).is_err() {
                break;
            }
        }
    }
}

/// Fuzz target for composite key decoding through an index codec.
pub fn fuzz_composite_key_decode(data: &[u8]) {
    let columns: Vec<IndexColumn> = crate::fixtures::people_columns()
        .into_iter()
        .enumerate()
        .map(|(i, column)| {
            if i % 2 == 0 {
                IndexColumn::ascending(column)
            } else {
                IndexColumn::descending(column)
            }
        })
        .collect();
    let codec = KeyCodec::new(&columns, columns.len());
    if let Ok(row) = codec.decode(data) {
        // A key that decodes must describe without panicking.
        let _ = codec.describe(&row);
    }
    let _ = codec.leading_is_null(data);
}

/// Fuzz target for row payload roundtrip.
///
/// Payloads that decode must re-encode to something that decodes to the
/// same values.
pub fn fuzz_row_roundtrip(data: &[u8]) {
    if let Ok(values) = decode_row(data) {
        let encoded = encode_row(&values).expect("decoded row must re-encode");
        let decoded = decode_row(&encoded).expect("re-encoded row must decode");
        assert_eq!(values, decoded, "Roundtrip mismatch");
    }
}

/// Fuzz target for table operations.
///
/// Bytes are read as a sequence of inserts and deletes against an indexed
/// `people` table; indexes are verified against the model at the end.
pub fn fuzz_table_operations(data: &[u8]) {
    let mut harness = IntegrationHarness::new();
    for op in parse_operations(data) {
        harness.apply(&op);
    }
    harness.verify_all();
}

/// Reads operations from raw bytes, three bytes per operation.
///
/// The first byte picks insert or delete; inserts draw a small email and
/// age domain from the next two bytes so that collisions are frequent.
pub fn parse_operations(data: &[u8]) -> Vec<TableOperation> {
    data.chunks_exact(3)
        .map(|chunk| {
            let (op, a, b) = (chunk[0], chunk[1], chunk[2]);
            if op % 4 == 3 {
                TableOperation::Delete {
                    slot: usize::from(a),
                }
            } else {
                let email = match a % 8 {
                    0 => Value::Null,
                    n => Value::Text(format!("u{n}@x.com")),
                };
                let age = match b % 16 {
                    0 => Value::Null,
                    n => Value::Integer(i64::from(n) - 8),
                };
                TableOperation::Insert {
                    values: vec![Value::Text(format!("p{op}")), email, age],
                }
            }
        })
        .collect()
}
