//! Key encoding test vectors.
//!
//! Index keys live in a bytewise-ordered store, so their exact bytes are a
//! storage format. These vectors pin that format down and can be exported
//! as JSON for other implementations of the same store.

use mvindex_codec::{encode_row_id, KeyEncoder, SortDirection, Value};
use serde::{Deserialize, Serialize};

/// One encoded key component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Value to encode.
    pub value: Value,
    /// Column direction.
    pub direction: SortDirection,
    /// Expected encoding (hex-encoded).
    pub expected_hex: String,
}

fn vector(id: &str, description: &str, value: Value, direction: SortDirection, hex: &str) -> KeyVector {
    KeyVector {
        id: id.into(),
        description: description.into(),
        value,
        direction,
        expected_hex: hex.into(),
    }
}

/// Ascending and descending component encodings.
pub fn key_encoding_vectors() -> Vec<KeyVector> {
    use SortDirection::{Ascending, Descending};
    vec![
        vector("null", "NULL", Value::Null, Ascending, "00"),
        vector("null_desc", "NULL, descending", Value::Null, Descending, "ff"),
        vector("false", "boolean false", Value::Bool(false), Ascending, "0100"),
        vector("true", "boolean true", Value::Bool(true), Ascending, "0101"),
        vector("true_desc", "boolean true, descending", Value::Bool(true), Descending, "fefe"),
        vector("int_0", "integer 0", Value::Integer(0), Ascending, "028000000000000000"),
        vector("int_1", "integer 1", Value::Integer(1), Ascending, "028000000000000001"),
        vector("int_neg1", "integer -1", Value::Integer(-1), Ascending, "027fffffffffffffff"),
        vector("int_min", "smallest integer", Value::Integer(i64::MIN), Ascending, "020000000000000000"),
        vector("int_1_desc", "integer 1, descending", Value::Integer(1), Descending, "fd7ffffffffffffffe"),
        vector("text_empty", "empty text", Value::Text(String::new()), Ascending, "030000"),
        vector("text_ab", "text 'ab'", Value::Text("ab".into()), Ascending, "0361620000"),
        vector("text_nul", "text with embedded NUL", Value::Text("a\0b".into()), Ascending, "036100ff620000"),
        vector("text_a_desc", "text 'a', descending", Value::Text("a".into()), Descending, "fc9effff"),
        vector("bytes_nul", "bytes 00 01", Value::Bytes(vec![0, 1]), Ascending, "0400ff010000"),
    ]
}

/// Row identifier encodings, as `(row id, hex)`.
pub fn row_id_vectors() -> Vec<(u64, &'static str)> {
    vec![
        (0, "0000000000000000"),
        (1, "0000000000000001"),
        (256, "0000000000000100"),
        (u64::MAX, "ffffffffffffffff"),
    ]
}

/// Encodes a vector's value and compares it with the expected bytes.
///
/// # Errors
///
/// Returns a description of the mismatch.
pub fn check_key_vector(vector: &KeyVector) -> Result<(), String> {
    let mut encoder = KeyEncoder::new();
    encoder
        .push_value(&vector.value, vector.direction)
        .map_err(|e| format!("{}: {e}", vector.id))?;
    let actual = hex_encode(&encoder.finish());
    if actual != vector.expected_hex {
        return Err(format!(
            "{} ({}): expected {}, got {actual}",
            vector.id, vector.description, vector.expected_hex
        ));
    }
    Ok(())
}

/// Checks every row identifier vector.
///
/// # Errors
///
/// Returns a description of the first mismatch.
pub fn check_row_id_vectors() -> Result<(), String> {
    for (row_id, hex) in row_id_vectors() {
        let actual = hex_encode(&encode_row_id(row_id));
        if actual != hex {
            return Err(format!("row id {row_id}: expected {hex}, got {actual}"));
        }
    }
    Ok(())
}

/// Generate all key vectors as JSON for cross-implementation use.
pub fn all_vectors_json() -> String {
    let vectors = AllTestVectors {
        key: key_encoding_vectors(),
        row_id: row_id_vectors()
            .into_iter()
            .map(|(id, hex)| (id, hex.to_string()))
            .collect(),
    };

    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

#[derive(Debug, Serialize, Deserialize)]
struct AllTestVectors {
    key: Vec<KeyVector>,
    row_id: Vec<(u64, String)>,
}

/// Encodes bytes as hexadecimal string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decodes hexadecimal string to bytes.
pub fn hex_decode(hex: &str) -> Vec<u8> {
    let hex = hex.replace([' ', '\n', '\r'], "");
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("Invalid hex"))
        .collect()
}
