//! CBOR encoding for stored row content.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Encodes a row's column values to CBOR.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_row(values: &[Value]) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(values, &mut out)
        .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Ok(out)
}

/// Decodes row values written by [`encode_row`].
///
/// # Errors
///
/// Returns an error if the bytes are not a valid encoded row.
pub fn decode_row(bytes: &[u8]) -> CodecResult<Vec<Value>> {
    ciborium::de::from_reader(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_with_every_type() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Integer(-42),
            Value::Text("a@x.com".into()),
            Value::Bytes(vec![0, 1, 2]),
            Value::Clob("long text".into()),
            Value::Blob(vec![9; 32]),
        ];
        let bytes = encode_row(&values).unwrap();
        assert_eq!(decode_row(&bytes).unwrap(), values);
    }

    #[test]
    fn garbage_is_rejected() {
        let result = decode_row(&[0xff, 0x00, 0x13]);
        assert!(matches!(result, Err(CodecError::DecodingFailed { .. })));
    }
}
