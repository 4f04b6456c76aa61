//! Typed column values.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Declared type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// `BOOLEAN`
    Boolean,
    /// `BIGINT`
    Integer,
    /// `VARCHAR`
    Varchar,
    /// `VARBINARY`
    Varbinary,
    /// Character large object.
    Clob,
    /// Binary large object.
    Blob,
}

impl ColumnType {
    /// Returns true for the large-object types, which cannot be indexed.
    #[must_use]
    pub const fn is_large_object(self) -> bool {
        matches!(self, ColumnType::Clob | ColumnType::Blob)
    }

    /// SQL name of the type.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer => "BIGINT",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Varbinary => "VARBINARY",
            ColumnType::Clob => "CLOB",
            ColumnType::Blob => "BLOB",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A single column value.
///
/// Values are totally ordered: `Null` sorts below everything, values of
/// different types sort by type rank (boolean, integer, text, bytes, then
/// the large objects), and values of the same type by content. The key
/// encoding in [`crate::key`] produces bytes whose order matches this
/// ordering exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// UTF-8 text.
    Text(String),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Character large object.
    Clob(String),
    /// Binary large object.
    Blob(Vec<u8>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value may appear in an index key.
    pub fn is_indexable(&self) -> bool {
        !matches!(self, Value::Clob(_) | Value::Blob(_))
    }

    /// Name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Integer(_) => "BIGINT",
            Value::Text(_) => "VARCHAR",
            Value::Bytes(_) => "VARBINARY",
            Value::Clob(_) => "CLOB",
            Value::Blob(_) => "BLOB",
        }
    }

    /// The column type this value belongs to, or `None` for NULL.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ColumnType::Boolean),
            Value::Integer(_) => Some(ColumnType::Integer),
            Value::Text(_) => Some(ColumnType::Varchar),
            Value::Bytes(_) => Some(ColumnType::Varbinary),
            Value::Clob(_) => Some(ColumnType::Clob),
            Value::Blob(_) => Some(ColumnType::Blob),
        }
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a string, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Clob(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as bytes, if it is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) | Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Integer(_) => 2,
            Value::Text(_) => 3,
            Value::Bytes(_) => 4,
            Value::Clob(_) => 5,
            Value::Blob(_) => 6,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) | (Value::Clob(a), Value::Clob(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) | (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Text(s) | Value::Clob(s) => write!(f, "'{s}'"),
            Value::Bytes(b) | Value::Blob(b) => {
                f.write_str("X'")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("'")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sorts_first() {
        assert!(Value::Null < Value::Bool(false));
        assert!(Value::Null < Value::Integer(i64::MIN));
        assert!(Value::Null < Value::Text(String::new()));
    }

    #[test]
    fn integers_order_numerically() {
        assert!(Value::Integer(-5) < Value::Integer(3));
        assert!(Value::Integer(25) < Value::Integer(30));
    }

    #[test]
    fn mixed_types_order_by_rank() {
        assert!(Value::Integer(i64::MAX) < Value::Text("a".into()));
        assert!(Value::Text("zzz".into()) < Value::Bytes(vec![]));
    }

    #[test]
    fn large_objects_are_not_indexable() {
        assert!(!Value::Clob("x".into()).is_indexable());
        assert!(!Value::Blob(vec![1]).is_indexable());
        assert!(Value::Null.is_indexable());
        assert!(ColumnType::Blob.is_large_object());
        assert!(!ColumnType::Varchar.is_large_object());
    }

    #[test]
    fn option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a@x.com")), Value::Text("a@x.com".into()));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Text("bob".into()).to_string(), "'bob'");
        assert_eq!(Value::Bytes(vec![0xab, 0x01]).to_string(), "X'ab01'");
    }
}
