//! Composite key construction and the index column comparator.

use crate::error::{CoreError, CoreResult};
use crate::index::descriptor::IndexColumn;
use crate::schema::{Row, RowLike, SearchRow};
use crate::types::RowId;
use mvindex_codec::{KeyDecoder, KeyEncoder, SortDirection, ROW_ID_LEN};
use std::cmp::Ordering;

/// Converts rows to composite keys and back for one index.
///
/// A composite key holds one component per index column followed by the
/// row ID. Keys of stored entries always carry the row ID; probe keys used
/// as scan bounds may stop early (see [`KeyCodec::encode_probe`]).
#[derive(Debug, Clone)]
pub struct KeyCodec {
    /// `(table column position, direction)` per index column.
    columns: Vec<(usize, SortDirection)>,
    /// Number of columns in the owning table.
    column_count: usize,
}

impl KeyCodec {
    /// Creates a codec for the given index columns of a table with
    /// `column_count` columns.
    pub fn new(columns: &[IndexColumn], column_count: usize) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|c| (c.column.id, c.direction))
                .collect(),
            column_count,
        }
    }

    /// Number of index columns (the key arity minus one).
    pub fn key_columns(&self) -> usize {
        self.columns.len()
    }

    /// Builds the stored key for `row`, ending in the row's ID.
    ///
    /// # Errors
    ///
    /// Fails if the row lacks an indexed column or holds a large object
    /// in one.
    pub fn encode(&self, row: &Row) -> CoreResult<Vec<u8>> {
        self.encode_with_row_id(row, row.id)
    }

    /// Builds the key for `row` with `row_id` in the trailing slot.
    ///
    /// Used with [`RowId::MIN`] to get the smallest key sharing the row's
    /// index-column values.
    ///
    /// # Errors
    ///
    /// Same as [`KeyCodec::encode`].
    pub fn encode_with_row_id(&self, row: &Row, row_id: RowId) -> CoreResult<Vec<u8>> {
        let mut encoder = KeyEncoder::with_capacity(self.columns.len() * 10 + ROW_ID_LEN);
        for &(column, direction) in &self.columns {
            let value = row.value(column).ok_or_else(|| {
                CoreError::invalid_operation(format!(
                    "row {} has no value for column {column}",
                    row.id
                ))
            })?;
            encoder.push_value(value, direction)?;
        }
        encoder.push_row_id(row_id.as_u64());
        Ok(encoder.finish())
    }

    /// Builds a lower-bound probe from a partial search row.
    ///
    /// Returns `None` when there is no search row, meaning "start at the
    /// beginning". Encoding stops at the first unset index column, so the
    /// probe sorts before every key that extends it; the row ID is only
    /// appended when every index column is set.
    ///
    /// # Errors
    ///
    /// Fails if a set column holds a large object.
    pub fn encode_probe(&self, search: Option<&SearchRow>) -> CoreResult<Option<Vec<u8>>> {
        let Some(search) = search else {
            return Ok(None);
        };
        let mut encoder = KeyEncoder::new();
        for &(column, direction) in &self.columns {
            match search.value(column) {
                Some(value) => encoder.push_value(value, direction)?,
                None => return Ok(Some(encoder.finish())),
            }
        }
        if let Some(row_id) = search.row_id {
            encoder.push_row_id(row_id.as_u64());
        }
        Ok(Some(encoder.finish()))
    }

    /// Decodes a stored key into a search row carrying the row ID and the
    /// index-column values; every other column is left unset.
    ///
    /// # Errors
    ///
    /// Fails if the key is malformed.
    pub fn decode(&self, key: &[u8]) -> CoreResult<SearchRow> {
        let mut row = SearchRow::new(self.column_count);
        let mut decoder = KeyDecoder::new(key);
        for &(column, direction) in &self.columns {
            row.set_value(column, decoder.read_value(direction)?);
        }
        row.row_id = Some(RowId::new(decoder.read_row_id()?));
        decoder.finish()?;
        Ok(row)
    }

    /// Returns true if the first index column of `key` is NULL.
    ///
    /// # Errors
    ///
    /// Fails if the key is malformed.
    pub fn leading_is_null(&self, key: &[u8]) -> CoreResult<bool> {
        let Some(&(_, direction)) = self.columns.first() else {
            return Ok(false);
        };
        Ok(KeyDecoder::new(key).read_value(direction)?.is_null())
    }

    /// Compares two rows on the index columns, honouring each column's
    /// direction. The row ID is ignored.
    ///
    /// Comparison stops, reporting equality, at the first column that is
    /// unset in either row.
    pub fn compare_rows<A: RowLike, B: RowLike>(&self, a: &A, b: &B) -> Ordering {
        for &(column, direction) in &self.columns {
            let (Some(left), Some(right)) = (a.value(column), b.value(column)) else {
                return Ordering::Equal;
            };
            let ordering = direction.apply(left.cmp(right));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Index-column values of `row` as `(v1, v2, ...)`, for diagnostics.
    pub fn describe<R: RowLike>(&self, row: &R) -> String {
        let parts: Vec<String> = self
            .columns
            .iter()
            .map(|&(column, _)| {
                row.value(column)
                    .map_or_else(|| "?".to_string(), ToString::to_string)
            })
            .collect();
        format!("({})", parts.join(", "))
    }

    /// Whether any index column of `row` is NULL.
    pub(crate) fn any_null<R: RowLike>(&self, row: &R) -> bool {
        self.columns
            .iter()
            .any(|&(column, _)| row.value(column).is_some_and(|v| v.is_null()))
    }

    /// Whether every index column of `row` is NULL.
    pub(crate) fn all_null<R: RowLike>(&self, row: &R) -> bool {
        self.columns
            .iter()
            .all(|&(column, _)| row.value(column).is_some_and(|v| v.is_null()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use mvindex_codec::{ColumnType, Value};
    use proptest::prelude::*;

    // Table (id, name, age); index on (age ASC, name DESC).
    fn codec() -> KeyCodec {
        KeyCodec::new(
            &[
                IndexColumn::ascending(Column::new(2, "age", ColumnType::Integer)),
                IndexColumn::descending(Column::new(1, "name", ColumnType::Varchar)),
            ],
            3,
        )
    }

    fn row(id: u64, name: Option<&str>, age: Option<i64>) -> Row {
        Row::new(
            RowId::new(id),
            vec![Value::Integer(id as i64), name.into(), age.into()],
        )
    }

    #[test]
    fn decode_restores_index_columns_only() {
        let codec = codec();
        let key = codec.encode(&row(9, Some("ann"), Some(30))).unwrap();
        let decoded = codec.decode(&key).unwrap();
        assert_eq!(decoded.row_id, Some(RowId::new(9)));
        assert_eq!(decoded.value(0), None);
        assert_eq!(decoded.value(1), Some(&Value::Text("ann".into())));
        assert_eq!(decoded.value(2), Some(&Value::Integer(30)));
    }

    #[test]
    fn probe_of_none_is_none() {
        assert_eq!(codec().encode_probe(None).unwrap(), None);
    }

    #[test]
    fn probe_stops_at_unset_column() {
        let codec = codec();
        let probe = SearchRow::new(3).with_value(2, 30i64);
        let probe = codec.encode_probe(Some(&probe)).unwrap().unwrap();
        let key = codec.encode(&row(1, Some("zed"), Some(30))).unwrap();
        let lower = codec.encode(&row(1, Some("zed"), Some(29))).unwrap();
        assert!(probe < key);
        assert!(lower < probe);
    }

    #[test]
    fn min_row_id_probe_precedes_equal_keys() {
        let codec = codec();
        let r = row(5, Some("ann"), Some(30));
        let probe = codec.encode_with_row_id(&r, RowId::MIN).unwrap();
        let existing = codec.encode(&row(1, Some("ann"), Some(30))).unwrap();
        assert!(probe < existing);
    }

    #[test]
    fn compare_honours_direction() {
        let codec = codec();
        let a = row(1, Some("ann"), Some(30));
        let b = row(2, Some("bob"), Some(30));
        // name is descending, so "bob" sorts before "ann"
        assert_eq!(codec.compare_rows(&a, &b), Ordering::Greater);
        assert_eq!(codec.compare_rows(&a, &a.clone()), Ordering::Equal);
    }

    #[test]
    fn compare_stops_at_unset_bound() {
        let codec = codec();
        let bound = SearchRow::new(3).with_value(2, 30i64);
        assert_eq!(
            codec.compare_rows(&row(1, Some("zzz"), Some(30)), &bound),
            Ordering::Equal
        );
        assert_eq!(
            codec.compare_rows(&row(1, Some("a"), Some(31)), &bound),
            Ordering::Greater
        );
    }

    #[test]
    fn leading_null_detected() {
        let codec = codec();
        let null_key = codec.encode(&row(1, Some("a"), None)).unwrap();
        let set_key = codec.encode(&row(2, None, Some(1))).unwrap();
        assert!(codec.leading_is_null(&null_key).unwrap());
        assert!(!codec.leading_is_null(&set_key).unwrap());
    }

    #[test]
    fn large_object_in_row_rejected() {
        let codec = KeyCodec::new(
            &[IndexColumn::ascending(Column::new(0, "doc", ColumnType::Clob))],
            1,
        );
        let r = Row::new(RowId::new(1), vec![Value::Clob("text".into())]);
        assert!(matches!(codec.encode(&r), Err(CoreError::Codec(_))));
    }

    #[test]
    fn describe_renders_values() {
        let codec = codec();
        assert_eq!(codec.describe(&row(1, None, Some(4))), "(4, NULL)");
    }

    proptest! {
        #[test]
        fn decode_of_encode_round_trips(
            id in 1u64..u64::MAX,
            name in proptest::option::of("[a-z\\x00]{0,8}"),
            age in proptest::option::of(any::<i64>()),
        ) {
            let codec = codec();
            let expected = row(id, name.as_deref(), age);
            let decoded = codec.decode(&codec.encode(&expected).unwrap()).unwrap();
            prop_assert_eq!(decoded.row_id, Some(expected.id));
            prop_assert_eq!(decoded.value(1), expected.value(1));
            prop_assert_eq!(decoded.value(2), expected.value(2));
        }

        #[test]
        fn byte_order_agrees_with_comparator(
            a in (proptest::option::of("[a-c]{0,3}"), proptest::option::of(-3i64..3), 1u64..5),
            b in (proptest::option::of("[a-c]{0,3}"), proptest::option::of(-3i64..3), 1u64..5),
        ) {
            let codec = codec();
            let ra = row(a.2, a.0.as_deref(), a.1);
            let rb = row(b.2, b.0.as_deref(), b.1);
            let expected = codec.compare_rows(&ra, &rb).then(ra.id.cmp(&rb.id));
            let ka = codec.encode(&ra).unwrap();
            let kb = codec.encode(&rb).unwrap();
            prop_assert_eq!(ka.cmp(&kb), expected);
        }
    }
}
