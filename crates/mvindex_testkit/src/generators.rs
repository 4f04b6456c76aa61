//! Property-based test generators using proptest.
//!
//! Strategies produce values that fit a declared column, so generated
//! rows are always accepted by a table.

use mvindex_codec::{ColumnType, SortDirection, Value};
use mvindex_core::Column;
use proptest::prelude::*;

/// Strategy for a non-NULL value of the given column type.
pub fn typed_value_strategy(column_type: ColumnType) -> BoxedStrategy<Value> {
    match column_type {
        ColumnType::Boolean => any::<bool>().prop_map(Value::Bool).boxed(),
        ColumnType::Integer => any::<i64>().prop_map(Value::Integer).boxed(),
        ColumnType::Varchar => "[a-z\\x00]{0,12}".prop_map(Value::Text).boxed(),
        ColumnType::Varbinary => prop::collection::vec(any::<u8>(), 0..16)
            .prop_map(Value::Bytes)
            .boxed(),
        ColumnType::Clob => "[ -~]{0,64}".prop_map(Value::Clob).boxed(),
        ColumnType::Blob => prop::collection::vec(any::<u8>(), 0..64)
            .prop_map(Value::Blob)
            .boxed(),
    }
}

/// Strategy for a value that fits `column`: NULL about one time in five
/// when the column is nullable.
pub fn column_value_strategy(column: &Column) -> BoxedStrategy<Value> {
    let typed = typed_value_strategy(column.column_type);
    if column.nullable {
        prop_oneof![1 => Just(Value::Null), 4 => typed].boxed()
    } else {
        typed
    }
}

/// Strategy for any indexable value, NULL included.
pub fn indexable_value_strategy() -> BoxedStrategy<Value> {
    prop_oneof![
        Just(Value::Null),
        typed_value_strategy(ColumnType::Boolean),
        typed_value_strategy(ColumnType::Integer),
        typed_value_strategy(ColumnType::Varchar),
        typed_value_strategy(ColumnType::Varbinary),
    ]
    .boxed()
}

/// Strategy for a full set of row values matching `columns`.
pub fn row_values_strategy(columns: &[Column]) -> BoxedStrategy<Vec<Value>> {
    columns
        .iter()
        .map(column_value_strategy)
        .collect::<Vec<_>>()
        .boxed()
}

/// Strategy for integer values drawn from a small domain, so that
/// duplicates are common.
pub fn narrow_integer_strategy(max: i64) -> impl Strategy<Value = Option<i64>> {
    prop::option::weighted(0.8, 0..max)
}

/// Strategy for a sort direction.
pub fn direction_strategy() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Ascending), Just(SortDirection::Descending)]
}

/// Strategy for generating valid index names.
pub fn index_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// A table mutation.
#[derive(Debug, Clone)]
pub enum TableOperation {
    /// Insert a row.
    Insert {
        /// Values, one per column
        values: Vec<Value>,
    },
    /// Delete the n-th live row (modulo the live count).
    Delete {
        /// Position among live rows
        slot: usize,
    },
}

/// Strategy for generating table operations.
pub fn table_operation_strategy(columns: &[Column]) -> impl Strategy<Value = TableOperation> {
    prop_oneof![
        3 => row_values_strategy(columns).prop_map(|values| TableOperation::Insert { values }),
        1 => any::<usize>().prop_map(|slot| TableOperation::Delete { slot }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    columns: &[Column],
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<TableOperation>> {
    prop::collection::vec(table_operation_strategy(columns), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::people_columns;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn typed_values_match_type(value in typed_value_strategy(ColumnType::Varbinary)) {
            prop_assert_eq!(value.column_type(), Some(ColumnType::Varbinary));
        }

        #[test]
        fn row_values_fit_columns(values in row_values_strategy(&people_columns())) {
            let columns = people_columns();
            prop_assert_eq!(values.len(), columns.len());
            for (column, value) in columns.iter().zip(&values) {
                prop_assert!(column.accepts(value));
            }
        }

        #[test]
        fn indexable_values_are_indexable(value in indexable_value_strategy()) {
            prop_assert!(value.is_indexable());
        }

        #[test]
        fn index_name_is_valid(name in index_name_strategy()) {
            let first = name.chars().next();
            prop_assert!(first.map_or(false, |c| c.is_ascii_lowercase()));
        }
    }
}
