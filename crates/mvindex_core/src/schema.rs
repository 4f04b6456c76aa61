//! Columns and row views.

use crate::types::RowId;
use mvindex_codec::{ColumnType, Value};

/// Default selectivity percentage for a column without statistics.
pub const DEFAULT_SELECTIVITY: u8 = 50;

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Position of the column in the row.
    pub id: usize,
    /// Column name.
    pub name: String,
    /// Declared type.
    pub column_type: ColumnType,
    /// Whether NULL is permitted.
    pub nullable: bool,
    /// Estimated percentage of distinct values (1..=100).
    pub selectivity: u8,
}

impl Column {
    /// Creates a nullable column with default selectivity.
    pub fn new(id: usize, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id,
            name: name.into(),
            column_type,
            nullable: true,
            selectivity: DEFAULT_SELECTIVITY,
        }
    }

    /// Marks the column `NOT NULL`.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the selectivity, clamped to 1..=100.
    #[must_use]
    pub fn with_selectivity(mut self, selectivity: u8) -> Self {
        self.selectivity = selectivity.clamp(1, 100);
        self
    }

    /// Column definition as it would appear in `CREATE TABLE`.
    pub fn create_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.column_type);
        if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }

    /// Returns true if `value` may be stored in this column.
    pub fn accepts(&self, value: &Value) -> bool {
        match value.column_type() {
            None => self.nullable,
            Some(ty) => ty == self.column_type,
        }
    }
}

/// Read access to a row-like value: either a full [`Row`] or a partial
/// [`SearchRow`].
pub trait RowLike {
    /// Row identifier, if set.
    fn row_id(&self) -> Option<RowId>;

    /// Value of the column at position `column`, if set.
    fn value(&self, column: usize) -> Option<&Value>;
}

/// A full table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Row identifier.
    pub id: RowId,
    /// One value per table column.
    pub values: Vec<Value>,
}

impl Row {
    /// Creates a row.
    pub fn new(id: RowId, values: Vec<Value>) -> Self {
        Self { id, values }
    }
}

impl RowLike for Row {
    fn row_id(&self) -> Option<RowId> {
        Some(self.id)
    }

    fn value(&self, column: usize) -> Option<&Value> {
        self.values.get(column)
    }
}

/// A partially populated row, used for scan bounds and for rows decoded
/// from index keys.
///
/// An unset slot (`None`) is different from a slot holding
/// [`Value::Null`]: unset means "unconstrained".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRow {
    /// Row identifier, if known.
    pub row_id: Option<RowId>,
    /// One optional value per table column.
    pub values: Vec<Option<Value>>,
}

impl SearchRow {
    /// Creates a search row with every slot unset.
    pub fn new(column_count: usize) -> Self {
        Self {
            row_id: None,
            values: vec![None; column_count],
        }
    }

    /// Sets the value at `column`, growing the row if needed.
    pub fn set_value(&mut self, column: usize, value: Value) {
        if column >= self.values.len() {
            self.values.resize(column + 1, None);
        }
        self.values[column] = Some(value);
    }

    /// Builder form of [`SearchRow::set_value`].
    #[must_use]
    pub fn with_value(mut self, column: usize, value: impl Into<Value>) -> Self {
        self.set_value(column, value.into());
        self
    }

    /// Builder form for the row identifier.
    #[must_use]
    pub fn with_row_id(mut self, row_id: RowId) -> Self {
        self.row_id = Some(row_id);
        self
    }
}

impl RowLike for SearchRow {
    fn row_id(&self) -> Option<RowId> {
        self.row_id
    }

    fn value(&self, column: usize) -> Option<&Value> {
        self.values.get(column).and_then(Option::as_ref)
    }
}

impl From<&Row> for SearchRow {
    fn from(row: &Row) -> Self {
        Self {
            row_id: Some(row.id),
            values: row.values.iter().cloned().map(Some).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_create_sql() {
        let col = Column::new(0, "email", ColumnType::Varchar).not_null();
        assert_eq!(col.create_sql(), "email VARCHAR NOT NULL");
    }

    #[test]
    fn column_accepts() {
        let age = Column::new(1, "age", ColumnType::Integer);
        assert!(age.accepts(&Value::Integer(3)));
        assert!(age.accepts(&Value::Null));
        assert!(!age.accepts(&Value::Text("3".into())));
        assert!(!age.clone().not_null().accepts(&Value::Null));
    }

    #[test]
    fn selectivity_is_clamped() {
        let col = Column::new(0, "a", ColumnType::Integer).with_selectivity(0);
        assert_eq!(col.selectivity, 1);
        let col = col.with_selectivity(200);
        assert_eq!(col.selectivity, 100);
    }

    #[test]
    fn unset_differs_from_null() {
        let row = SearchRow::new(3).with_value(1, Value::Null);
        assert_eq!(row.value(0), None);
        assert_eq!(row.value(1), Some(&Value::Null));
        assert_eq!(row.value(7), None);
    }

    #[test]
    fn search_row_from_row() {
        let row = Row::new(RowId::new(4), vec![Value::Integer(1), Value::Null]);
        let search = SearchRow::from(&row);
        assert_eq!(search.row_id(), Some(RowId::new(4)));
        assert_eq!(search.value(1), Some(&Value::Null));
    }
}
