//! Index descriptors.

use crate::schema::Column;
use crate::types::IndexId;
use mvindex_codec::SortDirection;

/// A table column referenced by an index, with its sort direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    /// The referenced column.
    pub column: Column,
    /// Sort direction within the index.
    pub direction: SortDirection,
}

impl IndexColumn {
    /// Creates an ascending index column.
    pub fn ascending(column: Column) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    /// Creates a descending index column.
    pub fn descending(column: Column) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }

    fn sql(&self) -> String {
        match self.direction {
            SortDirection::Ascending => self.column.name.clone(),
            SortDirection::Descending => format!("{} DESC", self.column.name),
        }
    }
}

/// Definition of a secondary index.
///
/// Owned by its table. The column list is fixed at creation; only the
/// name can change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    /// Identifier, stable across renames.
    pub id: IndexId,
    /// Index name.
    pub name: String,
    /// Name of the owning table.
    pub table: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Indexed columns, in key order.
    pub columns: Vec<IndexColumn>,
}

impl IndexDescriptor {
    /// Creates a non-unique index descriptor.
    pub fn new(
        id: IndexId,
        name: impl Into<String>,
        table: impl Into<String>,
        columns: Vec<IndexColumn>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            table: table.into(),
            unique: false,
            columns,
        }
    }

    /// Makes this a unique index.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Name of the backing map: `<indexName>_<indexId>`.
    pub fn backing_map_name(&self) -> String {
        map_name(&self.name, self.id)
    }

    /// Human-readable form, e.g. `email_idx ON people(email)`.
    pub fn sql(&self) -> String {
        let cols: Vec<String> = self.columns.iter().map(IndexColumn::sql).collect();
        format!("{} ON {}({})", self.name, self.table, cols.join(", "))
    }
}

pub(crate) fn map_name(index_name: &str, id: IndexId) -> String {
    format!("{index_name}_{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvindex_codec::ColumnType;

    fn descriptor() -> IndexDescriptor {
        IndexDescriptor::new(
            IndexId::new(7),
            "people_age",
            "people",
            vec![
                IndexColumn::ascending(Column::new(2, "age", ColumnType::Integer)),
                IndexColumn::descending(Column::new(1, "name", ColumnType::Varchar)),
            ],
        )
    }

    #[test]
    fn backing_map_name_uses_id() {
        assert_eq!(descriptor().backing_map_name(), "people_age_7");
    }

    #[test]
    fn unique_builder() {
        let d = descriptor();
        assert!(!d.unique);
        assert!(d.unique().unique);
    }

    #[test]
    fn sql_lists_columns() {
        assert_eq!(descriptor().sql(), "people_age ON people(age, name DESC)");
    }
}
