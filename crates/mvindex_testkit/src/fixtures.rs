//! Test fixtures and table helpers.
//!
//! Provides convenience functions for setting up test tables
//! and common test scenarios.

use mvindex_codec::{ColumnType, SortDirection, Value};
use mvindex_core::{Column, IndexConfig, RowId, Table, TableId};
use mvindex_storage::InMemoryStore;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Name of the non-unique index on `people.age`.
pub const AGE_INDEX: &str = "people_age";
/// Name of the unique index on `people.email`.
pub const EMAIL_INDEX: &str = "people_email";

static TRACING: Once = Once::new();

/// Installs a test-friendly tracing subscriber, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call has an effect.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Columns of the `people` table: `name`, `email`, `age`.
pub fn people_columns() -> Vec<Column> {
    vec![
        Column::new(0, "name", ColumnType::Varchar).not_null(),
        Column::new(1, "email", ColumnType::Varchar).with_selectivity(100),
        Column::new(2, "age", ColumnType::Integer).with_selectivity(10),
    ]
}

/// Values for one `people` row.
pub fn person(name: &str, email: Option<&str>, age: Option<i64>) -> Vec<Value> {
    vec![name.into(), email.into(), age.into()]
}

/// A test table over its own in-memory store.
pub struct TestTable {
    /// The table instance.
    pub table: Table<InMemoryStore>,
    /// The store, kept to inspect backing maps.
    pub store: InMemoryStore,
}

impl TestTable {
    /// Creates an empty `people` table with no indexes.
    pub fn people() -> Self {
        Self::people_with_config(IndexConfig::default())
    }

    /// Creates an empty `people` table with the given configuration.
    pub fn people_with_config(config: IndexConfig) -> Self {
        init_tracing();
        let store = InMemoryStore::new();
        let table = Table::create(
            store.clone(),
            TableId::new(1),
            "people",
            people_columns(),
            config,
        )
        .expect("Failed to create table");
        Self { table, store }
    }

    /// Creates a `people` table with [`AGE_INDEX`] and [`EMAIL_INDEX`].
    pub fn indexed_people() -> Self {
        let mut test_table = Self::people();
        test_table
            .table
            .create_index(AGE_INDEX, &[("age", SortDirection::Ascending)], false)
            .expect("Failed to create age index");
        test_table
            .table
            .create_index(EMAIL_INDEX, &[("email", SortDirection::Ascending)], true)
            .expect("Failed to create email index");
        test_table
    }

    /// Inserts a person, panicking on failure.
    pub fn add(&self, name: &str, email: Option<&str>, age: Option<i64>) -> RowId {
        self.table
            .insert(person(name, email, age))
            .expect("Failed to insert row")
    }
}

impl std::ops::Deref for TestTable {
    type Target = Table<InMemoryStore>;

    fn deref(&self) -> &Self::Target {
        &self.table
    }
}

impl std::ops::DerefMut for TestTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.table
    }
}

/// Runs a test against an indexed `people` table.
///
/// # Example
///
/// ```rust
/// use mvindex_testkit::{with_people_table, AGE_INDEX};
///
/// with_people_table(|people| {
///     people.add("ann", None, Some(30));
///     assert_eq!(people.index(AGE_INDEX).unwrap().row_count().unwrap(), 1);
/// });
/// ```
pub fn with_people_table<F, R>(f: F) -> R
where
    F: FnOnce(&TestTable) -> R,
{
    let test_table = TestTable::indexed_people();
    f(&test_table)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates an indexed `people` table with `count` rows. Ages cycle
    /// through 0..50 and every fifth row has no email.
    pub fn populated_people(count: usize) -> TestTable {
        let test_table = TestTable::indexed_people();
        for i in 0..count {
            let email = format!("user{i}@example.com");
            let email = (i % 5 != 0).then_some(email.as_str());
            test_table.add(&format!("user{i}"), email, Some((i % 50) as i64));
        }
        test_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvindex_storage::OrderedStore;

    #[test]
    fn test_people_table() {
        let people = TestTable::people();
        assert_eq!(people.columns().len(), 3);
        assert!(people.indexes().is_empty());
    }

    #[test]
    fn test_indexed_people() {
        let people = TestTable::indexed_people();
        assert!(people.store.has_map("people_age_1"));
        assert!(people.store.has_map("people_email_2"));
    }

    #[test]
    fn test_populated_scenario() {
        let people = scenarios::populated_people(20);
        assert_eq!(people.row_count().unwrap(), 20);
        assert_eq!(people.index(EMAIL_INDEX).unwrap().row_count().unwrap(), 20);
    }
}
