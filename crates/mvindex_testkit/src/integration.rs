//! Cross-crate integration test helpers.
//!
//! [`IntegrationHarness`] drives an indexed `people` table and keeps a
//! plain model of the live rows next to it, so every index can be checked
//! against what a sorted copy of the model says it should contain.

use crate::fixtures::{person, TestTable, AGE_INDEX, EMAIL_INDEX};
use crate::generators::TableOperation;
use mvindex_codec::Value;
use mvindex_core::{CoreError, RowId};
use std::collections::BTreeMap;

/// A test harness for integration testing.
pub struct IntegrationHarness {
    /// The table under test.
    pub table: TestTable,
    /// Live rows, as the table should hold them.
    rows: BTreeMap<RowId, Vec<Value>>,
}

impl IntegrationHarness {
    /// Creates a harness over an indexed `people` table.
    pub fn new() -> Self {
        Self {
            table: TestTable::indexed_people(),
            rows: BTreeMap::new(),
        }
    }

    /// Whether the model expects `values` to clash on the unique email
    /// index. NULL emails never clash under the default policy.
    pub fn expects_duplicate(&self, values: &[Value]) -> bool {
        !values[1].is_null() && self.rows.values().any(|row| row[1] == values[1])
    }

    /// Inserts a row and checks the outcome against the model.
    pub fn insert(&mut self, values: Vec<Value>) -> Option<RowId> {
        let duplicate = self.expects_duplicate(&values);
        match self.table.insert(values.clone()) {
            Ok(id) => {
                assert!(!duplicate, "duplicate email accepted: {}", values[1]);
                self.rows.insert(id, values);
                Some(id)
            }
            Err(CoreError::DuplicateKey { .. }) if duplicate => None,
            Err(e) => panic!("unexpected insert failure: {e}"),
        }
    }

    /// Inserts a person.
    pub fn add(&mut self, name: &str, email: Option<&str>, age: Option<i64>) -> Option<RowId> {
        self.insert(person(name, email, age))
    }

    /// Deletes a row and updates tracking.
    pub fn delete(&mut self, id: RowId) {
        self.table.delete(id).expect("Failed to delete row");
        self.rows.remove(&id);
    }

    /// Applies one generated operation.
    pub fn apply(&mut self, operation: &TableOperation) {
        match operation {
            TableOperation::Insert { values } => {
                self.insert(values.clone());
            }
            TableOperation::Delete { slot } => {
                if self.rows.is_empty() {
                    return;
                }
                let id = *self
                    .rows
                    .keys()
                    .nth(slot % self.rows.len())
                    .expect("slot within bounds");
                self.delete(id);
            }
        }
    }

    /// Verifies rows and both indexes against the model.
    pub fn verify_all(&self) {
        for (id, expected) in &self.rows {
            let actual = self.table.get_row(*id).expect("Failed to get row");
            assert_eq!(&actual.values, expected, "row data mismatch for {id}");
        }
        assert_eq!(
            self.table.row_count().expect("Failed to count rows"),
            self.rows.len() as u64
        );
        self.verify_index(AGE_INDEX, 2);
        self.verify_index(EMAIL_INDEX, 1);
    }

    /// Checks that a full scan of `index` yields exactly the live rows,
    /// ordered by `column` and then by row ID.
    pub fn verify_index(&self, index: &str, column: usize) {
        let mut expected: Vec<(Value, RowId)> = self
            .rows
            .iter()
            .map(|(id, values)| (values[column].clone(), *id))
            .collect();
        expected.sort();
        let expected: Vec<RowId> = expected.into_iter().map(|(_, id)| id).collect();

        let actual: Vec<RowId> = self
            .table
            .find(index, None, None)
            .expect("Failed to open scan")
            .map(|entry| {
                entry
                    .expect("Failed to read entry")
                    .row_id
                    .expect("entry without row id")
            })
            .collect();
        assert_eq!(actual, expected, "index {index} out of step with rows");
    }

    /// Returns the count of tracked rows.
    pub fn tracked_count(&self) -> usize {
        self.rows.len()
    }

    /// Live rows by ID.
    pub fn tracked_rows(&self) -> &BTreeMap<RowId, Vec<Value>> {
        &self.rows
    }
}

impl Default for IntegrationHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::people_columns;
    use crate::generators::{operation_sequence_strategy, PropTestConfig};
    use proptest::prelude::*;

    #[test]
    fn test_harness_basic() {
        let mut harness = IntegrationHarness::new();
        let a = harness.add("a", Some("a@x.com"), Some(30)).unwrap();
        assert!(harness.add("b", Some("a@x.com"), Some(31)).is_none());
        harness.add("c", None, None).unwrap();
        harness.add("d", None, Some(1)).unwrap();
        harness.verify_all();
        harness.delete(a);
        harness.verify_all();
        assert_eq!(harness.tracked_count(), 2);
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn random_operations_keep_indexes_in_step(
            ops in operation_sequence_strategy(&people_columns(), 1, 40)
        ) {
            let mut harness = IntegrationHarness::new();
            for op in &ops {
                harness.apply(op);
            }
            harness.verify_all();
        }
    }
}
