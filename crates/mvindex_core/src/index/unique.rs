//! Uniqueness enforcement for unique indexes.
//!
//! There is no separate lookup structure: the check is a single ceiling
//! lookup in the index map itself. Keys are ordered by index columns first,
//! so the smallest stored key at or after `(row's values, RowId::MIN)` is
//! the only candidate for a conflict.
//!
//! The check and the following write are not atomic. Two sessions racing
//! on the same key are resolved by the store's own concurrency control.

use crate::config::NullUniqueness;
use crate::error::{CoreError, CoreResult};
use crate::index::descriptor::IndexDescriptor;
use crate::index::key::KeyCodec;
use crate::schema::{Row, SearchRow};
use crate::types::RowId;
use mvindex_storage::OrderedMap;
use std::cmp::Ordering;
use tracing::warn;

/// Fails with [`CoreError::DuplicateKey`] if inserting `row` would give two
/// rows equal index-column values.
pub(crate) fn check_unique<M: OrderedMap>(
    map: &M,
    codec: &KeyCodec,
    descriptor: &IndexDescriptor,
    row: &Row,
    policy: NullUniqueness,
) -> CoreResult<()> {
    let probe = codec.encode_with_row_id(row, RowId::MIN)?;
    let Some(found) = map.ceiling_key(&probe)? else {
        return Ok(());
    };
    let existing = codec.decode(&found)?;
    if codec.compare_rows(row, &existing) != Ordering::Equal {
        return Ok(());
    }
    if permits_duplicate(codec, &existing, policy) {
        return Ok(());
    }
    let conflicting_row = existing.row_id.unwrap_or(RowId::MIN);
    let key = codec.describe(row);
    warn!(
        index = %descriptor.name,
        row_id = %row.id,
        conflicting_row = %conflicting_row,
        key = %key,
        "duplicate key rejected"
    );
    Err(CoreError::duplicate_key(
        descriptor.sql(),
        key,
        conflicting_row,
    ))
}

fn permits_duplicate(codec: &KeyCodec, existing: &SearchRow, policy: NullUniqueness) -> bool {
    match policy {
        NullUniqueness::AllowMultiple => codec.any_null(existing),
        NullUniqueness::SingleNull => false,
        NullUniqueness::AllowMultipleIfAllNull => codec.all_null(existing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::descriptor::IndexColumn;
    use crate::schema::Column;
    use crate::types::IndexId;
    use mvindex_codec::ColumnType;
    use mvindex_storage::{InMemoryStore, OrderedStore};

    struct Fixture {
        map: mvindex_storage::InMemoryMap,
        codec: KeyCodec,
        descriptor: IndexDescriptor,
    }

    // Table (a, b); unique index on (a, b).
    fn fixture() -> Fixture {
        let columns = vec![
            IndexColumn::ascending(Column::new(0, "a", ColumnType::Integer)),
            IndexColumn::ascending(Column::new(1, "b", ColumnType::Integer)),
        ];
        let descriptor =
            IndexDescriptor::new(IndexId::new(1), "t_ab", "t", columns.clone()).unique();
        let map = InMemoryStore::new()
            .open_map(&descriptor.backing_map_name())
            .unwrap();
        Fixture {
            map,
            codec: KeyCodec::new(&columns, 2),
            descriptor,
        }
    }

    fn row(id: u64, a: Option<i64>, b: Option<i64>) -> Row {
        Row::new(RowId::new(id), vec![a.into(), b.into()])
    }

    impl Fixture {
        fn insert(&self, row: &Row, policy: NullUniqueness) -> CoreResult<()> {
            check_unique(&self.map, &self.codec, &self.descriptor, row, policy)?;
            self.map.put(self.codec.encode(row)?, Vec::new())?;
            Ok(())
        }
    }

    #[test]
    fn equal_keys_conflict() {
        let f = fixture();
        f.insert(&row(1, Some(1), Some(2)), NullUniqueness::AllowMultiple)
            .unwrap();
        let err = f
            .insert(&row(2, Some(1), Some(2)), NullUniqueness::AllowMultiple)
            .unwrap_err();
        match err {
            CoreError::DuplicateKey {
                conflicting_row,
                key,
                ..
            } => {
                assert_eq!(conflicting_row, RowId::new(1));
                assert_eq!(key, "(1, 2)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn different_keys_do_not_conflict() {
        let f = fixture();
        f.insert(&row(1, Some(1), Some(2)), NullUniqueness::SingleNull)
            .unwrap();
        f.insert(&row(2, Some(1), Some(3)), NullUniqueness::SingleNull)
            .unwrap();
        f.insert(&row(3, Some(0), Some(2)), NullUniqueness::SingleNull)
            .unwrap();
    }

    #[test]
    fn partial_null_policy_matrix() {
        let policies = [
            (NullUniqueness::AllowMultiple, true),
            (NullUniqueness::SingleNull, false),
            (NullUniqueness::AllowMultipleIfAllNull, false),
        ];
        for (policy, allowed) in policies {
            let f = fixture();
            f.insert(&row(1, Some(1), None), policy).unwrap();
            let second = f.insert(&row(2, Some(1), None), policy);
            assert_eq!(second.is_ok(), allowed, "{policy:?}");
        }
    }

    #[test]
    fn all_null_policy_matrix() {
        let policies = [
            (NullUniqueness::AllowMultiple, true),
            (NullUniqueness::SingleNull, false),
            (NullUniqueness::AllowMultipleIfAllNull, true),
        ];
        for (policy, allowed) in policies {
            let f = fixture();
            f.insert(&row(1, None, None), policy).unwrap();
            let second = f.insert(&row(2, None, None), policy);
            assert_eq!(second.is_ok(), allowed, "{policy:?}");
        }
    }

    #[test]
    fn conflict_found_past_lower_row_ids() {
        let f = fixture();
        f.insert(&row(10, Some(5), Some(5)), NullUniqueness::AllowMultiple)
            .unwrap();
        // a later row with a smaller id still hits the ceiling lookup
        let err = f
            .insert(&row(3, Some(5), Some(5)), NullUniqueness::AllowMultiple)
            .unwrap_err();
        assert!(err.is_duplicate_key());
    }
}
