//! Secondary index over an ordered map.

use crate::config::IndexConfig;
use crate::error::{CoreError, CoreResult};
use crate::index::cost::{range_index_cost, IndexCondition};
use crate::index::cursor::{Cursor, RowSource};
use crate::index::descriptor::{map_name, IndexDescriptor};
use crate::index::key::KeyCodec;
use crate::index::unique::check_unique;
use crate::schema::{Row, SearchRow};
use mvindex_storage::{KeyIter, OrderedMap, OrderedStore};
use tracing::{debug, trace, warn};

/// A secondary index stored in one ordered map of the underlying store.
///
/// Each entry maps a composite key (index-column values followed by the
/// row ID) to an empty value. The index holds no row data of its own;
/// cursors load full rows through a [`RowSource`].
///
/// # Consistency
///
/// [`add`](Self::add) and [`remove`](Self::remove) must be called in the
/// same logical operation as the matching row write. The index does no
/// locking of its own: structural operations (rename, truncate, drop)
/// must not run concurrently with scans of the same index.
#[derive(Debug)]
pub struct SecondaryIndex<M: OrderedMap> {
    descriptor: IndexDescriptor,
    codec: KeyCodec,
    map: M,
    config: IndexConfig,
}

impl<M: OrderedMap> SecondaryIndex<M> {
    /// Opens the index, creating its backing map if it does not exist.
    ///
    /// `column_count` is the number of columns in the owning table.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedColumnType`] if type checking is
    /// enabled and an index column holds large objects.
    pub fn create<S>(
        store: &S,
        descriptor: IndexDescriptor,
        column_count: usize,
        config: IndexConfig,
    ) -> CoreResult<Self>
    where
        S: OrderedStore<Map = M>,
    {
        if config.check_column_types {
            if let Some(lob) = descriptor
                .columns
                .iter()
                .find(|c| c.column.column_type.is_large_object())
            {
                return Err(CoreError::unsupported_column_type(
                    descriptor.sql(),
                    lob.column.create_sql(),
                ));
            }
        }
        let map = store.open_map(&descriptor.backing_map_name())?;
        let codec = KeyCodec::new(&descriptor.columns, column_count);
        debug!(
            index = %descriptor.name,
            map = %map.name(),
            unique = descriptor.unique,
            "opened secondary index"
        );
        Ok(Self {
            descriptor,
            codec,
            map,
            config,
        })
    }

    /// Index definition.
    pub fn descriptor(&self) -> &IndexDescriptor {
        &self.descriptor
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Key codec for this index.
    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    /// Backing map.
    pub fn map(&self) -> &M {
        &self.map
    }

    /// Adds the entry for `row`.
    ///
    /// The uniqueness check and the write are separate store calls. Two
    /// writers racing on the same key are only kept apart by the store's
    /// isolation or by the caller serializing inserts, as [`Table`] does.
    ///
    /// [`Table`]: crate::Table
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateKey`] if the index is unique and
    /// already holds an equal key that the NULL policy does not permit.
    pub fn add(&self, row: &Row) -> CoreResult<()> {
        if self.descriptor.unique {
            check_unique(
                &self.map,
                &self.codec,
                &self.descriptor,
                row,
                self.config.null_uniqueness,
            )?;
        }
        self.map.put(self.codec.encode(row)?, Vec::new())?;
        Ok(())
    }

    /// Removes the entry for `row`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RowNotFoundOnDelete`] if there is no entry for
    /// the row; the index and the row storage have drifted apart.
    pub fn remove(&self, row: &Row) -> CoreResult<()> {
        let key = self.codec.encode(row)?;
        if self.map.remove(&key)?.is_none() {
            warn!(
                index = %self.descriptor.name,
                row_id = %row.id,
                "index entry missing on delete"
            );
            return Err(CoreError::row_not_found_on_delete(
                self.descriptor.sql(),
                row.id,
            ));
        }
        Ok(())
    }

    /// Opens a cursor over entries between `first` and `last`.
    ///
    /// The scan starts at the first key at or after `first` (or at the
    /// beginning when `None`) and ends at the first key sorting after
    /// `last` on the index columns. Unset columns in either bound are
    /// unconstrained.
    ///
    /// # Errors
    ///
    /// Fails if the lower bound cannot be encoded or the map is closed.
    pub fn find<'a, R: RowSource + ?Sized>(
        &'a self,
        rows: &'a R,
        first: Option<&SearchRow>,
        last: Option<&SearchRow>,
    ) -> CoreResult<Cursor<'a, R>> {
        let probe = self.codec.encode_probe(first)?;
        trace!(
            index = %self.descriptor.name,
            from_start = probe.is_none(),
            bounded = last.is_some(),
            "opening range scan"
        );
        let keys = self.map.key_iter(probe.as_deref())?;
        let mut cursor = Cursor::new(&self.codec, rows, last.cloned());
        cursor.open(keys);
        Ok(cursor)
    }

    /// Whether [`find_first_or_last`](Self::find_first_or_last) is
    /// supported. Always true for an ordered index.
    pub fn can_get_first_or_last(&self) -> bool {
        true
    }

    /// Opens a cursor positioned on the first (or last) entry whose
    /// leading index column is not NULL.
    ///
    /// The entry is readable through [`Cursor::current`] straight away;
    /// advancing moves past it and ends the cursor. Entries with a NULL
    /// leading column are skipped. The cursor comes back exhausted if every
    /// entry has one, or the index is empty.
    ///
    /// # Errors
    ///
    /// Fails on storage or decoding errors.
    pub fn find_first_or_last<'a, R: RowSource + ?Sized>(
        &'a self,
        rows: &'a R,
        first: bool,
    ) -> CoreResult<Cursor<'a, R>> {
        let mut key = if first {
            self.map.first_key()?
        } else {
            self.map.last_key()?
        };
        while let Some(current) = &key {
            if !self.codec.leading_is_null(current)? {
                break;
            }
            key = if first {
                self.map.higher_key(current)?
            } else {
                self.map.lower_key(current)?
            };
        }
        trace!(
            index = %self.descriptor.name,
            first,
            found = key.is_some(),
            "first/last lookup"
        );
        let keys: KeyIter<'a> = Box::new(key.into_iter().map(Ok));
        let mut cursor = Cursor::new(&self.codec, rows, None);
        cursor.open(keys);
        cursor.position()?;
        Ok(cursor)
    }

    /// Estimated cost of a scan constrained by `masks`, one per table
    /// column.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    pub fn estimate_cost(&self, masks: Option<&[IndexCondition]>) -> CoreResult<f64> {
        let base = range_index_cost(
            &self.descriptor.columns,
            self.descriptor.unique,
            masks,
            self.approximate_row_count()?,
        );
        Ok(self.config.cost_multiplier * base as f64)
    }

    /// Number of entries.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    pub fn row_count(&self) -> CoreResult<u64> {
        Ok(self.map.size()?)
    }

    /// Approximate number of entries; currently exact.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    pub fn approximate_row_count(&self) -> CoreResult<u64> {
        self.row_count()
    }

    /// True when the index holds no entries and should be repopulated from
    /// the table.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    pub fn needs_rebuild(&self) -> CoreResult<bool> {
        Ok(self.row_count()? == 0)
    }

    /// Renames the index and its backing map.
    ///
    /// # Errors
    ///
    /// Fails if the new map name is taken; the index keeps its old name.
    pub fn rename(&mut self, new_name: &str) -> CoreResult<()> {
        let old = std::mem::replace(&mut self.descriptor.name, new_name.to_string());
        if let Err(e) = self.map.rename_map(&map_name(new_name, self.descriptor.id)) {
            self.descriptor.name = old;
            return Err(e.into());
        }
        debug!(from = %old, to = %new_name, "renamed index");
        Ok(())
    }

    /// Removes every entry, keeping the backing map.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    pub fn truncate(&self) -> CoreResult<()> {
        self.map.clear()?;
        debug!(index = %self.descriptor.name, "truncated index");
        Ok(())
    }

    /// Removes the backing map. Does nothing if it is already closed.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn drop_index(&self) -> CoreResult<()> {
        if self.map.is_closed() {
            return Ok(());
        }
        self.map.remove_map()?;
        debug!(index = %self.descriptor.name, "dropped index");
        Ok(())
    }
}
