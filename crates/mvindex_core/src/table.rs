//! Row storage with secondary indexes.

use crate::config::IndexConfig;
use crate::error::{CoreError, CoreResult};
use crate::index::{Cursor, IndexColumn, IndexDescriptor, RowSource, SecondaryIndex};
use crate::schema::{Column, Row, SearchRow};
use crate::types::{IndexId, RowId, TableId};
use mvindex_codec::{decode_row, decode_row_id, encode_row, encode_row_id, SortDirection, Value};
use mvindex_storage::{OrderedMap, OrderedStore};
use parking_lot::Mutex;
use tracing::{debug, warn};

/// A table: rows keyed by [`RowId`] in a primary map, plus any number of
/// secondary indexes kept in step with it.
///
/// The primary map is named `<table>_<id>`; each row is stored as CBOR
/// under its encoded row ID. Row IDs start at 1 and are never reused.
///
/// Row mutations take `&self`. Structural operations on indexes take
/// `&mut self`, so they cannot overlap with open cursors.
///
/// # Example
///
/// ```rust
/// use mvindex_codec::{ColumnType, SortDirection, Value};
/// use mvindex_core::{Column, IndexConfig, Table, TableId};
/// use mvindex_storage::InMemoryStore;
///
/// let mut people = Table::create(
///     InMemoryStore::new(),
///     TableId::new(1),
///     "people",
///     vec![
///         Column::new(0, "name", ColumnType::Varchar),
///         Column::new(1, "age", ColumnType::Integer),
///     ],
///     IndexConfig::default(),
/// )
/// .unwrap();
/// people.create_index("people_age", &[("age", SortDirection::Ascending)], false).unwrap();
/// people.insert(vec!["ann".into(), 30i64.into()]).unwrap();
///
/// let rows = people.find("people_age", None, None).unwrap().into_rows().unwrap();
/// assert_eq!(rows[0].values[0], Value::Text("ann".into()));
/// ```
pub struct Table<S: OrderedStore> {
    id: TableId,
    name: String,
    columns: Vec<Column>,
    store: S,
    primary: S::Map,
    indexes: Vec<SecondaryIndex<S::Map>>,
    next_row_id: Mutex<RowId>,
    next_index_id: u32,
    config: IndexConfig,
}

impl<S: OrderedStore> Table<S> {
    /// Opens the table, creating its primary map if needed.
    ///
    /// Existing rows are kept and row ID allocation resumes after the
    /// highest stored ID. Indexes are not persisted as definitions;
    /// declare them again with [`create_index`](Self::create_index) in the
    /// same order to reattach their maps.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot open the map or holds a malformed key.
    pub fn create(
        store: S,
        id: TableId,
        name: impl Into<String>,
        columns: Vec<Column>,
        config: IndexConfig,
    ) -> CoreResult<Self> {
        let name = name.into();
        let primary = store.open_map(&format!("{name}_{id}"))?;
        let next_row_id = match primary.last_key()? {
            Some(key) => RowId::new(decode_row_id(&key)?).next(),
            None => RowId::new(1),
        };
        debug!(table = %name, next_row_id = %next_row_id, "opened table");
        Ok(Self {
            id,
            name,
            columns,
            store,
            primary,
            indexes: Vec::new(),
            next_row_id: Mutex::new(next_row_id),
            next_index_id: 1,
            config,
        })
    }

    /// Table identifier.
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column definitions, in row order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ColumnNotFound`] for an unknown name.
    pub fn column(&self, name: &str) -> CoreResult<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CoreError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// An empty search row sized for this table.
    pub fn template_row(&self) -> SearchRow {
        SearchRow::new(self.columns.len())
    }

    /// Secondary indexes, in creation order.
    pub fn indexes(&self) -> &[SecondaryIndex<S::Map>] {
        &self.indexes
    }

    /// Looks up an index by name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexNotFound`] for an unknown name.
    pub fn index(&self, name: &str) -> CoreResult<&SecondaryIndex<S::Map>> {
        self.position(name).map(|i| &self.indexes[i])
    }

    fn position(&self, name: &str) -> CoreResult<usize> {
        self.indexes
            .iter()
            .position(|i| i.name() == name)
            .ok_or_else(|| CoreError::IndexNotFound {
                name: name.to_string(),
            })
    }

    /// Number of stored rows.
    ///
    /// # Errors
    ///
    /// Fails if the primary map is closed.
    pub fn row_count(&self) -> CoreResult<u64> {
        Ok(self.primary.size()?)
    }

    /// Inserts a row and returns its new ID.
    ///
    /// Every index is updated first. If one rejects the row, the entries
    /// already added are removed again and nothing is written.
    ///
    /// # Errors
    ///
    /// Fails if the values do not fit the columns, or with
    /// [`CoreError::DuplicateKey`] from a unique index.
    pub fn insert(&self, values: Vec<Value>) -> CoreResult<RowId> {
        if values.len() != self.columns.len() {
            return Err(CoreError::invalid_operation(format!(
                "table {} has {} columns, got {} values",
                self.name,
                self.columns.len(),
                values.len()
            )));
        }
        if let Some((column, value)) = self
            .columns
            .iter()
            .zip(&values)
            .find(|(c, v)| !c.accepts(v))
        {
            return Err(CoreError::invalid_operation(format!(
                "value {value} does not fit column {}",
                column.create_sql()
            )));
        }

        let mut next = self.next_row_id.lock();
        let row = Row::new(*next, values);
        for (i, index) in self.indexes.iter().enumerate() {
            if let Err(e) = index.add(&row) {
                self.unwind(&row, &self.indexes[..i]);
                return Err(e);
            }
        }
        let payload = match encode_row(&row.values) {
            Ok(payload) => payload,
            Err(e) => {
                self.unwind(&row, &self.indexes);
                return Err(e.into());
            }
        };
        if let Err(e) = self.primary.put(encode_row_id(row.id.as_u64()), payload) {
            self.unwind(&row, &self.indexes);
            return Err(e.into());
        }
        *next = row.id.next();
        Ok(row.id)
    }

    fn unwind(&self, row: &Row, added: &[SecondaryIndex<S::Map>]) {
        for index in added.iter().rev() {
            if let Err(e) = index.remove(row) {
                warn!(index = %index.name(), row_id = %row.id, error = %e, "failed to undo index entry");
            }
        }
    }

    /// Deletes a row from every index and from primary storage.
    ///
    /// If an index cannot drop its entry, the entries already removed from
    /// earlier indexes are added back and the row stays.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RowNotFound`] for an unknown ID, or
    /// [`CoreError::RowNotFoundOnDelete`] if an index lacks the row.
    pub fn delete(&self, row_id: RowId) -> CoreResult<Row> {
        let row = self.get_row(row_id)?;
        for (i, index) in self.indexes.iter().enumerate() {
            if let Err(e) = index.remove(&row) {
                self.restore(&row, &self.indexes[..i]);
                return Err(e);
            }
        }
        if let Err(e) = self.primary.remove(&encode_row_id(row_id.as_u64())) {
            self.restore(&row, &self.indexes);
            return Err(e.into());
        }
        Ok(row)
    }

    fn restore(&self, row: &Row, removed: &[SecondaryIndex<S::Map>]) {
        for index in removed.iter().rev() {
            if let Err(e) = index.add(row) {
                warn!(index = %index.name(), row_id = %row.id, error = %e, "failed to restore index entry");
            }
        }
    }

    /// Loads a row by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RowNotFound`] for an unknown ID.
    pub fn get_row(&self, row_id: RowId) -> CoreResult<Row> {
        let bytes = self
            .primary
            .get(&encode_row_id(row_id.as_u64()))?
            .ok_or_else(|| CoreError::RowNotFound {
                table: self.name.clone(),
                row_id,
            })?;
        Ok(Row::new(row_id, decode_row(&bytes)?))
    }

    /// All rows in row ID order.
    ///
    /// # Errors
    ///
    /// Fails on storage or decoding errors.
    pub fn rows(&self) -> CoreResult<Vec<Row>> {
        let mut rows = Vec::new();
        for key in self.primary.key_iter(None)? {
            let row_id = RowId::new(decode_row_id(&key?)?);
            rows.push(self.get_row(row_id)?);
        }
        Ok(rows)
    }

    /// Creates a secondary index over the named columns.
    ///
    /// If the backing map is empty the index is filled from the existing
    /// rows. When that fails (for example on a duplicate key) the new map
    /// is removed again.
    ///
    /// # Errors
    ///
    /// Fails for a taken index name, an unknown column, a large-object
    /// column, or a duplicate key found while filling a unique index.
    pub fn create_index(
        &mut self,
        name: &str,
        columns: &[(&str, SortDirection)],
        unique: bool,
    ) -> CoreResult<IndexId> {
        if self.position(name).is_ok() {
            return Err(CoreError::IndexExists {
                name: name.to_string(),
            });
        }
        let columns = columns
            .iter()
            .map(|&(column, direction)| {
                self.column(column).map(|c| IndexColumn {
                    column: c.clone(),
                    direction,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;
        let id = IndexId::new(self.next_index_id);
        let mut descriptor = IndexDescriptor::new(id, name, self.name.clone(), columns);
        if unique {
            descriptor = descriptor.unique();
        }
        let index = SecondaryIndex::create(
            &self.store,
            descriptor,
            self.columns.len(),
            self.config.clone(),
        )?;
        if index.needs_rebuild()? {
            if let Err(e) = self.rebuild(&index) {
                index.drop_index()?;
                return Err(e);
            }
        }
        self.next_index_id += 1;
        self.indexes.push(index);
        Ok(id)
    }

    fn rebuild(&self, index: &SecondaryIndex<S::Map>) -> CoreResult<()> {
        let mut count = 0u64;
        for row in self.rows()? {
            index.add(&row)?;
            count += 1;
        }
        debug!(index = %index.name(), rows = count, "rebuilt index");
        Ok(())
    }

    /// Drops an index and its backing map.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexNotFound`] for an unknown name.
    pub fn drop_index(&mut self, name: &str) -> CoreResult<()> {
        let position = self.position(name)?;
        let index = self.indexes.remove(position);
        index.drop_index()
    }

    /// Renames an index.
    ///
    /// # Errors
    ///
    /// Fails for an unknown index or a taken name.
    pub fn rename_index(&mut self, name: &str, new_name: &str) -> CoreResult<()> {
        if self.position(new_name).is_ok() {
            return Err(CoreError::IndexExists {
                name: new_name.to_string(),
            });
        }
        let position = self.position(name)?;
        self.indexes[position].rename(new_name)
    }

    /// Removes every row and every index entry.
    ///
    /// # Errors
    ///
    /// Fails if a map is closed.
    pub fn truncate(&mut self) -> CoreResult<()> {
        for index in &self.indexes {
            index.truncate()?;
        }
        self.primary.clear()?;
        debug!(table = %self.name, "truncated table");
        Ok(())
    }

    /// Scans an index between two bounds.
    ///
    /// # Errors
    ///
    /// Fails for an unknown index or an unencodable bound.
    pub fn find(
        &self,
        index: &str,
        first: Option<&SearchRow>,
        last: Option<&SearchRow>,
    ) -> CoreResult<Cursor<'_, Self>> {
        self.index(index)?.find(self, first, last)
    }

    /// First or last non-NULL entry of an index.
    ///
    /// # Errors
    ///
    /// Fails for an unknown index.
    pub fn find_first_or_last(&self, index: &str, first: bool) -> CoreResult<Cursor<'_, Self>> {
        self.index(index)?.find_first_or_last(self, first)
    }
}

impl<S: OrderedStore> RowSource for Table<S> {
    fn get_row(&self, row_id: RowId) -> CoreResult<Row> {
        Table::get_row(self, row_id)
    }
}
