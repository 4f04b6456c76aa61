//! Forward-only cursors over an index.

use crate::error::CoreResult;
use crate::index::key::KeyCodec;
use crate::schema::{Row, SearchRow};
use crate::types::RowId;
use mvindex_storage::KeyIter;
use std::cmp::Ordering;
use tracing::trace;

/// Supplies full rows by row ID.
///
/// Index entries only hold the indexed columns; a cursor asks its row
/// source for everything else, and only when the caller wants it.
pub trait RowSource {
    /// Loads the row with the given ID.
    ///
    /// # Errors
    ///
    /// Fails if the row does not exist or cannot be decoded.
    fn get_row(&self, row_id: RowId) -> CoreResult<Row>;
}

/// Lifecycle of a [`Cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Built but not yet opened on a key range. Cursors returned by an
    /// index are always opened.
    Created,
    /// Opened on a key range. Right after opening a range scan there is no
    /// current entry until the first [`advance`](Cursor::advance).
    Iterating,
    /// No more entries; stays exhausted.
    Exhausted,
}

/// A forward-only cursor over index entries.
///
/// The cursor walks keys in index order and stops at the first key that
/// sorts after the upper bound; it never skips ahead looking for later
/// matches. Decoding the current key and loading the full row are both
/// deferred until asked for, and cached until the next
/// [`advance`](Cursor::advance).
///
/// A cursor also iterates as `CoreResult<SearchRow>`, yielding the decoded
/// index columns of each entry. A cursor that comes back already
/// positioned, as from a first/last lookup, yields that entry first.
///
/// Reverse iteration is not supported; use a descending index column.
pub struct Cursor<'a, R: RowSource + ?Sized> {
    codec: &'a KeyCodec,
    rows: &'a R,
    keys: KeyIter<'a>,
    upper: Option<SearchRow>,
    state: CursorState,
    current: Option<Vec<u8>>,
    search_row: Option<SearchRow>,
    row: Option<Row>,
    // positioned by the index but not yet handed out by `step`
    unread: bool,
}

impl<'a, R: RowSource + ?Sized> Cursor<'a, R> {
    pub(crate) fn new(
        codec: &'a KeyCodec,
        rows: &'a R,
        upper: Option<SearchRow>,
    ) -> Self {
        Self {
            codec,
            rows,
            keys: Box::new(std::iter::empty()),
            upper,
            state: CursorState::Created,
            current: None,
            search_row: None,
            row: None,
            unread: false,
        }
    }

    /// Attaches the key iterator of the scan.
    pub(crate) fn open(&mut self, keys: KeyIter<'a>) {
        self.keys = keys;
        self.state = CursorState::Iterating;
    }

    /// Moves onto the first entry ahead of the caller, who then reads it
    /// through [`current`](Self::current) without advancing.
    pub(crate) fn position(&mut self) -> CoreResult<()> {
        self.unread = self.advance()?;
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Moves to the next entry. Returns `false` once the index or the upper
    /// bound is exhausted.
    ///
    /// # Errors
    ///
    /// Storage and decoding errors end the scan and are returned.
    pub fn advance(&mut self) -> CoreResult<bool> {
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }
        self.unread = false;
        self.search_row = None;
        self.row = None;
        let key = match self.keys.next() {
            Some(Ok(key)) => key,
            Some(Err(e)) => {
                self.finish();
                return Err(e.into());
            }
            None => {
                self.finish();
                return Ok(false);
            }
        };
        if let Some(upper) = &self.upper {
            let decoded = match self.codec.decode(&key) {
                Ok(decoded) => decoded,
                Err(e) => {
                    self.finish();
                    return Err(e);
                }
            };
            if self.codec.compare_rows(&decoded, upper) == Ordering::Greater {
                trace!(row_id = ?decoded.row_id, "scan passed upper bound");
                self.finish();
                return Ok(false);
            }
            self.search_row = Some(decoded);
        }
        self.current = Some(key);
        self.state = CursorState::Iterating;
        Ok(true)
    }

    /// Index columns and row ID of the current entry.
    ///
    /// # Errors
    ///
    /// Fails if the stored key cannot be decoded.
    pub fn search_row(&mut self) -> CoreResult<Option<&SearchRow>> {
        if self.search_row.is_none() {
            if let Some(key) = &self.current {
                self.search_row = Some(self.codec.decode(key)?);
            }
        }
        Ok(self.search_row.as_ref())
    }

    /// Row ID of the current entry.
    ///
    /// # Errors
    ///
    /// Fails if the stored key cannot be decoded.
    pub fn row_id(&mut self) -> CoreResult<Option<RowId>> {
        Ok(self.search_row()?.and_then(|r| r.row_id))
    }

    /// The full current row, loaded from the row source on first access.
    ///
    /// # Errors
    ///
    /// Fails if the key cannot be decoded or the row cannot be loaded.
    pub fn current(&mut self) -> CoreResult<Option<&Row>> {
        if self.row.is_none() {
            if let Some(row_id) = self.row_id()? {
                self.row = Some(self.rows.get_row(row_id)?);
            }
        }
        Ok(self.row.as_ref())
    }

    /// Drains the cursor, loading every remaining row.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub fn into_rows(mut self) -> CoreResult<Vec<Row>> {
        let mut rows = Vec::new();
        while self.step()? {
            if let Some(row) = self.current()? {
                rows.push(row.clone());
            }
        }
        Ok(rows)
    }

    fn step(&mut self) -> CoreResult<bool> {
        if self.unread {
            self.unread = false;
            return Ok(true);
        }
        self.advance()
    }

    fn finish(&mut self) {
        self.state = CursorState::Exhausted;
        self.current = None;
        self.search_row = None;
        self.row = None;
    }
}

impl<R: RowSource + ?Sized> Iterator for Cursor<'_, R> {
    type Item = CoreResult<SearchRow>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(true) => self.search_row().map(|r| r.cloned()).transpose(),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
