//! Secondary indexes.
//!
//! A secondary index is a sorted set of composite keys kept in one map of
//! the underlying ordered store. Each key holds the row's values for the
//! index columns, in index order and per-column direction, followed by
//! the row ID as a tie-breaker.
//!
//! Indexes provide:
//! - Uniqueness enforcement through a single ceiling lookup
//! - Forward range scans bounded by an optional upper search row
//! - First/last retrieval that skips NULL leading values
//! - Lifecycle operations (create, rename, truncate, drop) and cost
//!   estimation for the planner
//!
//! Polymorphism is data, not types: uniqueness is a flag on the
//! [`IndexDescriptor`] and direction is a per-column [`SortDirection`].
//!
//! [`SortDirection`]: mvindex_codec::SortDirection

mod cost;
mod cursor;
mod descriptor;
mod key;
mod secondary;
mod unique;

pub use cost::{lookup_cost, range_index_cost, IndexCondition, COST_ROW_OFFSET};
pub use cursor::{Cursor, CursorState, RowSource};
pub use descriptor::{IndexColumn, IndexDescriptor};
pub use key::KeyCodec;
pub use secondary::SecondaryIndex;
