//! # mvindex Core
//!
//! Secondary index engine for tables kept in an ordered key-value store.
//!
//! This crate provides:
//! - Composite key construction over typed column values
//! - Unique indexes with configurable NULL handling
//! - Bounded forward range scans with lazy row loading
//! - First/last retrieval that skips NULL leading values
//! - Index lifecycle (create, rename, truncate, drop) and cost estimation
//! - A reference [`Table`] that keeps rows and indexes in step
//!
//! The store itself, its persistence and its isolation guarantees come
//! from an [`mvindex_storage::OrderedStore`] implementation.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod schema;
mod table;
mod types;

pub mod index;

pub use config::{IndexConfig, NullUniqueness};
pub use error::{CoreError, CoreResult};
pub use index::{
    Cursor, CursorState, IndexColumn, IndexCondition, IndexDescriptor, KeyCodec, RowSource,
    SecondaryIndex,
};
pub use schema::{Column, Row, RowLike, SearchRow, DEFAULT_SELECTIVITY};
pub use table::Table;
pub use types::{IndexId, RowId, TableId};
