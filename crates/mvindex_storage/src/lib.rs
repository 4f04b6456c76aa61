//! # mvindex Storage
//!
//! Ordered key-value store abstraction for mvindex.
//!
//! This crate defines the store that secondary indexes and row storage are
//! built on. Maps are **opaque ordered byte maps** - they compare keys
//! bytewise and do not interpret them.
//!
//! ## Design Principles
//!
//! - A store holds named maps; maps can be renamed and removed
//! - Maps provide ordered navigation (ceiling, higher, lower, first, last)
//!   and lazy ascending key iteration
//! - Must be `Send + Sync` for concurrent access
//! - mvindex owns all key encoding
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral tables
//!
//! ## Example
//!
//! ```rust
//! use mvindex_storage::{InMemoryStore, OrderedMap, OrderedStore};
//!
//! let store = InMemoryStore::new();
//! let map = store.open_map("people_1").unwrap();
//! map.put(b"b".to_vec(), Vec::new()).unwrap();
//! map.put(b"d".to_vec(), Vec::new()).unwrap();
//! assert_eq!(map.ceiling_key(b"c").unwrap(), Some(b"d".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod map;
mod memory;

pub use error::{StorageError, StorageResult};
pub use map::{KeyIter, OrderedMap, OrderedStore};
pub use memory::{InMemoryMap, InMemoryStore};
