//! Ordered map and store trait definitions.

use crate::error::StorageResult;

/// A lazy ascending sequence of keys.
pub type KeyIter<'a> = Box<dyn Iterator<Item = StorageResult<Vec<u8>>> + Send + 'a>;

/// A named, persistent, bytewise-ordered key-value map.
///
/// Keys are compared as unsigned byte strings. mvindex owns all key
/// interpretation; the map only stores and navigates.
///
/// # Invariants
///
/// - every navigation method observes the same total order
/// - once `remove_map` returns, `is_closed` is true and all other
///   operations fail with [`crate::StorageError::Closed`]
/// - maps are `Send + Sync`; concurrency control belongs to the
///   implementation
pub trait OrderedMap: Send + Sync {
    /// Current name of the map.
    fn name(&self) -> String;

    /// Inserts or replaces an entry, returning the previous value.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<Option<Vec<u8>>>;

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Removes an entry, returning its value if it existed.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn remove(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Removes every entry but keeps the map.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn clear(&self) -> StorageResult<()>;

    /// Number of entries.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn size(&self) -> StorageResult<u64>;

    /// Returns true once the map has been removed from its store.
    fn is_closed(&self) -> bool;

    /// Smallest key greater than or equal to `probe`.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn ceiling_key(&self, probe: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Smallest key in the map.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn first_key(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Largest key in the map.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn last_key(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Smallest key strictly greater than `key`.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn higher_key(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Largest key strictly less than `key`.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn lower_key(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Iterates keys in ascending order starting at `from` (inclusive), or
    /// at the first key when `from` is `None`.
    ///
    /// Each call starts a fresh sequence; a sequence cannot be rewound.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed.
    fn key_iter(&self, from: Option<&[u8]>) -> StorageResult<KeyIter<'_>>;

    /// Renames the map within its store.
    ///
    /// # Errors
    ///
    /// Fails if the map is closed or `new_name` is already in use.
    fn rename_map(&self, new_name: &str) -> StorageResult<()>;

    /// Removes the map and all its entries from the store.
    ///
    /// # Errors
    ///
    /// Fails if the map is already closed.
    fn remove_map(&self) -> StorageResult<()>;
}

/// A collection of named ordered maps.
pub trait OrderedStore: Send + Sync {
    /// Handle type for maps in this store.
    type Map: OrderedMap;

    /// Opens the map called `name`, creating it if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the map cannot be opened.
    fn open_map(&self, name: &str) -> StorageResult<Self::Map>;

    /// Returns true if a map called `name` exists.
    fn has_map(&self, name: &str) -> bool;

    /// Names of all maps, sorted.
    fn map_names(&self) -> Vec<String>;
}
