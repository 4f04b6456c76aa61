//! In-memory ordered store.

use crate::error::{StorageError, StorageResult};
use crate::map::{KeyIter, OrderedMap, OrderedStore};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Entries = BTreeMap<Vec<u8>, Vec<u8>>;
type Directory = Arc<RwLock<HashMap<String, Arc<MapState>>>>;

#[derive(Debug, Default)]
struct MapState {
    name: RwLock<String>,
    entries: RwLock<Entries>,
    closed: AtomicBool,
}

impl MapState {
    fn named(name: &str) -> Self {
        Self {
            name: RwLock::new(name.to_string()),
            ..Self::default()
        }
    }

    fn check_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed {
                name: self.name.read().clone(),
            });
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Entries) -> T) -> StorageResult<T> {
        self.check_open()?;
        Ok(f(&self.entries.read()))
    }
}

/// An in-memory store of named ordered maps.
///
/// This store keeps everything in memory and is suitable for:
/// - Unit and integration tests
/// - Ephemeral tables that don't need persistence
///
/// # Thread Safety
///
/// The store and its map handles are cheap to clone and can be shared
/// across threads. Each map is guarded by its own lock; renames and
/// removals take the directory lock, so a map is always reachable under
/// exactly one name.
///
/// # Example
///
/// ```rust
/// use mvindex_storage::{InMemoryStore, OrderedMap, OrderedStore};
///
/// let store = InMemoryStore::new();
/// let map = store.open_map("users_1").unwrap();
/// map.put(b"k".to_vec(), Vec::new()).unwrap();
/// assert_eq!(map.size().unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    maps: Directory,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderedStore for InMemoryStore {
    type Map = InMemoryMap;

    fn open_map(&self, name: &str) -> StorageResult<InMemoryMap> {
        let mut maps = self.maps.write();
        let state = maps
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MapState::named(name)))
            .clone();
        Ok(InMemoryMap {
            state,
            directory: Arc::clone(&self.maps),
        })
    }

    fn has_map(&self, name: &str) -> bool {
        self.maps.read().contains_key(name)
    }

    fn map_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.maps.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Handle to one map of an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryMap {
    state: Arc<MapState>,
    directory: Directory,
}

impl OrderedMap for InMemoryMap {
    fn name(&self) -> String {
        self.state.name.read().clone()
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<Option<Vec<u8>>> {
        self.state.check_open()?;
        Ok(self.state.entries.write().insert(key, value))
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.state.read(|entries| entries.get(key).cloned())
    }

    fn remove(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.state.check_open()?;
        Ok(self.state.entries.write().remove(key))
    }

    fn clear(&self) -> StorageResult<()> {
        self.state.check_open()?;
        self.state.entries.write().clear();
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        self.state.read(|entries| entries.len() as u64)
    }

    fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }

    fn ceiling_key(&self, probe: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.state.read(|entries| {
            entries
                .range::<[u8], _>((Bound::Included(probe), Bound::Unbounded))
                .next()
                .map(|(k, _)| k.clone())
        })
    }

    fn first_key(&self) -> StorageResult<Option<Vec<u8>>> {
        self.state
            .read(|entries| entries.first_key_value().map(|(k, _)| k.clone()))
    }

    fn last_key(&self) -> StorageResult<Option<Vec<u8>>> {
        self.state
            .read(|entries| entries.last_key_value().map(|(k, _)| k.clone()))
    }

    fn higher_key(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.state.read(|entries| {
            entries
                .range::<[u8], _>((Bound::Excluded(key), Bound::Unbounded))
                .next()
                .map(|(k, _)| k.clone())
        })
    }

    fn lower_key(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.state.read(|entries| {
            entries
                .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(key)))
                .next_back()
                .map(|(k, _)| k.clone())
        })
    }

    fn key_iter(&self, from: Option<&[u8]>) -> StorageResult<KeyIter<'_>> {
        self.state.check_open()?;
        let start = match from {
            Some(key) => Bound::Included(key.to_vec()),
            None => Bound::Unbounded,
        };
        Ok(Box::new(InMemoryKeyIter {
            state: Arc::clone(&self.state),
            start,
            done: false,
        }))
    }

    fn rename_map(&self, new_name: &str) -> StorageResult<()> {
        let mut maps = self.directory.write();
        self.state.check_open()?;
        let mut name = self.state.name.write();
        if *name == new_name {
            return Ok(());
        }
        if maps.contains_key(new_name) {
            return Err(StorageError::MapExists {
                name: new_name.to_string(),
            });
        }
        if let Some(state) = maps.remove(name.as_str()) {
            maps.insert(new_name.to_string(), state);
        }
        *name = new_name.to_string();
        Ok(())
    }

    fn remove_map(&self) -> StorageResult<()> {
        let mut maps = self.directory.write();
        self.state.check_open()?;
        maps.remove(self.state.name.read().as_str());
        self.state.closed.store(true, Ordering::Release);
        self.state.entries.write().clear();
        Ok(())
    }
}

/// Lazy key iterator that re-seeks past the last yielded key on each step.
struct InMemoryKeyIter {
    state: Arc<MapState>,
    start: Bound<Vec<u8>>,
    done: bool,
}

impl Iterator for InMemoryKeyIter {
    type Item = StorageResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let bounds = match &self.start {
            Bound::Included(k) => (Bound::Included(k.as_slice()), Bound::Unbounded),
            Bound::Excluded(k) => (Bound::Excluded(k.as_slice()), Bound::Unbounded),
            Bound::Unbounded => (Bound::Unbounded, Bound::Unbounded),
        };
        let next = self.state.read(|entries| {
            entries
                .range::<[u8], _>(bounds)
                .next()
                .map(|(k, _)| k.clone())
        });
        match next {
            Ok(Some(key)) => {
                self.start = Bound::Excluded(key.clone());
                Some(Ok(key))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
