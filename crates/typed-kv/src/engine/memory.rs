//! In-memory engine
//!
//! Stores live in the engine value, keyed by location, so closing and
//! reopening a location sees earlier writes for as long as the engine (or a
//! clone of it) is alive.

use super::{Connection, Engine, EngineResult, check_existence};
use crate::error::EngineError;
use crate::options::{OpenOptions, ReadOptions, WriteOptions};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

type Store = Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>;

#[derive(Debug, Default)]
struct Slot {
    data: Store,
    locked: bool,
}

type Registry = Arc<Mutex<HashMap<PathBuf, Slot>>>;

/// Process-local engine, mainly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    stores: Registry,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of locations currently held by a live connection.
    pub fn live_connections(&self) -> usize {
        self.stores.lock().values().filter(|slot| slot.locked).count()
    }

    /// Whether a store was ever created at `location`.
    pub fn contains(&self, location: &Path) -> bool {
        self.stores.lock().contains_key(location)
    }
}

impl Engine for MemoryEngine {
    type Connection = MemoryConnection;

    fn open(&self, location: &Path, options: &OpenOptions) -> EngineResult<MemoryConnection> {
        let mut stores = self.stores.lock();
        check_existence(location, stores.contains_key(location), options)?;

        let slot = stores.entry(location.to_path_buf()).or_default();
        if slot.locked {
            return Err(EngineError::Busy(format!(
                "{}: already open",
                location.display()
            )));
        }
        slot.locked = true;

        Ok(MemoryConnection {
            location: location.to_path_buf(),
            data: Arc::clone(&slot.data),
            stores: Arc::clone(&self.stores),
        })
    }
}

/// A live connection to one in-memory store. Dropping it releases the location.
#[derive(Debug)]
pub struct MemoryConnection {
    location: PathBuf,
    data: Store,
    stores: Registry,
}

impl MemoryConnection {
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        if let Some(slot) = self.stores.lock().get_mut(&self.location) {
            slot.locked = false;
        }
    }
}

impl Connection for MemoryConnection {
    fn get(&self, key: &[u8], _options: &ReadOptions) -> EngineResult<Vec<u8>> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or(EngineError::NotFound)
    }

    fn put(&self, key: &[u8], value: &[u8], _options: &WriteOptions) -> EngineResult<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8], _options: &WriteOptions) -> EngineResult<()> {
        self.data.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_basic() {
        let engine = MemoryEngine::new();
        let conn = engine
            .open(Path::new("mem"), &OpenOptions::default())
            .unwrap();
        let write = WriteOptions::default();

        assert!(conn.is_empty());
        conn.put(b"a", b"1", &write).unwrap();
        conn.put(b"b", b"2", &write).unwrap();
        assert_eq!(conn.len(), 2);
        assert_eq!(conn.get(b"a", &ReadOptions::default()).unwrap(), b"1");

        conn.delete(b"a", &write).unwrap();
        assert!(matches!(
            conn.get(b"a", &ReadOptions::default()),
            Err(EngineError::NotFound)
        ));
    }

    #[test]
    fn test_memory_exclusive_location() {
        let engine = MemoryEngine::new();
        let location = Path::new("mem");

        let first = engine.open(location, &OpenOptions::default()).unwrap();
        assert_eq!(engine.live_connections(), 1);
        assert!(matches!(
            engine.open(location, &OpenOptions::default()),
            Err(EngineError::Busy(_))
        ));

        // Another location is independent
        let other = engine
            .open(Path::new("other"), &OpenOptions::default())
            .unwrap();
        assert_eq!(engine.live_connections(), 2);

        drop(first);
        drop(other);
        assert_eq!(engine.live_connections(), 0);
        engine.open(location, &OpenOptions::default()).unwrap();
    }

    #[test]
    fn test_memory_data_survives_reopen() {
        let engine = MemoryEngine::new();
        let location = Path::new("mem");
        {
            let conn = engine.open(location, &OpenOptions::default()).unwrap();
            conn.put(b"k", b"v", &WriteOptions::default()).unwrap();
        }

        let conn = engine.clone().open(location, &OpenOptions::default()).unwrap();
        assert_eq!(conn.get(b"k", &ReadOptions::default()).unwrap(), b"v");
    }

    #[test]
    fn test_memory_existence_rules() {
        let engine = MemoryEngine::new();
        let location = Path::new("mem");
        let strict = OpenOptions {
            create_if_missing: false,
            ..OpenOptions::default()
        };

        assert!(matches!(
            engine.open(location, &strict),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(!engine.contains(location));

        drop(engine.open(location, &OpenOptions::default()).unwrap());
        assert!(engine.contains(location));
        engine.open(location, &strict).unwrap();
    }
}
