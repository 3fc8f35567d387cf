//! Engine backed by redb

use super::{Connection, Engine, EngineResult, check_existence};
use crate::error::EngineError;
use crate::options::{OpenOptions, ReadOptions, WriteOptions};
use redb::{Builder, Database, Durability, TableDefinition};
use std::fmt;
use std::path::{Path, PathBuf};

// Table definition for all keys of a store
const TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("kv");

/// Map any redb error onto the engine status codes
fn storage_error(err: impl Into<redb::Error>) -> EngineError {
    match err.into() {
        redb::Error::Io(e) => EngineError::Io(e),
        redb::Error::Corrupted(msg) => EngineError::Corruption(msg),
        redb::Error::DatabaseAlreadyOpen => EngineError::Busy("database already open".into()),
        other => EngineError::Other(other.to_string()),
    }
}

fn durability(options: &WriteOptions) -> Durability {
    if options.sync {
        Durability::Immediate
    } else {
        Durability::Eventual
    }
}

/// Opens single-file redb stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedbEngine;

impl RedbEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for RedbEngine {
    type Connection = RedbConnection;

    fn open(&self, location: &Path, options: &OpenOptions) -> EngineResult<RedbConnection> {
        check_existence(location, location.exists(), options)?;

        if options.create_if_missing {
            if let Some(parent) = location.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let mut builder = Builder::new();
        if let Some(size) = options.cache_size {
            builder.set_cache_size(size);
        }
        let mut db = builder.create(location).map_err(storage_error)?;

        // Initialize the table
        {
            let write_txn = db.begin_write().map_err(storage_error)?;
            write_txn.open_table(TABLE).map_err(storage_error)?;
            write_txn.commit().map_err(storage_error)?;
        }

        if !options.reuse_logs {
            let compacted = db.compact().map_err(storage_error)?;
            tracing::debug!(location = %location.display(), compacted, "rewrote store on open");
        }

        Ok(RedbConnection {
            db,
            location: location.to_path_buf(),
        })
    }
}

/// An open redb store. The file lock is released on drop.
pub struct RedbConnection {
    db: Database,
    location: PathBuf,
}

impl RedbConnection {
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// The underlying redb database, for access the typed layer does not cover.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl fmt::Debug for RedbConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedbConnection")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl Connection for RedbConnection {
    fn get(&self, key: &[u8], _options: &ReadOptions) -> EngineResult<Vec<u8>> {
        let read_txn = self.db.begin_read().map_err(storage_error)?;
        let table = read_txn.open_table(TABLE).map_err(storage_error)?;

        let guard = table.get(key).map_err(storage_error)?;
        guard
            .map(|value| value.value().to_vec())
            .ok_or(EngineError::NotFound)
    }

    fn put(&self, key: &[u8], value: &[u8], options: &WriteOptions) -> EngineResult<()> {
        let mut write_txn = self.db.begin_write().map_err(storage_error)?;
        write_txn.set_durability(durability(options));
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage_error)?;
            table.insert(key, value).map_err(storage_error)?;
        }
        write_txn.commit().map_err(storage_error)
    }

    fn delete(&self, key: &[u8], options: &WriteOptions) -> EngineResult<()> {
        let mut write_txn = self.db.begin_write().map_err(storage_error)?;
        write_txn.set_durability(durability(options));
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage_error)?;
            table.remove(key).map_err(storage_error)?;
        }
        write_txn.commit().map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open(dir: &TempDir, options: &OpenOptions) -> EngineResult<RedbConnection> {
        RedbEngine::new().open(&dir.path().join("store.redb"), options)
    }

    #[test]
    fn test_redb_basic() {
        let dir = TempDir::new().unwrap();
        let conn = open(&dir, &OpenOptions::default()).unwrap();
        let write = WriteOptions::default();

        conn.put(b"key1", b"value1", &write).unwrap();
        assert_eq!(conn.get(b"key1", &ReadOptions::default()).unwrap(), b"value1");

        conn.put(b"key1", b"value2", &write).unwrap();
        assert_eq!(conn.get(b"key1", &ReadOptions::default()).unwrap(), b"value2");

        conn.delete(b"key1", &write).unwrap();
        assert!(matches!(
            conn.get(b"key1", &ReadOptions::default()),
            Err(EngineError::NotFound)
        ));

        // Deleting again is not an error
        conn.delete(b"key1", &write).unwrap();
    }

    #[test]
    fn test_redb_raw_database_access() {
        let dir = TempDir::new().unwrap();
        let conn = open(&dir, &OpenOptions::default()).unwrap();
        conn.put(b"raw", b"bytes", &WriteOptions::default()).unwrap();

        let read_txn = conn.database().begin_read().unwrap();
        let table = read_txn.open_table(TABLE).unwrap();
        let guard = table.get(b"raw".as_slice()).unwrap().unwrap();
        assert_eq!(guard.value(), b"bytes");
    }

    #[test]
    fn test_redb_eventual_writes() {
        let dir = TempDir::new().unwrap();
        let conn = open(&dir, &OpenOptions::default()).unwrap();

        conn.put(b"k", b"v", &WriteOptions { sync: false }).unwrap();
        assert_eq!(conn.get(b"k", &ReadOptions::default()).unwrap(), b"v");
    }

    #[test]
    fn test_redb_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let location = dir.path().join("nested/deeper/store.redb");

        let conn = RedbEngine::new()
            .open(&location, &OpenOptions::default())
            .unwrap();
        assert_eq!(conn.location(), location);
        assert!(location.exists());
    }

    #[test]
    fn test_redb_create_if_missing_false() {
        let dir = TempDir::new().unwrap();
        let options = OpenOptions {
            create_if_missing: false,
            ..OpenOptions::default()
        };

        let err = open(&dir, &options).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        assert!(!dir.path().join("store.redb").exists());
    }

    #[test]
    fn test_redb_error_if_exists() {
        let dir = TempDir::new().unwrap();
        drop(open(&dir, &OpenOptions::default()).unwrap());

        let options = OpenOptions {
            error_if_exists: true,
            ..OpenOptions::default()
        };
        let err = open(&dir, &options).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn test_redb_compacts_without_reuse() {
        let dir = TempDir::new().unwrap();
        {
            let conn = open(&dir, &OpenOptions::default()).unwrap();
            conn.put(b"kept", b"yes", &WriteOptions::default()).unwrap();
        }

        let options = OpenOptions {
            reuse_logs: false,
            cache_size: Some(1 << 20),
            ..OpenOptions::default()
        };
        let conn = open(&dir, &options).unwrap();
        assert_eq!(conn.get(b"kept", &ReadOptions::default()).unwrap(), b"yes");
    }
}
