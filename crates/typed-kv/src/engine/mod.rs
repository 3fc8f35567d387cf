//! Storage engine seam
//!
//! The typed layer only needs point reads, writes and deletes on raw bytes.
//! An [`Engine`] opens a [`Connection`] to one location; dropping the
//! connection closes it.

mod memory;
mod redb;

pub use memory::{MemoryConnection, MemoryEngine};
pub use self::redb::{RedbConnection, RedbEngine};

use crate::error::EngineError;
use crate::options::{OpenOptions, ReadOptions, WriteOptions};
use std::path::Path;

pub type EngineResult<T> = Result<T, EngineError>;

/// Opens connections to stores identified by a path.
pub trait Engine: Send + Sync {
    type Connection: Connection;

    /// Open the store at `location`. A location is held by at most one live
    /// connection; opening it again before the first is dropped fails with
    /// [`EngineError::Busy`].
    fn open(&self, location: &Path, options: &OpenOptions) -> EngineResult<Self::Connection>;
}

/// A live connection to one store.
pub trait Connection: Send + Sync {
    /// Read the value for `key`, or [`EngineError::NotFound`] if absent.
    fn get(&self, key: &[u8], options: &ReadOptions) -> EngineResult<Vec<u8>>;

    /// Set the value for `key`, replacing any existing one.
    fn put(&self, key: &[u8], value: &[u8], options: &WriteOptions) -> EngineResult<()>;

    /// Remove `key`. Removing an absent key succeeds.
    fn delete(&self, key: &[u8], options: &WriteOptions) -> EngineResult<()>;
}

/// Apply the `create_if_missing` / `error_if_exists` rules shared by all engines.
fn check_existence(location: &Path, exists: bool, options: &OpenOptions) -> EngineResult<()> {
    if !exists && !options.create_if_missing {
        return Err(EngineError::InvalidArgument(format!(
            "{}: does not exist (create_if_missing is false)",
            location.display()
        )));
    }
    if exists && options.error_if_exists {
        return Err(EngineError::InvalidArgument(format!(
            "{}: exists (error_if_exists is true)",
            location.display()
        )));
    }
    Ok(())
}
