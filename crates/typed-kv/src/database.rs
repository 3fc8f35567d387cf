//! Typed database handle
//!
//! A [`Database`] owns at most one live connection. Opening while open
//! closes the previous connection first, and the connection is released
//! when the handle is dropped.

use crate::codec::{Decode, Encode};
use crate::config::Config;
use crate::engine::{Connection, Engine, RedbEngine};
use crate::error::{Error, Result};
use crate::options::{OpenOptions, ReadOptions, WriteOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

struct Live<C> {
    location: PathBuf,
    connection: C,
}

/// Typed handle over a storage engine connection.
///
/// ```no_run
/// use typed_kv::Database;
///
/// let mut db = Database::new();
/// db.open("./data/app.redb")?;
/// db.put("visits", &5u64)?;
/// let visits: u64 = db.get("visits")?;
/// db.close();
/// # Ok::<(), typed_kv::Error>(())
/// ```
pub struct Database<E: Engine = RedbEngine> {
    engine: E,
    config: Config,
    live: Option<Live<E::Connection>>,
}

impl Database<RedbEngine> {
    /// A closed handle using the redb engine and default options.
    pub fn new() -> Self {
        Self::with_engine(RedbEngine::new())
    }
}

impl<E: Engine + Default> Default for Database<E> {
    fn default() -> Self {
        Self::with_engine(E::default())
    }
}

impl<E: Engine> Database<E> {
    pub fn with_engine(engine: E) -> Self {
        Self::with_config(engine, Config::default())
    }

    /// A closed handle whose plain `open`/`get`/`put`/`delete` calls use the
    /// option sets from `config`.
    pub fn with_config(engine: E, config: Config) -> Self {
        Self {
            engine,
            config,
            live: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open `location` with the configured open options.
    pub fn open(&mut self, location: impl AsRef<Path>) -> Result<()> {
        let options = self.config.open.clone();
        self.open_with(location, &options)
    }

    /// Close any live connection, then open `location`.
    ///
    /// On failure the handle is left closed.
    pub fn open_with(&mut self, location: impl AsRef<Path>, options: &OpenOptions) -> Result<()> {
        self.close();

        let location = location.as_ref();
        match self.engine.open(location, options) {
            Ok(connection) => {
                debug!(location = %location.display(), ?options, "database opened");
                self.live = Some(Live {
                    location: location.to_path_buf(),
                    connection,
                });
                Ok(())
            }
            Err(e) => {
                warn!(location = %location.display(), error = %e, "database open failed");
                Err(e.into())
            }
        }
    }

    /// Release the live connection, if any. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(live) = self.live.take() {
            debug!(location = %live.location.display(), "database closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.live.is_some()
    }

    /// Location of the live connection.
    pub fn location(&self) -> Option<&Path> {
        self.live.as_ref().map(|live| live.location.as_path())
    }

    /// The raw engine connection, for untyped access.
    pub fn connection(&self) -> Option<&E::Connection> {
        self.live.as_ref().map(|live| &live.connection)
    }

    fn live_connection(&self) -> Result<&E::Connection> {
        self.connection().ok_or(Error::NotOpen)
    }

    /// Read and decode the value stored under `key`.
    pub fn get<T: Decode>(&self, key: impl AsRef<[u8]>) -> Result<T> {
        self.get_with(key, &self.config.read)
    }

    /// Read and decode the value stored under `key`.
    ///
    /// Engine failures, including a missing key, are returned unchanged.
    /// Bytes that do not decode as `T` yield [`Error::Parse`].
    pub fn get_with<T: Decode>(&self, key: impl AsRef<[u8]>, options: &ReadOptions) -> Result<T> {
        let key = key.as_ref();
        let bytes = self.live_connection()?.get(key, options)?;
        trace!(key_len = key.len(), value_len = bytes.len(), "get");

        T::decode(&bytes).map_err(|e| {
            debug!(key_len = key.len(), error = %e, "stored value failed to decode");
            Error::from(e)
        })
    }

    /// Like [`get_with`](Self::get_with), writing into `out`. `out` is only
    /// modified on success.
    pub fn get_into<T: Decode>(
        &self,
        key: impl AsRef<[u8]>,
        out: &mut T,
        options: &ReadOptions,
    ) -> Result<()> {
        *out = self.get_with(key, options)?;
        Ok(())
    }

    /// Encode `value` and store it under `key`.
    pub fn put<V: Encode + ?Sized>(&self, key: impl AsRef<[u8]>, value: &V) -> Result<()> {
        self.put_with(key, value, &self.config.write)
    }

    /// Encode `value` and store it under `key` in a single engine write.
    pub fn put_with<V: Encode + ?Sized>(
        &self,
        key: impl AsRef<[u8]>,
        value: &V,
        options: &WriteOptions,
    ) -> Result<()> {
        let key = key.as_ref();
        let connection = self.live_connection()?;
        let bytes = value.encode()?;
        trace!(key_len = key.len(), value_len = bytes.len(), sync = options.sync, "put");
        connection.put(key, &bytes, options)?;
        Ok(())
    }

    pub fn delete(&self, key: impl AsRef<[u8]>) -> Result<()> {
        self.delete_with(key, &self.config.write)
    }

    /// Remove `key`. Removing an absent key succeeds.
    pub fn delete_with(&self, key: impl AsRef<[u8]>, options: &WriteOptions) -> Result<()> {
        let key = key.as_ref();
        trace!(key_len = key.len(), sync = options.sync, "delete");
        self.live_connection()?.delete(key, options)?;
        Ok(())
    }
}

impl<E: Engine> Drop for Database<E> {
    fn drop(&mut self) {
        self.close();
    }
}
