//! typed-kv - Typed values over an embedded key-value store
//!
//! Open a named store, then read and write typed values under string or byte
//! keys. Each value type has a fixed stored form (see [`codec`]); the reader
//! names the type to decode as, nothing is tagged on disk.
//!
//! # Usage
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use typed_kv::{Database, Record};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Record for User {}
//!
//! let mut db = Database::new();
//! db.open("./data.redb")?;
//!
//! db.put("greeting", "hello")?;           // stored as `hello`
//! db.put("count", &5)?;                   // stored as `5`
//! db.put("ratio", &1.256)?;               // stored as `1.256000`
//! db.put("user:1", &User { name: "Alice".into(), age: 30 })?;
//!
//! let count: i32 = db.get("count")?;
//! let user: User = db.get("user:1")?;
//! db.delete("greeting")?;
//! db.close();
//! # Ok::<(), typed_kv::Error>(())
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod options;

mod database;
mod error;

pub use codec::{Decode, Encode, Json, Record};
pub use config::Config;
pub use database::Database;
pub use engine::{Connection, Engine, MemoryEngine, RedbEngine};
pub use error::{EncodeError, EngineError, Error, ParseError, Result};
pub use options::{OpenOptions, ReadOptions, WriteOptions};
