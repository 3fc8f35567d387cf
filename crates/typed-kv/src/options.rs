//! Per-call engine options

use serde::Deserialize;

/// Options used when opening a store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    /// Create the store if it does not exist yet
    pub create_if_missing: bool,

    /// Fail if the store already exists
    pub error_if_exists: bool,

    /// Reuse the existing store file as is. When false, the store is
    /// rewritten (compacted) once after opening.
    pub reuse_logs: bool,

    /// Page cache size in bytes; `None` keeps the engine default
    pub cache_size: Option<usize>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            error_if_exists: false,
            reuse_logs: true,
            cache_size: None,
        }
    }
}

/// Options used for point reads. Reads use the engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReadOptions {}

/// Options used for puts and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Flush the write durably before returning
    pub sync: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { sync: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let open = OpenOptions::default();
        assert!(open.create_if_missing);
        assert!(open.reuse_logs);
        assert!(!open.error_if_exists);
        assert_eq!(open.cache_size, None);

        assert!(WriteOptions::default().sync);
    }
}
