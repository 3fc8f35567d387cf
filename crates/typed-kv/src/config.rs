//! TOML configuration for database handles.
//!
//! ```toml
//! [open]
//! create_if_missing = true
//! cache_size = 16777216
//!
//! [write]
//! sync = false
//! ```

use crate::error::{Error, Result};
use crate::options::{OpenOptions, ReadOptions, WriteOptions};
use serde::Deserialize;
use std::path::Path;

/// Default option sets used by a handle's `open`, `get`, `put` and `delete`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub open: OpenOptions,
    pub read: ReadOptions,
    pub write: WriteOptions,
}

impl Config {
    /// Parse configuration from TOML text. Missing sections keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read '{}': {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse '{}': {}", path.display(), e)))
    }

    /// Load from `path` if given, falling back to defaults when the file is
    /// absent or invalid.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path.exists() => match Self::load(path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(error = %e, "using default database config");
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.open.create_if_missing);
        assert!(config.open.reuse_logs);
        assert!(config.write.sync);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[open]
create_if_missing = false
cache_size = 1048576

[write]
sync = false
"#;
        let config = Config::from_toml_str(toml).unwrap();
        assert!(!config.open.create_if_missing);
        assert!(config.open.reuse_logs);
        assert_eq!(config.open.cache_size, Some(1048576));
        assert!(!config.write.sync);
    }

    #[test]
    fn test_parse_empty_config() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_invalid_config() {
        let err = Config::from_toml_str("[write]\nsync = \"yes\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_or_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[open]\nerror_if_exists = true").unwrap();

        let config = Config::load_or_default(Some(file.path()));
        assert!(config.open.error_if_exists);

        let missing = file.path().with_extension("missing");
        assert_eq!(Config::load_or_default(Some(&missing)), Config::default());
        assert_eq!(Config::load_or_default(None), Config::default());
    }
}
