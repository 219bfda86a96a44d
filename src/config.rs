//! Configuration loaded from `xcrud.toml`.
//!
//! ```toml
//! [database]
//! url = "mysql://root@localhost/shop"
//!
//! [builder]
//! upsert_error_code = 5018
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CrudError, CrudResult};

pub const CONFIG_FILE: &str = "xcrud.toml";

/// Error code raised by the upsert clause when a conflicting row would
/// change its `_id`.
pub const DEFAULT_UPSERT_ERROR_CODE: u32 = 5018;

/// Knobs of the insert statement builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    pub upsert_error_code: u32,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            upsert_error_code: DEFAULT_UPSERT_ERROR_CODE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub builder: BuilderOptions,
}

impl Config {
    pub fn from_toml(content: &str) -> CrudResult<Self> {
        toml::from_str(content).map_err(|e| CrudError::Config(e.to_string()))
    }

    /// Read the config at `path`.
    pub fn load(path: &Path) -> CrudResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from an explicit path, `./xcrud.toml` or the user config
    /// directory, in that order. Defaults when none exist.
    pub fn discover(explicit: Option<&Path>) -> CrudResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::candidates().into_iter().find(|p| p.exists()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("xcrud").join("config.toml"));
        }
        paths
    }
}
