//! Configuration types.
//!
//! The top-level [`Config`] is deserialized from TOML by the binary. Every
//! section defaults sensibly so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "many_to_many.db";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
}

impl Config {
    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.database.path.as_os_str().is_empty() {
            warnings.push(format!(
                "database.path is empty; {DEFAULT_DB_PATH} will be used"
            ));
        }

        if self.database.pool_size > 16 {
            warnings.push(format!(
                "database.pool_size {} is large for a single SQLite file",
                self.database.pool_size
            ));
        }

        if self.database.busy_timeout_ms == 0 {
            warnings.push(
                "database.busy_timeout_ms is 0; writers fail immediately on a locked database"
                    .into(),
            );
        }

        warnings
    }
}

/// Location and connection settings for the catalog database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the SQLite file.
    pub path: PathBuf,
    /// Maximum number of pooled connections.
    pub pool_size: u32,
    /// How long a connection waits on a locked database.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            pool_size: 4,
            busy_timeout_ms: 5000,
        }
    }
}

impl DatabaseConfig {
    /// Settings for a database at `path`, other fields defaulted.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// The configured path, falling back to [`DEFAULT_DB_PATH`] when empty.
    pub fn effective_path(&self) -> PathBuf {
        if self.path.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_DB_PATH)
        } else {
            self.path.clone()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
