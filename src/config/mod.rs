pub use gamecrit_common::config::{Config, DatabaseConfig, DEFAULT_DB_PATH};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Locations searched when no config file is given.
const DEFAULT_PATHS: &[&str] = &["./gamecrit.toml", "~/.config/gamecrit/config.toml"];

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML file.
///
/// A relative `database.path` is resolved against the directory holding the
/// config file, after tilde expansion.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.database.path = resolve_db_path(&config.database.path, base);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn resolve_db_path(path: &Path, base: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return PathBuf::new();
    }
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if expanded.is_relative() {
        base.join(expanded)
    } else {
        expanded
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.database.pool_size == 0 {
        anyhow::bail!("database.pool_size must be at least 1");
    }

    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    Ok(())
}
