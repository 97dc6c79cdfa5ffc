use std::path::{Path, PathBuf};

use serde::de::Error as SerdeDeError;

use crate::app_dirs;

use super::types::{ConfigError, DashboardConfig};

/// Default filename used to store the client configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable that replaces the configured backend base URL.
pub const BASE_URL_ENV: &str = "DEPDASH_API_BASE_URL";

/// Path of `config.toml` in the application directory, which is created if missing.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::root_file(CONFIG_FILE_NAME)?)
}

/// Load configuration from disk, returning defaults if missing.
///
/// `DEPDASH_API_BASE_URL` wins over the file when set and non-empty.
pub fn load_or_default() -> Result<DashboardConfig, ConfigError> {
    let path = config_path()?;
    let mut config = load_from(&path)?;
    apply_env_overrides(&mut config, std::env::var(BASE_URL_ENV).ok());
    config.api.parsed_base_url()?;
    Ok(config)
}

/// Load configuration from a specific file; a missing file yields defaults.
pub fn load_from(path: &Path) -> Result<DashboardConfig, ConfigError> {
    if !path.exists() {
        return Ok(DashboardConfig::default());
    }
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source: SerdeDeError::custom(source),
    })?;
    toml::from_str(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
        .map(DashboardConfig::normalized)
}

/// Persist configuration to the default location, overwriting previous contents.
pub fn save(config: &DashboardConfig) -> Result<(), ConfigError> {
    let path = config_path()?;
    save_to_path(config, &path)
}

/// Save configuration to a specific path, creating parent directories as needed.
pub fn save_to_path(config: &DashboardConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(config: &mut DashboardConfig, base_url: Option<String>) {
    if let Some(value) = base_url.map(|value| value.trim().to_string())
        && !value.is_empty()
    {
        tracing::debug!("Using backend base URL from {BASE_URL_ENV}: {value}");
        config.api.base_url = value;
    }
}
