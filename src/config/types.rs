use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::report::MatrixLayout;

use super::defaults::{
    DEFAULT_LOG_FILTER, MAX_LOG_FILES, MAX_TIMEOUT_SECS, MIN_RESPONSE_BYTES, MIN_TIMEOUT_SECS,
    default_base_url, default_log_filter, default_max_log_files, default_max_response_bytes,
    default_timeout_secs, default_write_log_file,
};

/// Settings persisted in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub normalization: NormalizationSettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where and how the prediction backend is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the backend; endpoint paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Overall per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Largest response body accepted from the backend.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl ApiSettings {
    /// Request timeout clamped to the supported range.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
    }

    /// Parse and validate the configured base URL.
    ///
    /// The returned URL always ends with `/` so relative joins keep any path prefix.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let trimmed = self.base_url.trim();
        let mut url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
            value: trimmed.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme {
                value: trimmed.to_string(),
            });
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

/// Controls the leniency of form normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationSettings {
    /// Refuse to send a request when any field had to be replaced by a default.
    #[serde(default)]
    pub reject_invalid_input: bool,
}

/// Display-side interpretation of backend metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Cell order of the backend's 2x2 confusion matrix.
    #[serde(default)]
    pub confusion_layout: MatrixLayout,
}

/// Diagnostics output of the client itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Tracing filter directive, e.g. `info` or `depdash=debug,ureq=warn`.
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Write a per-run log file under `logs/` in addition to stderr.
    #[serde(default = "default_write_log_file")]
    pub write_file: bool,
    /// Number of run logs kept, including the current one.
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            write_file: default_write_log_file(),
            max_files: default_max_log_files(),
        }
    }
}

impl DashboardConfig {
    /// Clamp numeric settings into their supported ranges.
    pub fn normalized(mut self) -> Self {
        self.api.base_url = self.api.base_url.trim().to_string();
        self.api.timeout_secs = self
            .api
            .timeout_secs
            .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        self.api.max_response_bytes = self.api.max_response_bytes.max(MIN_RESPONSE_BYTES);
        self.logging.filter = self.logging.filter.trim().to_string();
        if self.logging.filter.is_empty() {
            self.logging.filter = DEFAULT_LOG_FILTER.to_string();
        }
        self.logging.max_files = self.logging.max_files.clamp(1, MAX_LOG_FILES);
        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("Invalid backend base URL {value:?}: {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("Backend base URL must use http or https: {value}")]
    UnsupportedScheme { value: String },
    #[error(transparent)]
    AppDir(#[from] crate::app_dirs::AppDirError),
}
