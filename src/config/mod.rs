//! Client configuration persisted as TOML under the application directory.

mod defaults;
mod io;
mod types;

pub use defaults::{DEFAULT_BASE_URL, DEFAULT_LOG_FILTER};
pub use io::{BASE_URL_ENV, CONFIG_FILE_NAME, config_path, load_from, load_or_default, save, save_to_path};
pub use types::{
    ApiSettings, ConfigError, DashboardConfig, LoggingSettings, NormalizationSettings,
    ReportSettings,
};
