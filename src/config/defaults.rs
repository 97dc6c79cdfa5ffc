pub(super) const MIN_TIMEOUT_SECS: u64 = 1;
pub(super) const MAX_TIMEOUT_SECS: u64 = 120;
pub(super) const MIN_RESPONSE_BYTES: usize = 1024;
pub(super) const MAX_LOG_FILES: usize = 100;

/// Tracing filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Backend address used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

pub(super) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(super) fn default_timeout_secs() -> u64 {
    20
}

pub(super) fn default_max_response_bytes() -> usize {
    1024 * 1024
}

pub(super) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

pub(super) fn default_max_log_files() -> usize {
    10
}

pub(super) fn default_write_log_file() -> bool {
    true
}
