//! Client library for the depression-risk prediction dashboard.
/// Prediction backend client and wire types.
pub mod api;
/// Application directory resolution.
pub mod app_dirs;
/// TOML configuration.
pub mod config;
/// Feature definitions and form normalization.
pub mod features;
pub(crate) mod http_client;
/// Tracing setup.
pub mod logging;
/// Display helpers for metrics and predictions.
pub mod report;
/// Caller-owned prediction form state.
pub mod session;
