//! Tracing setup driven by the `[logging]` section of `config.toml`.
//!
//! Events go to stderr and, unless `write_file` is off, to one file per run
//! under `logs/` named `depdash_<local timestamp>.log`. Stdout is left to
//! command output. Old run logs beyond `max_files` are removed at startup.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{InitError, RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};
use crate::config::{DEFAULT_LOG_FILTER, LoggingSettings};

const RUN_LOG_PREFIX: &str = "depdash_";
const RUN_LOG_SUFFIX: &str = "log";
const FILE_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
const LINE_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Set once the global subscriber is installed; holds the file writer's guard.
static INSTALLED: OnceLock<Option<WorkerGuard>> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error(transparent)]
    AppDir(#[from] AppDirError),
    #[error("Failed to format run log timestamp: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error("Failed to open run log in {dir}: {source}")]
    OpenFile { dir: PathBuf, source: InitError },
    #[error("Failed to list run logs in {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove old run log {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber described by `settings`.
///
/// Returns the run log path when file output is enabled. Later calls do
/// nothing and return `None`. A parseable `RUST_LOG` wins over `settings.filter`.
pub fn init(settings: &LoggingSettings) -> Result<Option<PathBuf>, LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(None);
    }
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, rejected) = resolve_filter(env.as_deref(), &settings.filter);
    let timer = line_timer();

    let (file_layer, guard, run_log) = if settings.write_file {
        let dir = app_dirs::logs_dir()?;
        let (appender, path) = open_run_log(&dir, now_local_or_utc())?;
        let removed = prune_run_logs(&dir, settings.max_files)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_ansi(false)
            .with_timer(timer.clone())
            .with_writer(writer);
        (Some(layer), Some(guard), Some((path, removed)))
    } else {
        (None, None, None)
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_timer(timer).with_writer(std::io::stderr))
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INSTALLED.set(guard);

    if let Some(rejected) = rejected {
        tracing::warn!("Ignoring unparseable log filter {rejected:?}; using {DEFAULT_LOG_FILTER}");
    }
    match run_log {
        Some((path, removed)) => {
            tracing::debug!("Run log at {} ({removed} old logs removed)", path.display());
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

/// Pick the active filter: a parseable `RUST_LOG`, else the configured
/// directive, else the default. The second value is a rejected configured
/// directive, if any.
fn resolve_filter(env: Option<&str>, configured: &str) -> (EnvFilter, Option<String>) {
    if let Some(directives) = env.map(str::trim).filter(|value| !value.is_empty())
        && let Ok(filter) = EnvFilter::try_new(directives)
    {
        return (filter, None);
    }
    match EnvFilter::try_new(configured) {
        Ok(filter) => (filter, None),
        Err(_) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(configured.to_string())),
    }
}

fn run_log_stem(now: OffsetDateTime) -> Result<String, LoggingError> {
    Ok(format!("{RUN_LOG_PREFIX}{}", now.format(FILE_STAMP)?))
}

/// Create this run's log file and an appender writing to it.
fn open_run_log(
    dir: &Path,
    now: OffsetDateTime,
) -> Result<(RollingFileAppender, PathBuf), LoggingError> {
    let stem = run_log_stem(now)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(stem.as_str())
        .filename_suffix(RUN_LOG_SUFFIX)
        .build(dir)
        .map_err(|source| LoggingError::OpenFile {
            dir: dir.to_path_buf(),
            source,
        })?;
    Ok((appender, dir.join(format!("{stem}.{RUN_LOG_SUFFIX}"))))
}

/// Run log names that fall outside the newest `keep`, oldest first.
///
/// Timestamped names sort chronologically, so no file metadata is needed.
fn stale_run_logs(names: impl IntoIterator<Item = String>, keep: usize) -> Vec<String> {
    let mut logs: Vec<String> = names
        .into_iter()
        .filter(|name| {
            name.starts_with(RUN_LOG_PREFIX)
                && Path::new(name).extension().is_some_and(|ext| ext == RUN_LOG_SUFFIX)
        })
        .collect();
    logs.sort();
    let excess = logs.len().saturating_sub(keep);
    logs.truncate(excess);
    logs
}

fn prune_run_logs(dir: &Path, keep: usize) -> Result<usize, LoggingError> {
    let names = fs::read_dir(dir)
        .map_err(|source| LoggingError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok());
    let stale = stale_run_logs(names, keep);
    for name in &stale {
        let path = dir.join(name);
        fs::remove_file(&path).map_err(|source| LoggingError::RemoveFile { path, source })?;
    }
    Ok(stale.len())
}

fn line_timer() -> fmt::time::OffsetTime<BorrowedFormatItem<'static>> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, LINE_STAMP.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
