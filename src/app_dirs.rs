//! Location of the `.depdash` directory that holds `config.toml`, the optional
//! `features.toml` catalog and the `logs/` folder.
//!
//! The directory sits under a base chosen in this order: a test override,
//! a non-blank `DEPDASH_CONFIG_HOME`, then the platform config directory.

use std::path::PathBuf;
#[cfg(test)]
use std::sync::{LazyLock, Mutex};

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory created under the chosen base.
pub const APP_DIR_NAME: &str = ".depdash";
/// Environment variable that relocates the application directory's base.
pub const CONFIG_HOME_ENV: &str = "DEPDASH_CONFIG_HOME";
const LOGS_DIR_NAME: &str = "logs";

/// Where the base directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseSource {
    #[cfg(test)]
    Override,
    Environment,
    Platform,
}

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No config directory could be determined; set {CONFIG_HOME_ENV}")]
    NoBaseDir,
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Return the `.depdash` directory, creating it if needed.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let (source, base) = resolve_base().ok_or(AppDirError::NoBaseDir)?;
    let root = base.join(APP_DIR_NAME);
    tracing::trace!("Application directory {} ({source:?})", root.display());
    create(root)
}

/// Path of a file directly inside the `.depdash` directory.
///
/// The directory is created; the file itself is not.
pub fn root_file(name: &str) -> Result<PathBuf, AppDirError> {
    Ok(app_root_dir()?.join(name))
}

/// Return `.depdash/logs`, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    create(app_root_dir()?.join(LOGS_DIR_NAME))
}

fn create(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}

fn resolve_base() -> Option<(BaseSource, PathBuf)> {
    if let Some(found) = test_override() {
        return Some(found);
    }
    choose_base(
        std::env::var_os(CONFIG_HOME_ENV).map(PathBuf::from),
        BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    )
}

fn choose_base(env: Option<PathBuf>, platform: Option<PathBuf>) -> Option<(BaseSource, PathBuf)> {
    match env {
        Some(path) if !path.as_os_str().is_empty() => Some((BaseSource::Environment, path)),
        _ => platform.map(|path| (BaseSource::Platform, path)),
    }
}

#[cfg(not(test))]
fn test_override() -> Option<(BaseSource, PathBuf)> {
    None
}

#[cfg(test)]
fn test_override() -> Option<(BaseSource, PathBuf)> {
    let path = BASE_OVERRIDE.lock().unwrap_or_else(|err| err.into_inner()).clone()?;
    Some((BaseSource::Override, path))
}

#[cfg(test)]
static BASE_OVERRIDE: LazyLock<Mutex<Option<PathBuf>>> = LazyLock::new(|| Mutex::new(None));

/// Points the application directory at a scratch base for the guard's lifetime.
///
/// Holding the guard also serializes the unit tests that touch app files.
#[cfg(test)]
pub(crate) struct OverrideGuard {
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
impl OverrideGuard {
    pub(crate) fn set(path: PathBuf) -> Self {
        static LOCK: Mutex<()> = Mutex::new(());
        let lock = LOCK.lock().unwrap_or_else(|err| err.into_inner());
        *BASE_OVERRIDE.lock().unwrap_or_else(|err| err.into_inner()) = Some(path);
        Self { _lock: lock }
    }
}

#[cfg(test)]
impl Drop for OverrideGuard {
    fn drop(&mut self) {
        *BASE_OVERRIDE.lock().unwrap_or_else(|err| err.into_inner()) = None;
    }
}
