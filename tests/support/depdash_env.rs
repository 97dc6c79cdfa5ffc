use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_HOME: &str = "DEPDASH_CONFIG_HOME";
const BASE_URL: &str = "DEPDASH_API_BASE_URL";

/// Points the app directory and backend URL at test-owned values until dropped.
pub struct DepdashEnvGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl DepdashEnvGuard {
    pub fn set(config_home: PathBuf, base_url: Option<&str>) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = vec![
            (CONFIG_HOME, std::env::var(CONFIG_HOME).ok()),
            (BASE_URL, std::env::var(BASE_URL).ok()),
        ];
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var(CONFIG_HOME, config_home);
            match base_url {
                Some(url) => std::env::set_var(BASE_URL, url),
                None => std::env::remove_var(BASE_URL),
            }
        }
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for DepdashEnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
