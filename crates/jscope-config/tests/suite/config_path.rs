use std::ffi::OsString;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use jscope_config::JSCOPE_CONFIG_ENV_VAR;

static CONFIG_PATH_LOCK: Mutex<()> = Mutex::new(());

/// Exclusive control of `JSCOPE_CONFIG_PATH` for one test.
///
/// Holds a process-wide lock so discovery tests never observe each other's override, and puts
/// the previous value back on drop.
pub(super) struct ConfigPathEnv {
    prior: Option<OsString>,
    _lock: MutexGuard<'static, ()>,
}

impl ConfigPathEnv {
    /// Discovery falls through to the workspace files.
    pub(super) fn cleared() -> Self {
        let env = Self::acquire();
        std::env::remove_var(JSCOPE_CONFIG_ENV_VAR);
        env
    }

    pub(super) fn pointing_at(path: impl AsRef<Path>) -> Self {
        let env = Self::acquire();
        std::env::set_var(JSCOPE_CONFIG_ENV_VAR, path.as_ref());
        env
    }

    fn acquire() -> Self {
        // A failed test poisons the lock; the variable is still restored by its guard.
        let lock = CONFIG_PATH_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self {
            prior: std::env::var_os(JSCOPE_CONFIG_ENV_VAR),
            _lock: lock,
        }
    }
}

impl Drop for ConfigPathEnv {
    fn drop(&mut self) {
        match self.prior.take() {
            Some(value) => std::env::set_var(JSCOPE_CONFIG_ENV_VAR, value),
            None => std::env::remove_var(JSCOPE_CONFIG_ENV_VAR),
        }
    }
}
