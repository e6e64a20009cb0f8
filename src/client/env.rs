//! Process environment access
//!
//! Offline mode is requested from the tracking SDK through an environment
//! variable. The logger writes it through [`Environment`] so tests can use an
//! isolated [`MemoryEnvironment`] instead of the real process environment.

use dashmap::DashMap;

/// Variable read by the tracking SDK to select its transmission mode.
pub const MODE_ENV_VAR: &str = "WANDB_MODE";

/// Value of [`MODE_ENV_VAR`] that buffers tracking calls locally.
pub const OFFLINE_MODE: &str = "dryrun";

/// Read/write access to environment variables.
pub trait Environment: Send + Sync {
    /// Get a variable, `None` if unset.
    fn var(&self, key: &str) -> Option<String>;

    /// Set a variable, overwriting any previous value.
    fn set_var(&self, key: &str, value: &str);
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set_var(&self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

/// An isolated in-memory environment.
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    vars: DashMap<String, String>,
}

impl MemoryEnvironment {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Environment for MemoryEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).map(|v| v.value().clone())
    }

    fn set_var(&self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }
}
