//! Tracking client interface
//!
//! The logger never talks to a tracking service directly. It depends on a
//! [`TrackingClient`] for session creation and for the process-wide "active
//! run" reference, and on [`Run`] handles for everything else.
//!
//! ```text
//! TrackingClient ──init()──> Arc<dyn Run>
//!        │                        ├── log(payload)
//!        └── active_run()         ├── update_config(params)
//!                                 ├── watch(network, options)
//!                                 └── save(path)
//! ```

mod env;

pub use env::{Environment, MemoryEnvironment, ProcessEnvironment, MODE_ENV_VAR, OFFLINE_MODE};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::callback::Network;
use crate::metrics::{ConfigParams, LogPayload};
use crate::Result;

/// How the backend treats an `id` that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumePolicy {
    /// Resume the run if it exists, create it otherwise.
    #[default]
    Allow,
    /// The run must exist and is resumed.
    Must,
    /// The run must not exist.
    Never,
}

impl ResumePolicy {
    /// Map the tri-state resume flag: unset allows, `true` requires,
    /// `false` forbids.
    #[must_use]
    pub const fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Self::Allow,
            Some(true) => Self::Must,
            Some(false) => Self::Never,
        }
    }

    /// Wire value understood by the SDK.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Must => "must",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ResumePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anonymous logging mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnonymousMode {
    /// Log anonymously when no account is logged in.
    Allow,
}

impl AnonymousMode {
    /// `true` maps to [`AnonymousMode::Allow`], `false` leaves the mode unset.
    #[must_use]
    pub const fn from_flag(anonymous: bool) -> Option<Self> {
        if anonymous {
            Some(Self::Allow)
        } else {
            None
        }
    }

    /// Wire value understood by the SDK.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
        }
    }
}

/// Arguments of the session-creation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitParams {
    /// Display name of the run.
    pub name: String,
    /// Group used to gather related runs.
    pub group: Option<String>,
    /// Initial configuration; the logger always leaves it unset.
    pub config: Option<ConfigParams>,
    /// Project the run belongs to.
    pub project: Option<String>,
    /// Unique run identifier, generated by the backend when unset.
    pub id: Option<String>,
    /// Local directory for the run's files.
    pub dir: Option<PathBuf>,
    /// Resume policy.
    pub resume: ResumePolicy,
    /// Anonymous mode, unset when not requested.
    pub anonymous: Option<AnonymousMode>,
}

/// What a gradient watch samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchMode {
    /// Gradients only.
    Gradients,
    /// Parameters only.
    Parameters,
    /// Gradients and parameters.
    All,
}

impl WatchMode {
    /// Wire value understood by the SDK.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gradients => "gradients",
            Self::Parameters => "parameters",
            Self::All => "all",
        }
    }
}

/// Options of a gradient-watch registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchOptions {
    /// What to sample.
    pub mode: WatchMode,
    /// Sample every `frequency` batches.
    pub frequency: u32,
}

/// Handle to one run in the tracking backend.
pub trait Run: Send + Sync {
    /// Display name of the run.
    fn name(&self) -> &str;

    /// Unique run identifier.
    fn id(&self) -> &str;

    /// Local directory holding the run's files.
    fn dir(&self) -> &Path;

    /// Log one nested group of scalars; each call is one backend step.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    fn log(&self, payload: &LogPayload) -> Result<()>;

    /// Merge `params` into the run's persisted configuration.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    fn update_config(&self, params: &ConfigParams) -> Result<()>;

    /// Register `network` for gradient/parameter sampling.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    fn watch(&self, network: &dyn Network, options: WatchOptions) -> Result<()>;

    /// Register a local file for upload with the run.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    fn save(&self, path: &Path) -> Result<()>;
}

/// Session management of a tracking SDK.
pub trait TrackingClient: Send + Sync {
    /// The run currently active in this process, if any.
    fn active_run(&self) -> Option<Arc<dyn Run>>;

    /// Create (or resume) a run and make it the active one.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    fn init(&self, params: &InitParams) -> Result<Arc<dyn Run>>;
}
