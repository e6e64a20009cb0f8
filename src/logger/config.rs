//! Logger configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::{AnonymousMode, InitParams, ResumePolicy};
use crate::export::InputShape;
use crate::{Error, Result};

const fn default_batch_granularity() -> bool {
    true
}

/// Settings of a [`WandBLogger`](super::WandBLogger).
///
/// Loadable from JSON; only `name` is required:
///
/// ```rust
/// use wandb_logger::LoggerConfig;
///
/// let config = LoggerConfig::from_json(r#"{"name": "resnet", "offline": true}"#)?;
/// assert!(config.offline());
/// assert!(config.batch_granularity());
/// # Ok::<(), wandb_logger::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    name: String,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    dir: Option<PathBuf>,
    #[serde(default)]
    resume: Option<bool>,
    #[serde(default)]
    anonymous: bool,
    #[serde(default)]
    offline: bool,
    #[serde(default)]
    log_gradient_frequency: Option<u32>,
    #[serde(default = "default_batch_granularity")]
    batch_granularity: bool,
    #[serde(default)]
    training_batch_shape: Option<InputShape>,
}

impl LoggerConfig {
    /// Create a configuration with defaults for everything but the run name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
            project: None,
            id: None,
            dir: None,
            resume: None,
            anonymous: false,
            offline: false,
            log_gradient_frequency: None,
            batch_granularity: true,
            training_batch_shape: None,
        }
    }

    /// Create a builder for a configuration with optional fields.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerConfigBuilder {
        LoggerConfigBuilder::new(name)
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] on malformed input and
    /// [`Error::InvalidConfig`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that cannot be expressed in the types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty run name or a zero
    /// gradient-watch frequency.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig("run name is empty".to_string()));
        }
        if self.log_gradient_frequency == Some(0) {
            return Err(Error::InvalidConfig(
                "log_gradient_frequency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the run name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the run group.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Get the project.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Get the requested run ID.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Get the run directory.
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Get the resume policy derived from the tri-state flag.
    #[must_use]
    pub const fn resume(&self) -> ResumePolicy {
        ResumePolicy::from_flag(self.resume)
    }

    /// Get the anonymous mode derived from the flag.
    #[must_use]
    pub const fn anonymous(&self) -> Option<AnonymousMode> {
        AnonymousMode::from_flag(self.anonymous)
    }

    /// Whether tracking calls are buffered locally.
    #[must_use]
    pub const fn offline(&self) -> bool {
        self.offline
    }

    /// Gradient-watch frequency, `None` when watching is disabled.
    #[must_use]
    pub const fn log_gradient_frequency(&self) -> Option<u32> {
        self.log_gradient_frequency
    }

    /// Whether metrics are logged after every batch.
    #[must_use]
    pub const fn batch_granularity(&self) -> bool {
        self.batch_granularity
    }

    /// Input shape used to export the architecture at the end of training.
    #[must_use]
    pub const fn training_batch_shape(&self) -> Option<&InputShape> {
        self.training_batch_shape.as_ref()
    }

    /// Arguments of the session-creation call for this configuration.
    ///
    /// The initial run config is always left unset; hyperparameters go
    /// through [`WandBLogger::log_config_params`](super::WandBLogger::log_config_params).
    #[must_use]
    pub fn init_params(&self) -> InitParams {
        InitParams {
            name: self.name.clone(),
            group: self.group.clone(),
            config: None,
            project: self.project.clone(),
            id: self.id.clone(),
            dir: self.dir.clone(),
            resume: self.resume(),
            anonymous: self.anonymous(),
        }
    }
}

/// Builder for `LoggerConfig`.
#[derive(Debug)]
pub struct LoggerConfigBuilder {
    config: LoggerConfig,
}

impl LoggerConfigBuilder {
    /// Create a new builder with the required run name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: LoggerConfig::new(name),
        }
    }

    /// Set the run group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.config.group = Some(group.into());
        self
    }

    /// Set the project.
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.config.project = Some(project.into());
        self
    }

    /// Set the run ID, e.g. to resume an earlier run.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.config.id = Some(id.into());
        self
    }

    /// Set the local run directory.
    #[must_use]
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.dir = Some(dir.into());
        self
    }

    /// Set the resume flag: `true` requires an existing run, `false` forbids one.
    #[must_use]
    pub const fn resume(mut self, resume: bool) -> Self {
        self.config.resume = Some(resume);
        self
    }

    /// Allow anonymous logging.
    #[must_use]
    pub const fn anonymous(mut self, anonymous: bool) -> Self {
        self.config.anonymous = anonymous;
        self
    }

    /// Buffer tracking calls locally instead of sending them.
    #[must_use]
    pub const fn offline(mut self, offline: bool) -> Self {
        self.config.offline = offline;
        self
    }

    /// Watch gradients and parameters every `frequency` batches.
    #[must_use]
    pub const fn log_gradient_frequency(mut self, frequency: u32) -> Self {
        self.config.log_gradient_frequency = Some(frequency);
        self
    }

    /// Log metrics after every batch (default) or only after every epoch.
    #[must_use]
    pub const fn batch_granularity(mut self, enabled: bool) -> Self {
        self.config.batch_granularity = enabled;
        self
    }

    /// Export the architecture at the end of training using a dummy batch of
    /// this shape.
    #[must_use]
    pub fn training_batch_shape(mut self, shape: InputShape) -> Self {
        self.config.training_batch_shape = Some(shape);
        self
    }

    /// Build and validate the `LoggerConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if validation fails.
    pub fn build(self) -> Result<LoggerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::new("run");
        assert_eq!(config.resume(), ResumePolicy::Allow);
        assert_eq!(config.anonymous(), None);
        assert!(!config.offline());
        assert!(config.batch_granularity());
        assert!(config.log_gradient_frequency().is_none());
        assert!(config.training_batch_shape().is_none());
    }

    #[test]
    fn test_init_params_leave_config_unset() {
        let params = LoggerConfig::builder("run")
            .group("g")
            .project("p")
            .id("abc")
            .dir("/tmp/runs")
            .anonymous(true)
            .build()
            .unwrap()
            .init_params();
        assert_eq!(params.name, "run");
        assert_eq!(params.group.as_deref(), Some("g"));
        assert_eq!(params.project.as_deref(), Some("p"));
        assert_eq!(params.id.as_deref(), Some("abc"));
        assert_eq!(params.dir, Some(PathBuf::from("/tmp/runs")));
        assert_eq!(params.anonymous, Some(AnonymousMode::Allow));
        assert!(params.config.is_none());
    }

    #[test]
    fn test_build_rejects_empty_name() {
        assert!(matches!(
            LoggerConfig::builder("  ").build(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_build_rejects_zero_watch_frequency() {
        assert!(matches!(
            LoggerConfig::builder("run").log_gradient_frequency(0).build(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_json_defaults_batch_granularity() {
        let config = LoggerConfig::from_json(r#"{"name": "run"}"#).unwrap();
        assert!(config.batch_granularity());
        assert_eq!(config, LoggerConfig::new("run"));
    }

    #[test]
    fn test_from_json_full() {
        let config = LoggerConfig::from_json(
            r#"{
                "name": "run",
                "resume": false,
                "log_gradient_frequency": 10,
                "batch_granularity": false,
                "training_batch_shape": [1, 2, 3]
            }"#,
        )
        .unwrap();
        assert_eq!(config.resume(), ResumePolicy::Never);
        assert_eq!(config.log_gradient_frequency(), Some(10));
        assert!(!config.batch_granularity());
        assert_eq!(config.training_batch_shape().map(InputShape::dims), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn test_from_json_rejects_bad_shape() {
        assert!(LoggerConfig::from_json(r#"{"name": "run", "training_batch_shape": []}"#).is_err());
    }
}
