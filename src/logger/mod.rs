//! Weights & Biases logging callback
//!
//! [`WandBLogger`] observes a training loop and forwards epoch and batch
//! metrics, learning rates, hyperparameters and the exported architecture to
//! a tracking run.
//!
//! ## Run selection
//!
//! 1. An explicitly supplied run is always used as is.
//! 2. Otherwise, if the client already has an active run, that run is
//!    adopted and a warning is emitted; no new run is created.
//! 3. Otherwise a run is created from the [`LoggerConfig`], after switching
//!    the environment to offline mode if requested.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wandb_logger::client::MemoryEnvironment;
//! use wandb_logger::memory::MemoryClient;
//! use wandb_logger::{LoggerConfig, WandBLogger};
//!
//! let env = Arc::new(MemoryEnvironment::new());
//! let client = MemoryClient::new(env.clone());
//! let config = LoggerConfig::builder("resnet").batch_granularity(false).build()?;
//! let logger = WandBLogger::new(config, &client, env.as_ref())?;
//!
//! let mut params = serde_json::Map::new();
//! params.insert("batch_size".to_string(), serde_json::json!(32));
//! logger.log_config_params(&params)?;
//! # Ok::<(), wandb_logger::Error>(())
//! ```

mod config;

pub use config::{LoggerConfig, LoggerConfigBuilder};

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::callback::{Callback, TrainContext};
use crate::client::{Environment, Run, TrackingClient, WatchMode, WatchOptions, MODE_ENV_VAR, OFFLINE_MODE};
use crate::export::{GraphExporter, MODEL_FILE_SUFFIX};
use crate::metrics::{ConfigParams, LogEvent, LogPayload, MetricGroup, MetricLog};
use crate::{Error, Result};

/// Training callback logging to a tracking run.
pub struct WandBLogger {
    config: LoggerConfig,
    run: Arc<dyn Run>,
    exporter: Option<Arc<dyn GraphExporter>>,
}

impl WandBLogger {
    /// Create a logger, creating a run through `client` unless one is
    /// already active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an invalid configuration and the
    /// client's error if run creation fails.
    pub fn new(
        config: LoggerConfig,
        client: &dyn TrackingClient,
        env: &dyn Environment,
    ) -> Result<Self> {
        Self::with_experiment(config, None, client, env)
    }

    /// Create a logger on an existing run, or as [`WandBLogger::new`] when
    /// `experiment` is `None`.
    ///
    /// A supplied run takes priority over the client's active run; the client
    /// is then not called at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an invalid configuration and the
    /// client's error if run creation fails.
    pub fn with_experiment(
        config: LoggerConfig,
        experiment: Option<Arc<dyn Run>>,
        client: &dyn TrackingClient,
        env: &dyn Environment,
    ) -> Result<Self> {
        config.validate()?;

        let run = match experiment {
            Some(run) => {
                debug!(run = %run.id(), "using supplied run");
                run
            }
            None => {
                if config.offline() {
                    env.set_var(MODE_ENV_VAR, OFFLINE_MODE);
                }
                if let Some(active) = client.active_run() {
                    warn!(
                        run = %active.id(),
                        "a run is already active; logging to it instead of creating '{}'. \
                         Pass the run explicitly to silence this warning",
                        config.name()
                    );
                    active
                } else {
                    let run = client.init(&config.init_params())?;
                    info!(run = %run.id(), name = %run.name(), "initialized run");
                    run
                }
            }
        };

        Ok(Self {
            config,
            run,
            exporter: None,
        })
    }

    /// Set the exporter used for the architecture export at the end of
    /// training.
    #[must_use]
    pub fn with_exporter(mut self, exporter: Arc<dyn GraphExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Get the run the logger writes to.
    #[must_use]
    pub fn run(&self) -> &Arc<dyn Run> {
        &self.run
    }

    /// Get the logger configuration.
    #[must_use]
    pub const fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Push hyperparameters to the run's configuration (one update call).
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    pub fn log_config_params(&self, params: &ConfigParams) -> Result<()> {
        self.run.update_config(params)
    }

    /// Path of the exported architecture: `{run_dir}/{run_name}_model.onnx`.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.run
            .dir()
            .join(format!("{}{MODEL_FILE_SUFFIX}", self.run.name()))
    }

    fn log_payload(&self, payload: &LogPayload) -> Result<()> {
        debug!(group = %payload.group(), metrics = payload.values().len(), "logging payload");
        self.run.log(payload)
    }

    fn log_event(&self, event: &LogEvent) -> Result<()> {
        for payload in event.payloads() {
            self.log_payload(&payload)?;
        }
        Ok(())
    }

    fn save_architecture(&self, ctx: &dyn TrainContext) -> Result<()> {
        let Some(shape) = self.config.training_batch_shape() else {
            return Ok(());
        };
        let exporter = self.exporter.as_ref().ok_or_else(|| {
            Error::Export("an input shape is configured but no graph exporter is set".to_string())
        })?;
        let path = self.model_path();
        exporter.export(ctx.network(), shape, &path)?;
        self.run.save(&path)?;
        info!(path = %path.display(), %shape, "saved model architecture");
        Ok(())
    }
}

impl Callback for WandBLogger {
    fn on_train_begin(&mut self, ctx: &dyn TrainContext) -> Result<()> {
        if let Some(frequency) = self.config.log_gradient_frequency() {
            self.run.watch(
                ctx.network(),
                WatchOptions {
                    mode: WatchMode::All,
                    frequency,
                },
            )?;
        }
        Ok(())
    }

    fn on_train_batch_end(
        &mut self,
        _batch: usize,
        logs: &MetricLog,
        _ctx: &dyn TrainContext,
    ) -> Result<()> {
        if !self.config.batch_granularity() {
            return Ok(());
        }
        let event = LogEvent::from_log(logs, Vec::new());
        self.log_payload(&LogPayload::new(MetricGroup::Training, event.training().clone()))?;
        if !event.validation().is_empty() {
            self.log_payload(&LogPayload::new(
                MetricGroup::Validation,
                event.validation().clone(),
            ))?;
        }
        Ok(())
    }

    fn on_epoch_end(&mut self, _epoch: usize, logs: &MetricLog, ctx: &dyn TrainContext) -> Result<()> {
        let event = LogEvent::from_log(logs, ctx.learning_rates());
        self.log_event(&event)
    }

    fn on_train_end(&mut self, ctx: &dyn TrainContext) -> Result<()> {
        self.save_architecture(ctx)
    }
}

impl std::fmt::Debug for WandBLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WandBLogger")
            .field("config", &self.config)
            .field("run", &self.run.id())
            .field("exporter", &self.exporter.is_some())
            .finish()
    }
}
