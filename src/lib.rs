//! # wandb-logger: Experiment-Tracking Callback for Training Loops
//!
//! A training-loop callback that forwards metrics, learning rates,
//! hyperparameters and the exported model architecture to a Weights &
//! Biases style tracking run.
//!
//! ## Design Principles
//!
//! - **Injected collaborators**: the tracking SDK ([`client::TrackingClient`]),
//!   the process environment ([`client::Environment`]) and the graph exporter
//!   ([`export::GraphExporter`]) are traits the logger depends on
//! - **One event, one record**: every batch or epoch log is split once into
//!   a [`metrics::LogEvent`] with explicit training, validation and
//!   learning-rate parts
//! - **No silent recovery**: backend errors propagate to the training loop
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use wandb_logger::callback::{Callback, Network, TrainContext};
//! use wandb_logger::client::MemoryEnvironment;
//! use wandb_logger::memory::MemoryClient;
//! use wandb_logger::metrics::MetricLog;
//! use wandb_logger::{LoggerConfig, WandBLogger};
//!
//! struct Mlp;
//! impl Network for Mlp {
//!     fn name(&self) -> &str { "mlp" }
//! }
//!
//! struct Loop;
//! impl TrainContext for Loop {
//!     fn network(&self) -> &dyn Network { &Mlp }
//!     fn learning_rates(&self) -> Vec<f64> { vec![1e-3] }
//! }
//!
//! let env = Arc::new(MemoryEnvironment::new());
//! let client = MemoryClient::new(env.clone());
//! let mut logger = WandBLogger::new(LoggerConfig::new("mlp-baseline"), &client, env.as_ref())?;
//!
//! let logs = MetricLog::from([("loss".to_string(), 0.3), ("val_loss".to_string(), 0.4)]);
//! logger.on_epoch_end(1, &logs, &Loop)?;
//!
//! assert_eq!(client.active_memory_run().unwrap().log_count(), 3);
//! # Ok::<(), wandb_logger::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod callback;
pub mod client;
pub mod error;
pub mod export;
pub mod logger;
pub mod memory;
pub mod metrics;

pub use error::{Error, Result};
pub use logger::{LoggerConfig, LoggerConfigBuilder, WandBLogger};
