//! Offline Training Example
//!
//! Drives a toy training loop with a `WandBLogger` writing to the in-memory
//! backend, then prints what the run received.
//!
//! Run with: RUST_LOG=debug cargo run --example offline_training

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wandb_logger::callback::{Callback, Network, TrainContext};
use wandb_logger::client::{MemoryEnvironment, Run};
use wandb_logger::memory::{MemoryClient, RunStatus};
use wandb_logger::metrics::MetricLog;
use wandb_logger::{LoggerConfig, WandBLogger};

struct Mlp;

impl Network for Mlp {
    fn name(&self) -> &str {
        "Mlp(784 -> 128 -> 10)"
    }
}

struct TrainingLoop {
    network: Mlp,
    lr: f64,
}

impl TrainContext for TrainingLoop {
    fn network(&self) -> &dyn Network {
        &self.network
    }

    fn learning_rates(&self) -> Vec<f64> {
        vec![self.lr]
    }
}

#[allow(clippy::cast_precision_loss)]
fn main() -> wandb_logger::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== wandb-logger Offline Training ===\n");

    let env = Arc::new(MemoryEnvironment::new());
    let client = MemoryClient::new(env.clone());

    // -------------------------------------------------------------------------
    // 1. Create the logger
    // -------------------------------------------------------------------------
    let config = LoggerConfig::builder("mlp-mnist")
        .project("mnist")
        .offline(true)
        .log_gradient_frequency(100)
        .batch_granularity(false)
        .build()?;
    let mut logger = WandBLogger::new(config, &client, env.as_ref())?;
    println!("1. Run: {} ({})", logger.run().name(), logger.run().id());

    let mut params = serde_json::Map::new();
    params.insert("optimizer".to_string(), serde_json::json!("sgd"));
    params.insert("batch_size".to_string(), serde_json::json!(64));
    logger.log_config_params(&params)?;

    // -------------------------------------------------------------------------
    // 2. Train
    // -------------------------------------------------------------------------
    let mut training = TrainingLoop {
        network: Mlp,
        lr: 0.1,
    };
    logger.on_train_begin(&training)?;
    for epoch in 1..=5 {
        let loss = 2.0 / epoch as f64;
        let logs = MetricLog::from([
            ("epoch".to_string(), epoch as f64),
            ("loss".to_string(), loss),
            ("val_loss".to_string(), loss * 1.1),
        ]);
        logger.on_epoch_end(epoch, &logs, &training)?;
        training.lr *= 0.5;
    }
    logger.on_train_end(&training)?;

    // -------------------------------------------------------------------------
    // 3. Inspect the run
    // -------------------------------------------------------------------------
    let Some(run) = client.finish(RunStatus::Finished) else {
        return Ok(());
    };
    println!("2. Offline: {}", run.record().offline());
    println!("3. Log calls: {}", run.log_count());
    println!("4. Config: {}", serde_json::to_string(&run.config())?);
    println!("5. Validation loss curve:");
    for metric in run.metrics_for("validation/loss") {
        println!("   step {:>2}: {:.4}", metric.step(), metric.value());
    }
    println!("6. Status: {:?}", run.record().status());

    Ok(())
}
