//! Shared fixtures: a toy network, a minimal training loop and log capture.

#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use wandb_logger::callback::{Callback, Network, TrainContext};
use wandb_logger::export::{GraphExporter, InputShape};
use wandb_logger::metrics::MetricLog;
use wandb_logger::Result;

pub const LEARNING_RATE: f64 = 1e-3;

pub struct Linear;

impl Network for Linear {
    fn name(&self) -> &str {
        "Linear(in_features=1, out_features=1)"
    }
}

/// Training loop state seen by callbacks.
pub struct ToyLoop {
    network: Linear,
    learning_rates: Vec<f64>,
}

impl ToyLoop {
    pub fn new() -> Self {
        Self::with_learning_rates(vec![LEARNING_RATE])
    }

    pub fn with_learning_rates(learning_rates: Vec<f64>) -> Self {
        Self {
            network: Linear,
            learning_rates,
        }
    }
}

impl TrainContext for ToyLoop {
    fn network(&self) -> &dyn Network {
        &self.network
    }

    fn learning_rates(&self) -> Vec<f64> {
        self.learning_rates.clone()
    }
}

fn log(pairs: &[(&str, f64)]) -> MetricLog {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

/// Drive `callback` through `epochs` epochs of `steps` batches.
///
/// Returns the epoch logs, one per epoch.
#[allow(clippy::cast_precision_loss)]
pub fn fit(
    callback: &mut dyn Callback,
    ctx: &ToyLoop,
    epochs: usize,
    steps: usize,
) -> Result<Vec<MetricLog>> {
    let mut history = Vec::with_capacity(epochs);
    callback.on_train_begin(ctx)?;
    for epoch in 1..=epochs {
        callback.on_epoch_begin(epoch, ctx)?;
        for batch in 1..=steps {
            let loss = 1.0 / (epoch * steps + batch) as f64;
            let logs = log(&[("batch", batch as f64), ("size", 32.0), ("loss", loss)]);
            callback.on_train_batch_end(batch, &logs, ctx)?;
        }
        let logs = log(&[
            ("epoch", epoch as f64),
            ("loss", 1.0 / epoch as f64),
            ("time", 0.01),
            ("val_loss", 1.5 / epoch as f64),
        ]);
        callback.on_epoch_end(epoch, &logs, ctx)?;
        history.push(logs);
    }
    callback.on_train_end(ctx)?;
    Ok(history)
}

/// Exporter writing a placeholder graph and remembering each call.
#[derive(Default)]
pub struct RecordingExporter {
    calls: Mutex<Vec<(String, Vec<usize>, PathBuf)>>,
}

impl RecordingExporter {
    pub fn calls(&self) -> Vec<(String, Vec<usize>, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl GraphExporter for RecordingExporter {
    fn export(&self, network: &dyn Network, input: &InputShape, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, b"graph")?;
        self.calls
            .lock()
            .unwrap()
            .push((network.name().to_string(), input.dims().to_vec(), path.to_path_buf()));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` under a subscriber capturing WARN and above; returns `f`'s
/// output and the number of warnings emitted.
pub fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || writer.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let warnings = text.lines().filter(|line| line.contains("WARN")).count();
    (out, warnings)
}
