//! Metric logs and the payloads sent to a run
//!
//! A training loop hands the logger flat logs such as
//! `{"loss": 0.3, "val_loss": 0.4}`. Each log is turned once into a
//! [`LogEvent`] with explicit training, validation and learning-rate parts,
//! and the event is then rendered into one [`LogPayload`] per group.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key prefix marking validation metrics in a training-loop log.
pub const VALIDATION_PREFIX: &str = "val_";

/// Flat metric log produced by the training loop for one batch or epoch.
pub type MetricLog = BTreeMap<String, f64>;

/// Hyperparameters pushed to a run's configuration store.
pub type ConfigParams = serde_json::Map<String, serde_json::Value>;

/// Group under which a payload is nested when sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricGroup {
    /// Metrics computed on the training split.
    Training,
    /// Metrics computed on the validation split.
    Validation,
    /// Optimizer parameters (learning rates).
    Params,
}

impl MetricGroup {
    /// Key used for the group in the nested payload.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Validation => "validation",
            Self::Params => "params",
        }
    }
}

impl fmt::Display for MetricGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One nested group of scalars, sent to the backend in a single `log` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogPayload {
    group: MetricGroup,
    values: MetricLog,
}

impl LogPayload {
    /// Create a payload for `group`.
    #[must_use]
    pub const fn new(group: MetricGroup, values: MetricLog) -> Self {
        Self { group, values }
    }

    /// Get the payload group.
    #[must_use]
    pub const fn group(&self) -> MetricGroup {
        self.group
    }

    /// Get the scalars of the payload.
    #[must_use]
    pub const fn values(&self) -> &MetricLog {
        &self.values
    }

    /// Render as the nested JSON object a tracking SDK expects,
    /// e.g. `{"training": {"loss": 0.3}}`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut outer = serde_json::Map::new();
        outer.insert(
            self.group.as_str().to_string(),
            serde_json::json!(self.values),
        );
        serde_json::Value::Object(outer)
    }
}

/// Tagged record built once per log event.
///
/// Validation metrics are recognised by a strict key prefix, so a training
/// metric named e.g. `interval_val_error` stays a training metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogEvent {
    training: MetricLog,
    validation: MetricLog,
    learning_rates: Vec<f64>,
}

impl LogEvent {
    /// Create an event from already separated parts.
    #[must_use]
    pub const fn new(training: MetricLog, validation: MetricLog, learning_rates: Vec<f64>) -> Self {
        Self {
            training,
            validation,
            learning_rates,
        }
    }

    /// Split a flat training-loop log on [`VALIDATION_PREFIX`].
    ///
    /// Validation keys lose their prefix: `val_loss` becomes `loss`.
    #[must_use]
    pub fn from_log(log: &MetricLog, learning_rates: Vec<f64>) -> Self {
        let mut training = MetricLog::new();
        let mut validation = MetricLog::new();
        for (key, &value) in log {
            match key.strip_prefix(VALIDATION_PREFIX) {
                Some(stripped) if !stripped.is_empty() => {
                    validation.insert(stripped.to_string(), value);
                }
                _ => {
                    training.insert(key.clone(), value);
                }
            }
        }
        Self::new(training, validation, learning_rates)
    }

    /// Get the training metrics.
    #[must_use]
    pub const fn training(&self) -> &MetricLog {
        &self.training
    }

    /// Get the validation metrics, prefix stripped.
    #[must_use]
    pub const fn validation(&self) -> &MetricLog {
        &self.validation
    }

    /// Get the learning rate of each optimizer parameter group.
    #[must_use]
    pub fn learning_rates(&self) -> &[f64] {
        &self.learning_rates
    }

    /// Learning rates keyed for the `params` group.
    ///
    /// A single parameter group is logged as `lr`; several groups are logged
    /// as `lr_group_0`, `lr_group_1`, ...
    #[must_use]
    pub fn params(&self) -> MetricLog {
        match self.learning_rates.as_slice() {
            [lr] => MetricLog::from([("lr".to_string(), *lr)]),
            lrs => lrs
                .iter()
                .enumerate()
                .map(|(i, lr)| (format!("lr_group_{i}"), *lr))
                .collect(),
        }
    }

    /// The three payloads of an epoch: training, validation, params.
    #[must_use]
    pub fn payloads(&self) -> [LogPayload; 3] {
        [
            LogPayload::new(MetricGroup::Training, self.training.clone()),
            LogPayload::new(MetricGroup::Validation, self.validation.clone()),
            LogPayload::new(MetricGroup::Params, self.params()),
        ]
    }
}
