//! Metric Record - time-series metrics for runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{LogPayload, MetricGroup};

/// Metric Record represents a single metric data point.
///
/// Keys are namespaced by group (`training/loss`, `validation/loss`,
/// `params/lr`), mirroring the nested payloads the logger sends. `step`
/// counts `log` calls on the run, starting at 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    run_id: String,
    key: String,
    step: u64,
    value: f64,
    timestamp: DateTime<Utc>,
}

impl MetricRecord {
    /// Create a new metric record with the current timestamp.
    ///
    /// # Arguments
    ///
    /// * `run_id` - ID of the parent run
    /// * `key` - Namespaced metric key (e.g., "training/loss")
    /// * `step` - Log step of the run
    /// * `value` - Metric value
    #[must_use]
    pub fn new(run_id: impl Into<String>, key: impl Into<String>, step: u64, value: f64) -> Self {
        Self {
            run_id: run_id.into(),
            key: key.into(),
            step,
            value,
            timestamp: Utc::now(),
        }
    }

    /// Flatten a payload into one record per scalar.
    #[must_use]
    pub fn from_payload(run_id: &str, step: u64, payload: &LogPayload) -> Vec<Self> {
        payload
            .values()
            .iter()
            .map(|(name, &value)| Self::new(run_id, namespaced_key(payload.group(), name), step, value))
            .collect()
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the namespaced metric key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the log step.
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Get the metric value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Get the timestamp when the metric was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Key of metric `name` in `group`, e.g. `validation/acc`.
#[must_use]
pub fn namespaced_key(group: MetricGroup, name: &str) -> String {
    format!("{group}/{name}")
}
