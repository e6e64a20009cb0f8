//! In-memory run handle

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ArtifactRecord, MetricRecord, RunRecord, RunStatus};
use crate::callback::Network;
use crate::client::{Run, WatchOptions};
use crate::metrics::{ConfigParams, LogPayload};
use crate::{Error, Result};

/// A gradient-watch registration received by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRecord {
    /// Name of the watched network.
    pub network: String,
    /// Requested watch options.
    pub options: WatchOptions,
}

#[derive(Debug)]
struct RunState {
    record: RunRecord,
    payloads: Vec<LogPayload>,
    metrics: Vec<MetricRecord>,
    config_updates: Vec<ConfigParams>,
    watches: Vec<WatchRecord>,
    artifacts: Vec<ArtifactRecord>,
}

/// Run handle that keeps everything it receives in memory.
///
/// Every [`Run`] call is recorded as received, so the handle doubles as an
/// offline backend and as an inspection point for what a logger sent.
#[derive(Debug)]
pub struct MemoryRun {
    name: String,
    id: String,
    dir: PathBuf,
    config: DashMap<String, serde_json::Value>,
    state: Mutex<RunState>,
}

impl MemoryRun {
    /// Create a run from its record.
    #[must_use]
    pub fn new(record: RunRecord) -> Self {
        Self {
            name: record.name().to_string(),
            id: record.run_id().to_string(),
            dir: record.dir().to_path_buf(),
            config: DashMap::new(),
            state: Mutex::new(RunState {
                record,
                payloads: Vec::new(),
                metrics: Vec::new(),
                config_updates: Vec::new(),
                watches: Vec::new(),
                artifacts: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the run record.
    #[must_use]
    pub fn record(&self) -> RunRecord {
        self.state().record.clone()
    }

    /// Finish the run; further calls are still recorded.
    pub fn finish(&self, status: RunStatus) {
        self.state().record.complete(status);
    }

    /// Number of `log` calls received.
    #[must_use]
    pub fn log_count(&self) -> usize {
        self.state().payloads.len()
    }

    /// Payloads in the order they were logged.
    #[must_use]
    pub fn payloads(&self) -> Vec<LogPayload> {
        self.state().payloads.clone()
    }

    /// Time series of one namespaced metric key, ordered by step.
    #[must_use]
    pub fn metrics_for(&self, key: &str) -> Vec<MetricRecord> {
        let mut metrics: Vec<MetricRecord> = self
            .state()
            .metrics
            .iter()
            .filter(|m| m.key() == key)
            .cloned()
            .collect();
        metrics.sort_by_key(MetricRecord::step);
        metrics
    }

    /// Current merged configuration.
    #[must_use]
    pub fn config(&self) -> ConfigParams {
        self.config
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Every configuration update, as received.
    #[must_use]
    pub fn config_updates(&self) -> Vec<ConfigParams> {
        self.state().config_updates.clone()
    }

    /// Gradient-watch registrations, as received.
    #[must_use]
    pub fn watches(&self) -> Vec<WatchRecord> {
        self.state().watches.clone()
    }

    /// Files saved with the run.
    #[must_use]
    pub fn artifacts(&self) -> Vec<ArtifactRecord> {
        self.state().artifacts.clone()
    }
}

impl Run for MemoryRun {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn dir(&self) -> &Path {
        &self.dir
    }

    fn log(&self, payload: &LogPayload) -> Result<()> {
        let mut state = self.state();
        let step = state.payloads.len() as u64;
        let records = MetricRecord::from_payload(&self.id, step, payload);
        state.metrics.extend(records);
        state.payloads.push(payload.clone());
        debug!(run = %self.id, step, group = %payload.group(), "logged payload");
        Ok(())
    }

    fn update_config(&self, params: &ConfigParams) -> Result<()> {
        for (key, value) in params {
            self.config.insert(key.clone(), value.clone());
        }
        self.state().config_updates.push(params.clone());
        Ok(())
    }

    fn watch(&self, network: &dyn Network, options: WatchOptions) -> Result<()> {
        if options.frequency == 0 {
            return Err(Error::Client("watch frequency must be at least 1".to_string()));
        }
        self.state().watches.push(WatchRecord {
            network: network.name().to_string(),
            options,
        });
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        let size_bytes = std::fs::metadata(path)?.len();
        self.state()
            .artifacts
            .push(ArtifactRecord::new(&self.id, path, size_bytes));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WatchMode;
    use crate::metrics::{MetricGroup, MetricLog};

    struct Linear;

    impl Network for Linear {
        fn name(&self) -> &str {
            "linear"
        }
    }

    fn run() -> MemoryRun {
        MemoryRun::new(RunRecord::new("run-1", "test_run", "/tmp/run-1"))
    }

    #[test]
    fn test_log_advances_step() {
        let run = run();
        for loss in [0.3, 0.2] {
            let values = MetricLog::from([("loss".to_string(), loss)]);
            run.log(&LogPayload::new(MetricGroup::Training, values)).unwrap();
        }
        let series = run.metrics_for("training/loss");
        assert_eq!(run.log_count(), 2);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].step(), 1);
    }

    #[test]
    fn test_update_config_merges() {
        let run = run();
        let mut first = ConfigParams::new();
        first.insert("lr".to_string(), serde_json::json!(0.1));
        let mut second = ConfigParams::new();
        second.insert("lr".to_string(), serde_json::json!(0.2));
        second.insert("batch".to_string(), serde_json::json!(32));
        run.update_config(&first).unwrap();
        run.update_config(&second).unwrap();

        assert_eq!(run.config_updates().len(), 2);
        assert_eq!(run.config().get("lr"), Some(&serde_json::json!(0.2)));
        assert_eq!(run.config().len(), 2);
    }

    #[test]
    fn test_watch_records_network_name() {
        let run = run();
        let options = WatchOptions {
            mode: WatchMode::All,
            frequency: 5,
        };
        run.watch(&Linear, options).unwrap();
        assert_eq!(run.watches()[0].network, "linear");
        assert_eq!(run.watches()[0].options, options);
    }

    #[test]
    fn test_save_missing_file_is_io_error() {
        let run = run();
        let result = run.save(Path::new("/nonexistent/dir/model.onnx"));
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(run.artifacts().is_empty());
    }

    #[test]
    fn test_finish_completes_record() {
        let run = run();
        run.finish(RunStatus::Finished);
        assert_eq!(run.record().status(), RunStatus::Finished);
    }
}
