//! In-memory tracking backend
//!
//! [`MemoryClient`] implements [`TrackingClient`] without a network. Runs
//! are stored using the experiment-tracking schema:
//!
//! ```text
//! MemoryClient ──< MemoryRun (N)
//!                      │
//!                      ├── RunRecord (1)
//!                      ├──< MetricRecord (N) [time-series]
//!                      └──< ArtifactRecord (N)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use wandb_logger::client::{MemoryEnvironment, Run, TrackingClient};
//! use wandb_logger::memory::MemoryClient;
//! use wandb_logger::LoggerConfig;
//!
//! let client = MemoryClient::new(Arc::new(MemoryEnvironment::new()));
//! let run = client.init(&LoggerConfig::new("baseline").init_params())?;
//!
//! assert_eq!(run.name(), "baseline");
//! assert!(client.active_run().is_some());
//! # Ok::<(), wandb_logger::Error>(())
//! ```

mod artifact_record;
mod metric_record;
mod run;
mod run_record;

pub use artifact_record::ArtifactRecord;
pub use metric_record::{namespaced_key, MetricRecord};
pub use run::{MemoryRun, WatchRecord};
pub use run_record::{RunRecord, RunRecordBuilder, RunStatus};

use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use dashmap::DashMap;
use rustc_hash::FxHasher;
use tracing::info;

use crate::client::{Environment, InitParams, ResumePolicy, Run, TrackingClient, MODE_ENV_VAR, OFFLINE_MODE};
use crate::{Error, Result};

/// Tracking client keeping its runs in memory.
pub struct MemoryClient {
    env: Arc<dyn Environment>,
    runs: DashMap<String, Arc<MemoryRun>>,
    active: Mutex<Option<Arc<MemoryRun>>>,
    init_calls: Mutex<Vec<InitParams>>,
    id_counter: AtomicU64,
}

impl MemoryClient {
    /// Create a client with no run; offline mode is read from `env`.
    #[must_use]
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self {
            env,
            runs: DashMap::new(),
            active: Mutex::new(None),
            init_calls: Mutex::new(Vec::new()),
            id_counter: AtomicU64::new(0),
        }
    }

    /// Create a client whose process already has `run` active.
    #[must_use]
    pub fn with_active_run(env: Arc<dyn Environment>, run: Arc<MemoryRun>) -> Self {
        let client = Self::new(env);
        client.runs.insert(run.id().to_string(), Arc::clone(&run));
        *client.active_slot() = Some(run);
        client
    }

    fn active_slot(&self) -> MutexGuard<'_, Option<Arc<MemoryRun>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every session-creation call received, in order.
    #[must_use]
    pub fn init_calls(&self) -> Vec<InitParams> {
        self.init_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The active run with its concrete type.
    #[must_use]
    pub fn active_memory_run(&self) -> Option<Arc<MemoryRun>> {
        self.active_slot().clone()
    }

    /// Look up a run by ID.
    #[must_use]
    pub fn get_run(&self, run_id: &str) -> Option<Arc<MemoryRun>> {
        self.runs.get(run_id).map(|r| Arc::clone(r.value()))
    }

    /// Number of runs known to the client.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Finish the active run and clear the active slot.
    ///
    /// Returns the finished run, `None` if no run was active.
    pub fn finish(&self, status: RunStatus) -> Option<Arc<MemoryRun>> {
        let run = self.active_slot().take()?;
        run.finish(status);
        info!(run = %run.id(), ?status, "finished run");
        Some(run)
    }

    fn generate_id(&self, name: &str) -> String {
        let mut hasher = FxHasher::default();
        name.hash(&mut hasher);
        Utc::now().timestamp_nanos_opt().hash(&mut hasher);
        self.id_counter.fetch_add(1, Ordering::Relaxed).hash(&mut hasher);
        #[allow(clippy::cast_possible_truncation)]
        let short = hasher.finish() as u32;
        format!("{short:08x}")
    }
}

impl TrackingClient for MemoryClient {
    fn active_run(&self) -> Option<Arc<dyn Run>> {
        self.active_slot()
            .clone()
            .map(|run| run as Arc<dyn Run>)
    }

    fn init(&self, params: &InitParams) -> Result<Arc<dyn Run>> {
        self.init_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(params.clone());

        let existing = params.id.as_deref().and_then(|id| self.get_run(id));
        let run = match (existing, params.resume) {
            (Some(_), ResumePolicy::Never) => {
                return Err(Error::Client(format!(
                    "run {} already exists and resume is 'never'",
                    params.id.as_deref().unwrap_or_default()
                )));
            }
            (None, ResumePolicy::Must) => {
                return Err(Error::Client(
                    "resume is 'must' but no run exists with the given id".to_string(),
                ));
            }
            (Some(run), _) => {
                info!(run = %run.id(), "resumed run");
                run
            }
            (None, _) => {
                let id = params
                    .id
                    .clone()
                    .unwrap_or_else(|| self.generate_id(&params.name));
                let dir = params
                    .dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("wandb").join(format!("run-{id}")).join("files"));
                let offline = self.env.var(MODE_ENV_VAR).as_deref() == Some(OFFLINE_MODE);
                let record = RunRecord::builder(id.as_str(), params.name.as_str(), dir)
                    .group(params.group.clone())
                    .project(params.project.clone())
                    .resume(params.resume)
                    .anonymous(params.anonymous)
                    .offline(offline)
                    .build();
                let run = Arc::new(MemoryRun::new(record));
                self.runs.insert(id.clone(), Arc::clone(&run));
                info!(run = %id, name = %params.name, offline, "created run");
                run
            }
        };

        *self.active_slot() = Some(Arc::clone(&run));
        Ok(run as Arc<dyn Run>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryEnvironment;
    use crate::LoggerConfig;

    fn client() -> MemoryClient {
        MemoryClient::new(Arc::new(MemoryEnvironment::new()))
    }

    #[test]
    fn test_init_sets_active_run() {
        let client = client();
        assert!(client.active_run().is_none());

        let run = client.init(&LoggerConfig::new("test_run").init_params()).unwrap();
        assert_eq!(run.name(), "test_run");
        assert_eq!(run.id().len(), 8);
        assert_eq!(client.active_run().unwrap().id(), run.id());
        assert_eq!(client.init_calls().len(), 1);
    }

    #[test]
    fn test_generated_ids_differ() {
        let client = client();
        let a = client.init(&LoggerConfig::new("a").init_params()).unwrap();
        let b = client.init(&LoggerConfig::new("a").init_params()).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(client.run_count(), 2);
    }

    #[test]
    fn test_init_reads_offline_mode_from_env() {
        let env = Arc::new(MemoryEnvironment::new());
        env.set_var(MODE_ENV_VAR, OFFLINE_MODE);
        let client = MemoryClient::new(env);
        client.init(&LoggerConfig::new("run").init_params()).unwrap();
        assert!(client.active_memory_run().unwrap().record().offline());
    }

    #[test]
    fn test_resume_allow_reuses_existing_id() {
        let client = client();
        let params = LoggerConfig::builder("run").id("abc").build().unwrap().init_params();
        let first = client.init(&params).unwrap();
        let second = client.init(&params).unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(client.run_count(), 1);
    }

    #[test]
    fn test_resume_must_requires_existing_run() {
        let client = client();
        let params = LoggerConfig::builder("run")
            .id("abc")
            .resume(true)
            .build()
            .unwrap()
            .init_params();
        assert!(matches!(client.init(&params), Err(Error::Client(_))));
        assert!(client.active_run().is_none());
    }

    #[test]
    fn test_resume_never_rejects_existing_run() {
        let client = client();
        let allow = LoggerConfig::builder("run").id("abc").build().unwrap().init_params();
        client.init(&allow).unwrap();
        let never = LoggerConfig::builder("run")
            .id("abc")
            .resume(false)
            .build()
            .unwrap()
            .init_params();
        assert!(matches!(client.init(&never), Err(Error::Client(_))));
    }

    #[test]
    fn test_finish_clears_active_run() {
        let client = client();
        client.init(&LoggerConfig::new("run").init_params()).unwrap();
        let finished = client.finish(RunStatus::Finished).unwrap();
        assert_eq!(finished.record().status(), RunStatus::Finished);
        assert!(client.active_run().is_none());
        assert!(client.finish(RunStatus::Finished).is_none());
    }
}
