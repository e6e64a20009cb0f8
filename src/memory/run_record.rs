//! Run Record - metadata and lifecycle of a tracked run

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{AnonymousMode, ResumePolicy};

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is receiving logs.
    Running,
    /// Run was finished by its owner.
    Finished,
    /// Run was finished after a failure.
    Failed,
}

/// Run Record holds what the backend knows about a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    run_id: String,
    name: String,
    dir: PathBuf,
    group: Option<String>,
    project: Option<String>,
    resume: ResumePolicy,
    anonymous: Option<AnonymousMode>,
    offline: bool,
    status: RunStatus,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    /// Create a new record in Running status.
    ///
    /// # Arguments
    ///
    /// * `run_id` - Unique identifier for the run
    /// * `name` - Display name of the run
    /// * `dir` - Local directory holding the run's files
    #[must_use]
    pub fn new(run_id: impl Into<String>, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            run_id: run_id.into(),
            name: name.into(),
            dir: dir.into(),
            group: None,
            project: None,
            resume: ResumePolicy::Allow,
            anonymous: None,
            offline: false,
            status: RunStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Create a builder for constructing a run record with optional fields.
    #[must_use]
    pub fn builder(
        run_id: impl Into<String>,
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
    ) -> RunRecordBuilder {
        RunRecordBuilder::new(run_id, name, dir)
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the run name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the run directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the run group, if set.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Get the project, if set.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Get the resume policy the run was created with.
    #[must_use]
    pub const fn resume(&self) -> ResumePolicy {
        self.resume
    }

    /// Get the anonymous mode the run was created with.
    #[must_use]
    pub const fn anonymous(&self) -> Option<AnonymousMode> {
        self.anonymous
    }

    /// Whether the run was created in offline mode.
    #[must_use]
    pub const fn offline(&self) -> bool {
        self.offline
    }

    /// Get the current run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Get the start timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get the end timestamp, if the run has finished.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Finish the run with the given final status.
    ///
    /// Sets the `ended_at` timestamp to now.
    pub fn complete(&mut self, status: RunStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
    }
}

/// Builder for `RunRecord`.
#[derive(Debug)]
pub struct RunRecordBuilder {
    record: RunRecord,
}

impl RunRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(run_id: impl Into<String>, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            record: RunRecord::new(run_id, name, dir),
        }
    }

    /// Set the run group.
    #[must_use]
    pub fn group(mut self, group: Option<String>) -> Self {
        self.record.group = group;
        self
    }

    /// Set the project.
    #[must_use]
    pub fn project(mut self, project: Option<String>) -> Self {
        self.record.project = project;
        self
    }

    /// Set the resume policy.
    #[must_use]
    pub const fn resume(mut self, resume: ResumePolicy) -> Self {
        self.record.resume = resume;
        self
    }

    /// Set the anonymous mode.
    #[must_use]
    pub const fn anonymous(mut self, anonymous: Option<AnonymousMode>) -> Self {
        self.record.anonymous = anonymous;
        self
    }

    /// Mark the run as created offline.
    #[must_use]
    pub const fn offline(mut self, offline: bool) -> Self {
        self.record.offline = offline;
        self
    }

    /// Build the `RunRecord`.
    #[must_use]
    pub fn build(self) -> RunRecord {
        self.record
    }
}
