//! Artifact Record - files registered for upload with a run

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Artifact Record represents a file saved with a run.
///
/// The size is captured when the file is registered; later changes to the
/// file are not tracked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    run_id: String,
    path: PathBuf,
    size_bytes: u64,
    created_at: DateTime<Utc>,
}

impl ArtifactRecord {
    /// Create a new artifact record with the current timestamp.
    ///
    /// # Arguments
    ///
    /// * `run_id` - ID of the parent run
    /// * `path` - Local path of the saved file
    /// * `size_bytes` - Size of the file in bytes
    #[must_use]
    pub fn new(run_id: impl Into<String>, path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            run_id: run_id.into(),
            path: path.into(),
            size_bytes,
            created_at: Utc::now(),
        }
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the saved file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Get the registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
