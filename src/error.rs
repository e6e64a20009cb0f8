//! Error types for wandb-logger
//!
//! Backend failures are carried through untouched; the logger never retries.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// wandb-logger error types
#[derive(Error, Debug)]
pub enum Error {
    /// Tracking backend call failed (network, auth, rejected payload)
    #[error("Tracking client error: {0}")]
    Client(String),

    /// Model graph export failed
    #[error("Model export failed: {0}\nCheck that the input shape matches the network's first layer")]
    Export(String),

    /// Logger configuration rejected at build time
    #[error("Invalid logger configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
