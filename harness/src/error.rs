//! Error types for the benchmark harness.

use common::CommonError;
use indexbench_hardware::HardwareError;
use indexbench_search_client::ClientError;
use thiserror::Error;

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Any of these aborts the whole run; no report is written for it.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Service call failed (transport, status, failed task)
    #[error("Service error: {0}")]
    Client(#[from] ClientError),

    /// Dataset file missing or not a JSON array of objects
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Invalid run settings
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Fraction sequence validation
    #[error("Invalid fractions: {0}")]
    Fraction(#[from] CommonError),

    /// Resource sampling failed
    #[error("Resource sampling failed: {0}")]
    Sampling(#[from] HardwareError),

    /// A probe or sampler task panicked
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
