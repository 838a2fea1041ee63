//! Error types for the indexbench binary.
//!
//! `main` works in `anyhow`; these variants carry the failures that the
//! binary's own code decides, so tests can match on them.

use common::CommonError;
use indexbench_harness::HarnessError;
use indexbench_search_client::ClientError;
use thiserror::Error;

/// Result type for binary-level operations.
pub type BenchResult<T> = Result<T, BenchError>;

#[derive(Error, Debug)]
pub enum BenchError {
    /// A setting is out of range
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid fractions: {0}")]
    Fraction(#[from] CommonError),

    /// Client could not be built from the configuration
    #[error("Client setup failed: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Harness(#[from] HarnessError),
}

impl BenchError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            BenchError::Config(_) | BenchError::Fraction(_) => 2,
            BenchError::Client(_) | BenchError::Harness(_) => 1,
        }
    }
}
