//! Error types for the shared data model.

use thiserror::Error;

/// Errors raised while validating data-model values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommonError {
    /// A fraction outside 1..=100 percent.
    #[error("Invalid fraction: {0}% (expected 1..=100)")]
    InvalidFraction(u32),

    /// A fraction sequence that is empty or not strictly ascending.
    #[error("Invalid fraction sequence: {0}")]
    InvalidSequence(String),
}

/// Result type alias for data-model validation.
pub type CommonResult<T> = Result<T, CommonError>;
