use common::TaskUid;
use thiserror::Error;

use crate::wire::TaskStatus;

/// Errors talking to the indexing service.
///
/// Every variant is fatal for the benchmark iteration that raised it. The two
/// recoverable conditions (a wait timing out and a probe failing) never
/// surface as errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection or transport failure.
    #[error("Service unavailable during {operation}: {source}")]
    ServiceUnavailable {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a status the operation does not accept.
    #[error("Unexpected HTTP {status} during {operation}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The service answered with a body that does not match the contract.
    #[error("Malformed response during {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An asynchronous task ended in `failed` or `canceled`.
    #[error("Task {task} ended as {status:?}: {message}")]
    TaskFailed {
        task: TaskUid,
        status: TaskStatus,
        code: Option<String>,
        message: String,
    },

    /// An index operation was attempted from the wrong lifecycle state.
    #[error("Invalid index transition: cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Service error code of a failed task (e.g. `index_not_found`).
    pub fn task_error_code(&self) -> Option<&str> {
        match self {
            Self::TaskFailed { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
