//! Request and response bodies of the service's HTTP API.

use common::TaskUid;
use serde::{Deserialize, Serialize};

/// Server-side state of an asynchronous task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// Summary returned when a task is enqueued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    #[serde(rename = "taskUid", alias = "taskId", alias = "uid")]
    pub task_uid: TaskUid,
}

/// Error attached to a failed task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskErrorInfo {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
}

/// `GET /tasks/{uid}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInfo {
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskErrorInfo>,
}

/// `GET /indexes/{name}/stats` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    #[serde(rename = "numberOfDocuments")]
    pub number_of_documents: u64,
    /// Older service versions omit the size; it then reads as zero
    #[serde(rename = "rawDocumentDbSize", alias = "rawDocumentDbSizeBytes", default)]
    pub raw_document_db_size: u64,
}

/// `POST /indexes` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIndexRequest<'a> {
    pub uid: &'a str,
    #[serde(rename = "primaryKey")]
    pub primary_key: &'a str,
}

/// `POST /indexes/{name}/search` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest<'a> {
    pub q: &'a str,
}
