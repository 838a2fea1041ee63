//! Client for a Meilisearch-compatible document-indexing service.
//!
//! # Architecture
//!
//! ```text
//! SearchClient ──implements──► IndexingService ◄── ManagedIndex (lifecycle)
//!                                    ▲
//!                                    └── await_completion (bounded polling)
//! ```
//!
//! The harness only sees [`IndexingService`], so any backend with the same
//! semantics can be benchmarked, and tests can point the real client at the
//! in-process mock (`test-helpers` feature).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use indexbench_search_client::{ClientConfig, ManagedIndex, SearchClient, WaitPolicy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(SearchClient::new(ClientConfig::new("http://localhost:7700"))?);
//! let mut index = ManagedIndex::new(client, "cities".into(), "geonameid");
//!
//! index.reset().await?;
//! let docs = vec![serde_json::json!({"geonameid": 1, "name": "Warsaw"})];
//! let completion = index.ingest(&docs, &WaitPolicy::default()).await?;
//! println!("{:?} after {} polls", completion.confidence, completion.polls);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod lifecycle;
pub mod waiter;
pub mod wire;

#[cfg(feature = "test-helpers")]
pub mod mock;

pub use client::{ClientConfig, SearchClient};
pub use error::{ClientError, Result};
pub use lifecycle::{reset_index, IndexLifecycle, ManagedIndex, ResetPolicy};
pub use waiter::{await_completion, Completion, WaitPolicy};
pub use wire::{IndexStats, TaskInfo, TaskStatus};

use async_trait::async_trait;
use common::{IndexName, TaskUid};
use serde_json::Value;

/// What a delete request found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Deleted, possibly asynchronously via the given task
    Deleted(Option<TaskUid>),
    /// The index did not exist
    NotFound,
}

/// HTTP status of a search round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub status: u16,
}

impl SearchOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Index lifecycle, ingestion and query operations of the service.
///
/// Errors are transport or contract failures. A search answered with a
/// non-2xx status is *not* an error; the status is returned for the caller
/// to judge.
#[async_trait]
pub trait IndexingService: Send + Sync {
    /// Delete an index. A missing index is reported, not raised.
    async fn delete_index(&self, name: &IndexName) -> Result<DeleteOutcome>;

    /// Create an index with the given primary key.
    async fn create_index(&self, name: &IndexName, primary_key: &str) -> Result<Option<TaskUid>>;

    /// Enqueue documents for ingestion. Returns without waiting.
    async fn submit_documents(&self, name: &IndexName, batch: &[Value]) -> Result<TaskUid>;

    /// Current state of an asynchronous task.
    async fn task_status(&self, task: TaskUid) -> Result<TaskInfo>;

    /// Document count and on-disk size.
    async fn get_stats(&self, name: &IndexName) -> Result<IndexStats>;

    /// Run one query and read the full response.
    async fn search(&self, name: &IndexName, query: &str) -> Result<SearchOutcome>;
}
