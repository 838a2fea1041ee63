//! Lifecycle of the single index a benchmark owns.
//!
//! ```text
//!   Absent ──reset──► Created ──ingest──► Populated
//!     ▲                                      │
//!     └──────────────── reset ───────────────┘
//! ```
//!
//! `reset` always issues a delete, whatever the tracked state, because a
//! previous run may have left the index behind.

use std::sync::Arc;
use std::time::Duration;

use common::IndexName;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::waiter::{await_completion, Completion, WaitPolicy};
use crate::wire::IndexStats;
use crate::{DeleteOutcome, IndexingService};

/// Service error code for a delete that raced with an already-missing index.
const INDEX_NOT_FOUND: &str = "index_not_found";

/// Tracked state of the remote index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexLifecycle {
    Absent,
    Created,
    Populated,
}

impl IndexLifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Created => "created",
            Self::Populated => "populated",
        }
    }
}

impl std::fmt::Display for IndexLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to let index deletion and creation settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetPolicy {
    /// Fixed pause used when the service returns no task to wait on
    pub settle_delay: Duration,
    /// Bounded wait on delete/create tasks
    pub settle_wait: WaitPolicy,
}

impl Default for ResetPolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            settle_wait: WaitPolicy {
                timeout: Duration::from_secs(10),
                poll_interval: Duration::from_millis(100),
                grace_period: Duration::from_secs(1),
            },
        }
    }
}

/// Delete `name` if present, let the deletion settle, then recreate it.
///
/// Only "index does not exist" is tolerated, whether the service reports it
/// as a 404 or as a failed deletion task. Every other failure propagates.
pub async fn reset_index(
    service: &dyn IndexingService,
    name: &IndexName,
    primary_key: &str,
    policy: &ResetPolicy,
) -> Result<()> {
    match service.delete_index(name).await? {
        DeleteOutcome::NotFound => {}
        DeleteOutcome::Deleted(Some(task)) => {
            match await_completion(service, task, &policy.settle_wait).await {
                Ok(_) => {}
                Err(e) if e.task_error_code() == Some(INDEX_NOT_FOUND) => {
                    debug!(index = %name, "deletion task reports index already absent");
                }
                Err(e) => return Err(e),
            }
        }
        DeleteOutcome::Deleted(None) => tokio::time::sleep(policy.settle_delay).await,
    }

    if let Some(task) = service.create_index(name, primary_key).await? {
        await_completion(service, task, &policy.settle_wait).await?;
    }

    debug!(index = %name, primary_key, "index recreated");
    Ok(())
}

/// The index a benchmark run owns exclusively.
pub struct ManagedIndex {
    service: Arc<dyn IndexingService>,
    name: IndexName,
    primary_key: String,
    reset_policy: ResetPolicy,
    state: IndexLifecycle,
}

impl ManagedIndex {
    pub fn new(
        service: Arc<dyn IndexingService>,
        name: IndexName,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            service,
            name,
            primary_key: primary_key.into(),
            reset_policy: ResetPolicy::default(),
            state: IndexLifecycle::Absent,
        }
    }

    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    pub fn name(&self) -> &IndexName {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn state(&self) -> IndexLifecycle {
        self.state
    }

    pub fn service(&self) -> &Arc<dyn IndexingService> {
        &self.service
    }

    /// Any state → Absent → Created. Destroys all documents.
    pub async fn reset(&mut self) -> Result<()> {
        info!(index = %self.name, from = %self.state, "resetting index");
        self.state = IndexLifecycle::Absent;
        reset_index(
            self.service.as_ref(),
            &self.name,
            &self.primary_key,
            &self.reset_policy,
        )
        .await?;
        self.state = IndexLifecycle::Created;
        Ok(())
    }

    /// Created → Populated. Submits `batch` and waits for it.
    ///
    /// A timed-out wait still moves to Populated; the returned completion
    /// carries the lower confidence.
    pub async fn ingest(&mut self, batch: &[Value], wait: &WaitPolicy) -> Result<Completion> {
        self.require(IndexLifecycle::Created, "ingest")?;

        let task = self.service.submit_documents(&self.name, batch).await?;
        let completion = await_completion(self.service.as_ref(), task, wait).await?;
        self.state = IndexLifecycle::Populated;
        Ok(completion)
    }

    /// Document count and size. Only meaningful once populated.
    pub async fn stats(&self) -> Result<IndexStats> {
        self.require(IndexLifecycle::Populated, "read stats")?;
        self.service.get_stats(&self.name).await
    }

    fn require(&self, expected: IndexLifecycle, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ClientError::InvalidTransition {
                action,
                state: self.state.as_str(),
            })
        }
    }
}
