//! Bounded polling for asynchronous task completion.
//!
//! A slow task never hangs the caller: once `timeout` elapses the waiter logs
//! a degraded-mode warning, sleeps `grace_period` so the service can catch up
//! in the background, and reports [`Confidence::AssumedComplete`].

use std::time::{Duration, Instant};

use common::{Confidence, TaskUid};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::wire::TaskStatus;
use crate::IndexingService;

/// How long and how often to poll a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Extra delay applied after a timeout before measurements are taken
    pub grace_period: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
            grace_period: Duration::from_secs(10),
        }
    }
}

/// Result of waiting on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub task: TaskUid,
    pub confidence: Confidence,
    /// Status requests issued
    pub polls: u32,
    /// Wall time spent waiting, grace period included
    pub waited: Duration,
}

impl Completion {
    /// True when the wait ran out and the grace period was applied.
    pub fn timed_out(&self) -> bool {
        !self.confidence.is_confirmed()
    }
}

/// Poll `task` until it reaches a terminal state or `policy.timeout` elapses.
///
/// # Errors
/// - `TaskFailed` when the task ends as `failed` or `canceled`
/// - any transport error from a status request
///
/// A timeout is not an error.
pub async fn await_completion(
    service: &dyn IndexingService,
    task: TaskUid,
    policy: &WaitPolicy,
) -> Result<Completion> {
    let started = Instant::now();
    // A timeout too large to represent never expires
    let deadline = started.checked_add(policy.timeout);
    let mut polls = 0u32;

    loop {
        let info = service.task_status(task).await?;
        polls += 1;

        match info.status {
            TaskStatus::Succeeded => {
                debug!(task = %task, polls, "task succeeded");
                return Ok(Completion {
                    task,
                    confidence: Confidence::Confirmed,
                    polls,
                    waited: started.elapsed(),
                });
            }
            TaskStatus::Failed | TaskStatus::Canceled => {
                let error = info.error.unwrap_or_default();
                return Err(ClientError::TaskFailed {
                    task,
                    status: info.status,
                    code: (!error.code.is_empty()).then_some(error.code),
                    message: error.message,
                });
            }
            TaskStatus::Enqueued | TaskStatus::Processing => {}
        }

        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                policy.poll_interval.min(deadline - now)
            }
            None => policy.poll_interval,
        };
        tokio::time::sleep(pause).await;
    }

    warn!(
        task = %task,
        timeout_s = policy.timeout.as_secs_f64(),
        grace_s = policy.grace_period.as_secs_f64(),
        "Task did not finish in time; it may still be processing in the background. \
         Applying grace period, measurements for this batch may be inaccurate"
    );
    tokio::time::sleep(policy.grace_period).await;

    Ok(Completion {
        task,
        confidence: Confidence::AssumedComplete,
        polls,
        waited: started.elapsed(),
    })
}
