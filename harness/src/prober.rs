//! Concurrent search-latency probing.

use std::sync::Arc;
use std::time::Instant;

use common::{IndexName, LatencyStats};
use indexbench_search_client::IndexingService;
use tokio::sync::Barrier;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{HarnessError, HarnessResult};

/// Recorded for a probe that failed; dominates `max`, never hides in `min`.
pub const FAILED_PROBE: f64 = f64::INFINITY;

/// Fires bursts of identical queries at one index.
pub struct LatencyProber {
    service: Arc<dyn IndexingService>,
    index: IndexName,
}

impl LatencyProber {
    pub fn new(service: Arc<dyn IndexingService>, index: IndexName) -> Self {
        Self { service, index }
    }

    /// Issue exactly `concurrency` searches at once and reduce their timings.
    ///
    /// Every worker waits on a shared barrier so the requests leave together,
    /// and all workers are joined before the reduction. A non-2xx answer or a
    /// transport failure counts as [`FAILED_PROBE`].
    pub async fn measure_latency(
        &self,
        query: &str,
        concurrency: usize,
    ) -> HarnessResult<LatencyStats> {
        if concurrency == 0 {
            return Err(HarnessError::Config("probe concurrency must be at least 1".to_string()));
        }

        let barrier = Arc::new(Barrier::new(concurrency));
        let query: Arc<str> = Arc::from(query);
        let mut workers = JoinSet::new();

        for probe in 0..concurrency {
            let service = self.service.clone();
            let index = self.index.clone();
            let query = query.clone();
            let barrier = barrier.clone();

            workers.spawn(async move {
                barrier.wait().await;
                let started = Instant::now();
                match service.search(&index, &query).await {
                    Ok(outcome) if outcome.is_success() => started.elapsed().as_secs_f64(),
                    Ok(outcome) => {
                        warn!(probe, status = outcome.status, "search probe failed");
                        FAILED_PROBE
                    }
                    Err(e) => {
                        warn!(probe, error = %e, "search probe failed");
                        FAILED_PROBE
                    }
                }
            });
        }

        let mut samples = Vec::with_capacity(concurrency);
        while let Some(sample) = workers.join_next().await {
            samples.push(sample?);
        }
        debug!(?samples, "probe burst finished");

        LatencyStats::from_samples(&samples)
            .ok_or_else(|| HarnessError::Config("probe burst produced no samples".to_string()))
    }
}
