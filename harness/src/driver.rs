//! End-to-end benchmark orchestration.
//!
//! ```text
//! for fraction in fractions (sequential):
//!     BatchRunner::run_iteration ──► BatchResult
//! trend::fit_with(all results)
//! ResourceSampler::sample_self   (blocking pool)
//! LatencyProber::measure_latency (final index state)
//! ```
//!
//! Any iteration error aborts the run before anything is reported.

use std::sync::Arc;
use std::time::Duration;

use common::{BatchResult, FractionSequence, IndexName, LatencyStats, ResourceSnapshot, TrendModel};
use indexbench_hardware::{constants::DEFAULT_CPU_WINDOW, ResourceSampler};
use indexbench_search_client::{IndexingService, ManagedIndex, ResetPolicy, WaitPolicy};
use tracing::{info, warn};

use crate::dataset::Dataset;
use crate::error::{HarnessError, HarnessResult};
use crate::prober::LatencyProber;
use crate::runner::BatchRunner;
use crate::trend::{self, TrendError, TrendOptions};

/// Everything that shapes one run.
#[derive(Debug, Clone)]
pub struct BenchmarkSettings {
    pub index_name: IndexName,
    pub primary_key: String,
    pub fractions: FractionSequence,
    /// Size of the probe burst
    pub concurrency: usize,
    pub query: String,
    pub wait: WaitPolicy,
    pub reset: ResetPolicy,
    pub cpu_window: Duration,
    pub trend: TrendOptions,
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            index_name: IndexName::new("cities"),
            primary_key: "geonameid".to_string(),
            fractions: FractionSequence::deciles(),
            concurrency: 5,
            query: "Warsaw".to_string(),
            wait: WaitPolicy::default(),
            reset: ResetPolicy::default(),
            cpu_window: DEFAULT_CPU_WINDOW,
            trend: TrendOptions::default(),
        }
    }
}

/// Everything a finished run measured.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub total_documents: usize,
    /// One entry per configured fraction, in fraction order
    pub results: Vec<BatchResult>,
    pub trend: Result<TrendModel, TrendError>,
    pub resources: ResourceSnapshot,
    pub latency: LatencyStats,
    pub query: String,
    pub concurrency: usize,
}

impl BenchmarkReport {
    /// `Trend: ...` line for the text report.
    pub fn trend_line(&self) -> String {
        match &self.trend {
            Ok(model) => format!("Trend: {}", model.equation()),
            Err(e) => format!("Trend: {}", e),
        }
    }

    /// Results whose completion was assumed after a timeout.
    pub fn low_confidence(&self) -> impl Iterator<Item = &BatchResult> {
        self.results.iter().filter(|r| !r.confidence.is_confirmed())
    }
}

/// Drives a whole benchmark against one service.
pub struct Benchmark {
    service: Arc<dyn IndexingService>,
    settings: BenchmarkSettings,
}

impl Benchmark {
    pub fn new(service: Arc<dyn IndexingService>, settings: BenchmarkSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &BenchmarkSettings {
        &self.settings
    }

    pub async fn run(&self, dataset: &Dataset) -> HarnessResult<BenchmarkReport> {
        let settings = &self.settings;
        if settings.concurrency == 0 {
            return Err(HarnessError::Config("probe concurrency must be at least 1".to_string()));
        }
        if dataset.is_empty() {
            warn!("dataset is empty; every fraction will index zero documents");
        }
        info!("Total documents: {}", dataset.len());

        let index = ManagedIndex::new(
            self.service.clone(),
            settings.index_name.clone(),
            settings.primary_key.clone(),
        )
        .with_reset_policy(settings.reset);
        let mut runner = BatchRunner::new(index, settings.wait);

        let mut results = Vec::with_capacity(settings.fractions.len());
        for fraction in settings.fractions.iter() {
            results.push(runner.run_iteration(fraction, dataset).await?);
        }

        let trend = trend::fit_with(&results, settings.trend);
        match &trend {
            Ok(model) => info!("Trend: {}", model.equation()),
            Err(e) => warn!("Trend: {}", e),
        }

        info!("Monitoring resources...");
        let window = settings.cpu_window;
        let resources = tokio::task::spawn_blocking(move || {
            ResourceSampler::new()?.with_window(window).sample_self()
        })
        .await??;

        let prober = LatencyProber::new(self.service.clone(), settings.index_name.clone());
        let latency = prober
            .measure_latency(&settings.query, settings.concurrency)
            .await?;

        info!(
            "CPU: {:.1}%, RAM: {:.2} MB",
            resources.cpu_percent,
            resources.resident_memory_mb()
        );
        if latency.has_failures() {
            warn!(
                failures = latency.failures,
                samples = latency.samples,
                "some search probes failed; infinite latencies mark them"
            );
        }
        info!("Avg Response Time: {:.3} s", latency.mean);

        Ok(BenchmarkReport {
            total_documents: dataset.len(),
            results,
            trend,
            resources,
            latency,
            query: settings.query.clone(),
            concurrency: settings.concurrency,
        })
    }
}
