//! The `run` and `split` subcommands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use indexbench_harness::{split_dataset, Benchmark, Dataset, ReportEmitter, ReportPaths};
use indexbench_search_client::{IndexingService, SearchClient};
use tracing::{info, warn};

use crate::config::{BenchConfig, SplitArgs};
use crate::error::BenchError;

/// Run the benchmark described by `config` and write its reports.
///
/// Nothing is written unless every iteration succeeds.
pub async fn run(config: &BenchConfig) -> Result<ReportPaths> {
    let settings = config.settings()?;
    let client = SearchClient::new(config.client_config()?).map_err(BenchError::from)?;
    info!(host = client.base_url(), index = %settings.index_name, "Connecting to search service");

    let dataset = Dataset::load(&config.dataset)
        .with_context(|| format!("Failed to load dataset {:?}", config.dataset))?;

    let service: Arc<dyn IndexingService> = Arc::new(client);
    let report = Benchmark::new(service, settings)
        .run(&dataset)
        .await
        .context("Benchmark run failed")?;

    let unconfirmed = report.low_confidence().count();
    if unconfirmed > 0 {
        warn!(
            unconfirmed,
            "some iterations timed out and were assumed complete; their timings are upper bounds"
        );
    }

    let paths = ReportEmitter::new(&config.output_dir)
        .write_all(&report)
        .with_context(|| format!("Failed to write reports to {:?}", config.output_dir))?;

    info!("Stats saved to {}", paths.stats.display());
    Ok(paths)
}

/// Write one prefix file per fraction next to the dataset.
pub fn split(args: &SplitArgs) -> Result<Vec<PathBuf>> {
    let fractions = args.fraction_sequence()?;
    let input = args.input_path();

    let written = split_dataset(&input, args.output_dir(), &fractions)
        .with_context(|| format!("Failed to split {:?}", input))?;

    info!(files = written.len(), "Dataset split complete");
    Ok(written)
}
