//! One reset → ingest → measure cycle per dataset fraction.

use std::time::Instant;

use common::{BatchResult, DatasetFraction};
use indexbench_search_client::{ManagedIndex, WaitPolicy};
use tracing::{info, warn};

use crate::dataset::Dataset;
use crate::error::HarnessResult;

/// Runs benchmark iterations against the index it owns.
///
/// Iterations take `&mut self`, so two of them can never overlap on the
/// shared index.
pub struct BatchRunner {
    index: ManagedIndex,
    wait: WaitPolicy,
}

impl BatchRunner {
    pub fn new(index: ManagedIndex, wait: WaitPolicy) -> Self {
        Self { index, wait }
    }

    pub fn index(&self) -> &ManagedIndex {
        &self.index
    }

    pub fn into_index(self) -> ManagedIndex {
        self.index
    }

    /// Index the `fraction` prefix of `dataset` into a freshly reset index.
    ///
    /// The duration covers submission plus waiting (and any grace period),
    /// not the reset.
    pub async fn run_iteration(
        &mut self,
        fraction: DatasetFraction,
        dataset: &Dataset,
    ) -> HarnessResult<BatchResult> {
        let batch = dataset.prefix(fraction);
        info!(fraction = %fraction, documents = batch.len(), "Indexing {} of dataset...", fraction);

        self.index.reset().await?;

        let started = Instant::now();
        let completion = self.index.ingest(batch, &self.wait).await?;
        let ingest_duration = started.elapsed();

        let stats = self.index.stats().await?;

        let result = BatchResult {
            fraction,
            document_count: stats.number_of_documents,
            submitted_count: batch.len() as u64,
            index_size_bytes: stats.raw_document_db_size,
            ingest_duration,
            confidence: completion.confidence,
        };

        if result.document_count != result.submitted_count {
            warn!(
                fraction = %fraction,
                submitted = result.submitted_count,
                indexed = result.document_count,
                "service reports a different document count than submitted"
            );
        }
        info!(
            fraction = %fraction,
            confidence = %result.confidence,
            "  Docs: {}, Size: {:.2} MB, Time: {:.2} s",
            result.document_count,
            result.index_size_mb(),
            result.ingest_duration.as_secs_f64()
        );

        Ok(result)
    }
}
