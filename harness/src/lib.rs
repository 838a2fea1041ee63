//! Benchmark harness for a document-indexing service.
//!
//! Rebuilds one index from growing prefixes of a dataset, measures how long
//! each build takes and how large the index gets, then fits a linear cost
//! model over the series and probes query latency on the final index.
//!
//! The pieces can be used on their own:
//! - [`BatchRunner`]: one reset/ingest/measure cycle
//! - [`LatencyProber`]: a concurrent burst of timed searches
//! - [`trend::fit`]: least-squares fit over batch results
//! - [`ReportEmitter`]: CSV/TXT/JSON artifacts
//!
//! or driven together by [`Benchmark`].

pub mod dataset;
pub mod driver;
pub mod error;
pub mod prober;
pub mod report;
pub mod runner;
pub mod trend;

pub use dataset::{split_dataset, Dataset};
pub use driver::{Benchmark, BenchmarkReport, BenchmarkSettings};
pub use error::{HarnessError, HarnessResult};
pub use prober::{LatencyProber, FAILED_PROBE};
pub use report::{ReportEmitter, ReportPaths};
pub use runner::BatchRunner;
pub use trend::{TrendError, TrendOptions};
