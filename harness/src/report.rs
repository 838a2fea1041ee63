//! CSV, text and JSON export of a finished run.
//!
//! Files are written to a hidden temporary sibling first and renamed into
//! place, so a crash mid-write never leaves a truncated artifact behind.
//! [`ReportEmitter::write_all`] stages all three before renaming any.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use common::{BatchResult, Confidence, LatencyStats, ResourceSnapshot};
use serde::Serialize;
use tracing::info;

use crate::driver::BenchmarkReport;
use crate::error::HarnessResult;

pub const STATS_FILE: &str = "indexing_stats.csv";
pub const TREND_FILE: &str = "trend_analysis.txt";
pub const MONITORING_FILE: &str = "resource_monitoring.json";

/// Paths of the artifacts written by [`ReportEmitter::write_all`].
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub stats: PathBuf,
    pub trend: PathBuf,
    pub monitoring: PathBuf,
}

#[derive(Debug, Serialize)]
struct StatsRow {
    fraction: u32,
    document_count: u64,
    submitted_count: u64,
    index_size_bytes: u64,
    index_size_mb: f64,
    ingest_time_s: f64,
    time_per_size: Option<f64>,
    confidence: Confidence,
}

impl From<&BatchResult> for StatsRow {
    fn from(r: &BatchResult) -> Self {
        Self {
            fraction: r.fraction.percent(),
            document_count: r.document_count,
            submitted_count: r.submitted_count,
            index_size_bytes: r.index_size_bytes,
            index_size_mb: r.index_size_mb(),
            ingest_time_s: r.ingest_duration.as_secs_f64(),
            time_per_size: r.time_per_size(),
            confidence: r.confidence,
        }
    }
}

#[derive(Debug, Serialize)]
struct Monitoring<'a> {
    #[serde(flatten)]
    resources: &'a ResourceSnapshot,
    ram_mb: f64,
    #[serde(flatten)]
    latency: &'a LatencyStats,
    query: &'a str,
    concurrency: usize,
    generated_at: DateTime<Utc>,
}

/// Writes the three run artifacts into one directory.
pub struct ReportEmitter {
    output_dir: PathBuf,
}

impl ReportEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write all three artifacts, or none of them.
    ///
    /// Every file is staged before any is renamed into place; a failure at
    /// any point removes whatever this call already produced.
    pub fn write_all(&self, report: &BenchmarkReport) -> HarnessResult<ReportPaths> {
        std::fs::create_dir_all(&self.output_dir)?;

        let stats = self.stage_stats(&report.results)?;
        let trend = match self.stage_trend(report) {
            Ok(trend) => trend,
            Err(e) => {
                stats.discard();
                return Err(e);
            }
        };
        let monitoring = match self.stage_monitoring(report) {
            Ok(monitoring) => monitoring,
            Err(e) => {
                stats.discard();
                trend.discard();
                return Err(e);
            }
        };

        let stats = match stats.commit() {
            Ok(path) => path,
            Err(e) => {
                trend.discard();
                monitoring.discard();
                return Err(e.into());
            }
        };
        let trend = match trend.commit() {
            Ok(path) => path,
            Err(e) => {
                let _ = std::fs::remove_file(&stats);
                monitoring.discard();
                return Err(e.into());
            }
        };
        let monitoring = match monitoring.commit() {
            Ok(path) => path,
            Err(e) => {
                let _ = std::fs::remove_file(&stats);
                let _ = std::fs::remove_file(&trend);
                return Err(e.into());
            }
        };

        info!(dir = %self.output_dir.display(), "reports written");
        Ok(ReportPaths {
            stats,
            trend,
            monitoring,
        })
    }

    /// One row per fraction plus the derived `time_per_size`.
    pub fn write_stats(&self, results: &[BatchResult]) -> HarnessResult<PathBuf> {
        Ok(self.stage_stats(results)?.commit()?)
    }

    pub fn write_trend(&self, report: &BenchmarkReport) -> HarnessResult<PathBuf> {
        Ok(self.stage_trend(report)?.commit()?)
    }

    /// Latest resource snapshot merged with the latency stats.
    pub fn write_monitoring(&self, report: &BenchmarkReport) -> HarnessResult<PathBuf> {
        Ok(self.stage_monitoring(report)?.commit()?)
    }

    fn stage_stats(&self, results: &[BatchResult]) -> HarnessResult<Staged> {
        self.stage(STATS_FILE, |file| {
            let mut writer = csv::Writer::from_writer(file);
            for result in results {
                writer.serialize(StatsRow::from(result))?;
            }
            writer.flush()?;
            Ok(())
        })
    }

    fn stage_trend(&self, report: &BenchmarkReport) -> HarnessResult<Staged> {
        let line = report.trend_line();
        self.stage(TREND_FILE, |file| {
            writeln!(file, "{}", line)?;
            Ok(())
        })
    }

    fn stage_monitoring(&self, report: &BenchmarkReport) -> HarnessResult<Staged> {
        let monitoring = Monitoring {
            resources: &report.resources,
            ram_mb: report.resources.resident_memory_mb(),
            latency: &report.latency,
            query: &report.query,
            concurrency: report.concurrency,
            generated_at: Utc::now(),
        };
        self.stage(MONITORING_FILE, |file| {
            serde_json::to_writer_pretty(&mut *file, &monitoring)?;
            writeln!(file)?;
            Ok(())
        })
    }

    /// Write `name` to a hidden sibling; nothing is visible until `commit`.
    fn stage<F>(&self, name: &str, write: F) -> HarnessResult<Staged>
    where
        F: FnOnce(&mut BufWriter<File>) -> HarnessResult<()>,
    {
        let staged = Staged {
            staging: self.output_dir.join(format!(".{}.tmp", name)),
            target: self.output_dir.join(name),
        };

        if let Err(e) = write_synced(&staged.staging, write) {
            staged.discard();
            return Err(e);
        }
        Ok(staged)
    }
}

/// A fully written file waiting to be renamed over its target.
struct Staged {
    staging: PathBuf,
    target: PathBuf,
}

impl Staged {
    fn commit(self) -> std::io::Result<PathBuf> {
        if let Err(e) = std::fs::rename(&self.staging, &self.target) {
            let _ = std::fs::remove_file(&self.staging);
            return Err(e);
        }
        Ok(self.target)
    }

    fn discard(self) {
        let _ = std::fs::remove_file(&self.staging);
    }
}

fn write_synced<F>(path: &Path, write: F) -> HarnessResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> HarnessResult<()>,
{
    let mut file = BufWriter::new(File::create(path)?);
    write(&mut file)?;
    file.flush()?;
    file.get_ref().sync_all()?;
    Ok(())
}
