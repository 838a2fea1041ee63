//! Measurement records produced by a benchmark run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::fraction::DatasetFraction;

/// Bytes in one mebibyte; reports express sizes in MB like the service dashboards do.
pub const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Whether an ingestion task was observed to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// The task reached `succeeded` within the wait bound.
    Confirmed,
    /// The wait timed out and a grace period was applied instead.
    AssumedComplete,
}

impl Confidence {
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::AssumedComplete => write!(f, "assumed_complete"),
        }
    }
}

/// Outcome of one fraction's build cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub fraction: DatasetFraction,
    /// Documents the service reports after ingestion
    pub document_count: u64,
    /// Documents the harness submitted
    pub submitted_count: u64,
    pub index_size_bytes: u64,
    #[serde(with = "crate::duration_secs")]
    pub ingest_duration: Duration,
    pub confidence: Confidence,
}

impl BatchResult {
    pub fn index_size_mb(&self) -> f64 {
        self.index_size_bytes as f64 / BYTES_PER_MIB
    }

    /// Ingest seconds per MB of index. `None` for an empty index.
    pub fn time_per_size(&self) -> Option<f64> {
        if self.index_size_bytes == 0 {
            None
        } else {
            Some(self.ingest_duration.as_secs_f64() / self.index_size_mb())
        }
    }
}

/// Aggregate round-trip latency of a probe burst, in seconds.
///
/// Failed probes are recorded as `f64::INFINITY`; any infinite value here
/// means the burst included a failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    #[serde(rename = "avg_response_time_s", with = "crate::lossy_f64")]
    pub mean: f64,
    #[serde(rename = "min_response_time_s", with = "crate::lossy_f64")]
    pub min: f64,
    #[serde(rename = "max_response_time_s", with = "crate::lossy_f64")]
    pub max: f64,
    pub samples: usize,
    pub failures: usize,
}

impl LatencyStats {
    /// Reduce raw per-probe seconds into mean/min/max.
    ///
    /// Returns `None` for an empty sample set.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let sum: f64 = samples.iter().sum();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let failures = samples.iter().filter(|s| s.is_infinite()).count();

        Some(Self {
            mean: sum / samples.len() as f64,
            min,
            max,
            samples: samples.len(),
            failures,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures > 0
    }
}

/// CPU and memory of the harness process at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub cpu_percent: f32,
    pub resident_memory_bytes: u64,
    /// Length of the CPU measurement window
    #[serde(rename = "cpu_window_s", with = "crate::duration_secs")]
    pub window: Duration,
    /// False when the window was too short for a meaningful CPU reading
    pub reliable: bool,
}

impl ResourceSnapshot {
    pub fn resident_memory_mb(&self) -> f64 {
        self.resident_memory_bytes as f64 / BYTES_PER_MIB
    }
}

/// Ordinary least-squares line `ingest_seconds = slope * size_bytes + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    /// Seconds per byte
    pub slope: f64,
    /// Seconds
    pub intercept: f64,
    /// Number of results the line was fitted over
    pub points: usize,
}

impl TrendModel {
    /// Predicted ingest seconds for an index of `size_bytes`.
    pub fn predict(&self, size_bytes: u64) -> f64 {
        self.slope * size_bytes as f64 + self.intercept
    }

    /// Human-readable equation, scaled to MB so the slope is legible.
    pub fn equation(&self) -> String {
        format!(
            "ingest_time_s = {:.4} * index_size_mb + {:.4}",
            self.slope * BYTES_PER_MIB,
            self.intercept
        )
    }
}

impl std::fmt::Display for TrendModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.equation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(size: u64, secs: f64) -> BatchResult {
        BatchResult {
            fraction: DatasetFraction::full(),
            document_count: 10,
            submitted_count: 10,
            index_size_bytes: size,
            ingest_duration: Duration::from_secs_f64(secs),
            confidence: Confidence::Confirmed,
        }
    }

    #[test]
    fn test_time_per_size() {
        let r = result(2 * 1024 * 1024, 3.0);
        assert!((r.time_per_size().unwrap() - 1.5).abs() < 1e-9);
        assert_eq!(result(0, 3.0).time_per_size(), None);
    }

    #[test]
    fn test_latency_reduction() {
        let stats = LatencyStats::from_samples(&[0.1, 0.2, 0.3]).unwrap();
        assert!((stats.mean - 0.2).abs() < 1e-9);
        assert_eq!(stats.min, 0.1);
        assert_eq!(stats.max, 0.3);
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.failures, 0);
        assert!(LatencyStats::from_samples(&[]).is_none());
    }

    #[test]
    fn test_latency_sentinel_dominates_max_only() {
        let stats = LatencyStats::from_samples(&[0.1, f64::INFINITY, 0.3]).unwrap();
        assert!(stats.max.is_infinite());
        assert_eq!(stats.min, 0.1);
        assert_eq!(stats.failures, 1);
        assert!(stats.has_failures());
    }

    #[test]
    fn test_latency_serializes_infinity_as_text() {
        let stats = LatencyStats::from_samples(&[f64::INFINITY]).unwrap();
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["max_response_time_s"], "inf");

        let back: LatencyStats = serde_json::from_value(json).unwrap();
        assert!(back.mean.is_infinite());
    }

    #[test]
    fn test_trend_equation_uses_mb() {
        let model = TrendModel {
            slope: 2.0 / BYTES_PER_MIB,
            intercept: 0.5,
            points: 3,
        };
        assert_eq!(model.equation(), "ingest_time_s = 2.0000 * index_size_mb + 0.5000");
        assert!((model.predict(1024 * 1024) - 2.5).abs() < 1e-9);
    }
}
