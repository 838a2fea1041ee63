//! Least-squares trend of ingestion time against index size.

use common::{BatchResult, TrendModel};
use thiserror::Error;
use tracing::debug;

/// Why no trend could be fitted. Not fatal to a run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrendError {
    #[error("insufficient data ({0})")]
    InsufficientData(String),
}

/// Which results take part in the fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrendOptions {
    /// Drop results whose completion was assumed after a timeout
    pub exclude_assumed: bool,
}

/// Fit over every result.
pub fn fit(results: &[BatchResult]) -> Result<TrendModel, TrendError> {
    fit_with(results, TrendOptions::default())
}

/// Degree-1 OLS of ingest seconds on index size bytes.
///
/// Needs at least two points with differing sizes; a flat size series would
/// otherwise yield a meaningless slope.
pub fn fit_with(results: &[BatchResult], options: TrendOptions) -> Result<TrendModel, TrendError> {
    let points: Vec<(f64, f64)> = results
        .iter()
        .filter(|r| !options.exclude_assumed || r.confidence.is_confirmed())
        .map(|r| (r.index_size_bytes as f64, r.ingest_duration.as_secs_f64()))
        .collect();

    if points.len() < 2 {
        return Err(TrendError::InsufficientData(format!(
            "need at least 2 results, got {}",
            points.len()
        )));
    }

    let first_x = points[0].0;
    if points.iter().all(|&(x, _)| x == first_x) {
        return Err(TrendError::InsufficientData(format!(
            "all {} results have the same index size ({} bytes)",
            points.len(),
            first_x
        )));
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), &(x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(TrendError::InsufficientData(
            "fit is numerically ill-conditioned".to_string(),
        ));
    }

    debug!(slope, intercept, points = points.len(), "trend fitted");
    Ok(TrendModel {
        slope,
        intercept,
        points: points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Confidence, DatasetFraction};
    use std::time::Duration;

    fn result(pct: u32, size: u64, secs: f64, confidence: Confidence) -> BatchResult {
        BatchResult {
            fraction: DatasetFraction::new(pct).unwrap(),
            document_count: size / 100,
            submitted_count: size / 100,
            index_size_bytes: size,
            ingest_duration: Duration::from_secs_f64(secs),
            confidence,
        }
    }

    #[test]
    fn test_exact_line_is_recovered() {
        // secs = 0.001 * bytes + 0.5
        let results: Vec<_> = [1000u64, 2000, 4000]
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                result((i as u32 + 1) * 10, b, 0.001 * b as f64 + 0.5, Confidence::Confirmed)
            })
            .collect();

        let model = fit(&results).unwrap();
        assert!((model.slope - 0.001).abs() < 1e-9);
        assert!((model.intercept - 0.5).abs() < 1e-6);
        assert_eq!(model.points, 3);
    }

    #[test]
    fn test_identical_sizes_are_insufficient() {
        let results = vec![
            result(10, 5000, 1.0, Confidence::Confirmed),
            result(20, 5000, 2.0, Confidence::Confirmed),
            result(30, 5000, 3.0, Confidence::Confirmed),
        ];
        assert!(matches!(fit(&results), Err(TrendError::InsufficientData(_))));
    }

    #[test]
    fn test_single_point_is_insufficient() {
        let results = vec![result(100, 5000, 1.0, Confidence::Confirmed)];
        assert!(matches!(fit(&results), Err(TrendError::InsufficientData(_))));
        assert!(matches!(fit(&[]), Err(TrendError::InsufficientData(_))));
    }

    #[test]
    fn test_assumed_points_can_be_excluded() {
        let results = vec![
            result(10, 1000, 1.0, Confidence::Confirmed),
            result(20, 2000, 2.0, Confidence::Confirmed),
            result(30, 3000, 60.0, Confidence::AssumedComplete),
        ];

        let all = fit(&results).unwrap();
        assert_eq!(all.points, 3);

        let confirmed = fit_with(&results, TrendOptions { exclude_assumed: true }).unwrap();
        assert_eq!(confirmed.points, 2);
        assert!((confirmed.slope - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_exclusion_can_leave_too_few_points() {
        let results = vec![
            result(10, 1000, 1.0, Confidence::Confirmed),
            result(20, 2000, 70.0, Confidence::AssumedComplete),
        ];
        let err = fit_with(&results, TrendOptions { exclude_assumed: true }).unwrap_err();
        assert!(matches!(err, TrendError::InsufficientData(_)));
    }
}
