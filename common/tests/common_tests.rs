//! Tests for the common crate
//!
//! Covers the fraction prefix rules the harness relies on and the report
//! shape of the measurement records.

use common::{
    BatchResult, CommonError, Confidence, DatasetFraction, FractionSequence, LatencyStats,
};
use std::time::Duration;

#[test]
fn test_prefixes_are_monotonic_subsets() {
    let total = 1000;
    let seq = FractionSequence::deciles();
    let lens: Vec<usize> = seq.iter().map(|f| f.prefix_len(total)).collect();

    for pair in lens.windows(2) {
        assert!(pair[0] < pair[1], "prefix lengths must strictly grow: {:?}", lens);
    }
    assert_eq!(lens.last().copied(), Some(total));
}

#[test]
fn test_invalid_sequences_are_rejected() {
    assert!(matches!(
        FractionSequence::from_percents(&[10, 0]),
        Err(CommonError::InvalidFraction(0))
    ));
    assert!(matches!(
        FractionSequence::from_percents(&[30, 20]),
        Err(CommonError::InvalidSequence(_))
    ));
}

#[test]
fn test_batch_result_serializes_seconds() {
    let result = BatchResult {
        fraction: DatasetFraction::new(50).unwrap(),
        document_count: 500,
        submitted_count: 500,
        index_size_bytes: 1024,
        ingest_duration: Duration::from_millis(1500),
        confidence: Confidence::AssumedComplete,
    };

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["fraction"], 50);
    assert_eq!(json["ingest_duration"], 1.5);
    assert_eq!(json["confidence"], "assumed_complete");
}

#[test]
fn test_latency_invariants_hold_for_finite_samples() {
    let samples = [0.05, 0.02, 0.09, 0.04, 0.07];
    let stats = LatencyStats::from_samples(&samples).unwrap();

    assert_eq!(stats.samples, 5);
    assert!(stats.mean >= stats.min);
    assert!(stats.max >= stats.mean);
}

#[test]
fn test_all_failed_probes_are_infinite() {
    let stats = LatencyStats::from_samples(&[f64::INFINITY; 5]).unwrap();
    assert!(stats.mean.is_infinite());
    assert!(stats.min.is_infinite());
    assert!(stats.max.is_infinite());
    assert_eq!(stats.failures, 5);
}
