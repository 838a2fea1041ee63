//! End-to-end benchmark runs against the mock service.

mod support;

use common::Confidence;
use indexbench_harness::{Benchmark, HarnessError, TrendError, TrendOptions};
use indexbench_search_client::mock::{IngestMode, MockBehavior, MockSearchService};
use indexbench_search_client::ClientError;
use support::{cities, client_for, fast_settings};

#[tokio::test]
async fn test_three_fraction_run() {
    let mock = MockSearchService::start().await.unwrap();
    let benchmark = Benchmark::new(client_for(&mock), fast_settings(&[10, 50, 100]));

    let report = benchmark.run(&cities(1000)).await.expect("run succeeds");

    let counts: Vec<u64> = report.results.iter().map(|r| r.document_count).collect();
    assert_eq!(counts, vec![100, 500, 1000]);
    assert_eq!(mock.submitted_batches(), vec![100, 500, 1000]);

    for result in &report.results {
        let tps = result.time_per_size().expect("non-empty index");
        assert!(tps > 0.0, "time_per_size must be positive, got {tps}");
        assert_eq!(result.confidence, Confidence::Confirmed);
    }

    let model = report.trend.as_ref().expect("sizes differ, trend is defined");
    assert_eq!(model.points, 3);

    assert_eq!(report.latency.samples, 5);
    assert_eq!(report.latency.failures, 0);
    assert!(report.resources.resident_memory_bytes > 0);
}

#[tokio::test]
async fn test_every_iteration_starts_from_empty_index() {
    let mock = MockSearchService::start().await.unwrap();
    mock.seed_index("cities", 9999);
    let benchmark = Benchmark::new(client_for(&mock), fast_settings(&[20, 40]));

    let report = benchmark.run(&cities(50)).await.unwrap();

    assert_eq!(mock.delete_calls(), 2, "one reset per fraction");
    assert_eq!(report.results[0].document_count, 10);
    assert_eq!(report.results[1].document_count, 20);
}

#[tokio::test]
async fn test_timeouts_are_flagged_not_fatal() {
    let mock = MockSearchService::start_with(MockBehavior {
        ingest: IngestMode::NeverFinish,
        ..MockBehavior::default()
    })
    .await
    .unwrap();
    let benchmark = Benchmark::new(client_for(&mock), fast_settings(&[50, 100]));

    let report = benchmark.run(&cities(100)).await.expect("timeouts degrade gracefully");

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.low_confidence().count(), 2);
    for result in &report.results {
        assert_eq!(result.confidence, Confidence::AssumedComplete);
    }
}

#[tokio::test]
async fn test_excluding_assumed_points_leaves_no_trend() {
    let mock = MockSearchService::start_with(MockBehavior {
        ingest: IngestMode::NeverFinish,
        ..MockBehavior::default()
    })
    .await
    .unwrap();
    let mut settings = fast_settings(&[50, 100]);
    settings.trend = TrendOptions { exclude_assumed: true };
    let benchmark = Benchmark::new(client_for(&mock), settings);

    let report = benchmark.run(&cities(100)).await.unwrap();

    assert!(matches!(report.trend, Err(TrendError::InsufficientData(_))));
    assert!(report.trend_line().starts_with("Trend: insufficient data"));
}

#[tokio::test]
async fn test_failed_ingestion_aborts_run() {
    let mock = MockSearchService::start_with(MockBehavior {
        ingest: IngestMode::Fail,
        ..MockBehavior::default()
    })
    .await
    .unwrap();
    let benchmark = Benchmark::new(client_for(&mock), fast_settings(&[10, 50, 100]));

    let err = benchmark.run(&cities(100)).await.unwrap_err();

    assert!(
        matches!(err, HarnessError::Client(ClientError::TaskFailed { .. })),
        "got {err:?}"
    );
    assert_eq!(mock.submitted_batches().len(), 1, "no iteration after the failure");
}

#[tokio::test]
async fn test_flat_sizes_report_insufficient_data() {
    let mock = MockSearchService::start_with(MockBehavior {
        bytes_per_document: 0,
        ..MockBehavior::default()
    })
    .await
    .unwrap();
    let benchmark = Benchmark::new(client_for(&mock), fast_settings(&[50, 100]));

    let report = benchmark.run(&cities(100)).await.unwrap();

    assert!(matches!(report.trend, Err(TrendError::InsufficientData(_))));
    assert!(report.results.iter().all(|r| r.time_per_size().is_none()));
}

#[tokio::test]
async fn test_zero_concurrency_is_rejected_up_front() {
    let mock = MockSearchService::start().await.unwrap();
    let mut settings = fast_settings(&[100]);
    settings.concurrency = 0;
    let benchmark = Benchmark::new(client_for(&mock), settings);

    let err = benchmark.run(&cities(10)).await.unwrap_err();

    assert!(matches!(err, HarnessError::Config(_)));
    assert_eq!(mock.delete_calls(), 0);
}
