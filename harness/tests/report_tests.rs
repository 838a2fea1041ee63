//! Report artifacts and dataset files on disk.

mod support;

use std::time::Duration;

use common::{
    BatchResult, Confidence, DatasetFraction, FractionSequence, LatencyStats, ResourceSnapshot,
    TrendModel,
};
use indexbench_harness::report::{MONITORING_FILE, STATS_FILE, TREND_FILE};
use indexbench_harness::{
    split_dataset, Benchmark, BenchmarkReport, Dataset, HarnessError, ReportEmitter, TrendError,
};
use indexbench_search_client::mock::MockSearchService;
use serde_json::{json, Value};
use support::{cities, client_for, fast_settings};
use tempfile::TempDir;

fn sample_report(trend: Result<TrendModel, TrendError>) -> BenchmarkReport {
    let results = [(10, 1024 * 1024), (100, 4 * 1024 * 1024)]
        .iter()
        .map(|&(pct, size)| BatchResult {
            fraction: DatasetFraction::new(pct).unwrap(),
            document_count: pct as u64 * 10,
            submitted_count: pct as u64 * 10,
            index_size_bytes: size,
            ingest_duration: Duration::from_secs(2),
            confidence: Confidence::Confirmed,
        })
        .collect();

    BenchmarkReport {
        total_documents: 1000,
        results,
        trend,
        resources: ResourceSnapshot {
            cpu_percent: 12.5,
            resident_memory_bytes: 64 * 1024 * 1024,
            window: Duration::from_secs(1),
            reliable: true,
        },
        latency: LatencyStats::from_samples(&[0.01, f64::INFINITY]).unwrap(),
        query: "Warsaw".to_string(),
        concurrency: 2,
    }
}

#[test]
fn test_write_all_produces_three_artifacts() {
    let dir = TempDir::new().unwrap();
    let report = sample_report(Ok(TrendModel {
        slope: 1.0 / (1024.0 * 1024.0),
        intercept: 0.25,
        points: 2,
    }));

    let paths = ReportEmitter::new(dir.path()).write_all(&report).unwrap();

    let csv = std::fs::read_to_string(&paths.stats).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("fraction,document_count,submitted_count,index_size_bytes,index_size_mb,ingest_time_s,time_per_size,confidence")
    );
    assert_eq!(lines.next(), Some("10,100,100,1048576,1.0,2.0,2.0,confirmed"));
    assert_eq!(lines.next(), Some("100,1000,1000,4194304,4.0,2.0,0.5,confirmed"));

    let trend = std::fs::read_to_string(&paths.trend).unwrap();
    assert_eq!(trend, "Trend: ingest_time_s = 1.0000 * index_size_mb + 0.2500\n");

    let monitoring: Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.monitoring).unwrap()).unwrap();
    assert_eq!(monitoring["cpu_percent"], 12.5);
    assert_eq!(monitoring["ram_mb"], 64.0);
    assert_eq!(monitoring["min_response_time_s"], 0.01);
    assert_eq!(monitoring["max_response_time_s"], "inf");
    assert_eq!(monitoring["failures"], 1);
    assert!(monitoring["generated_at"].is_string());

    // No staging files left behind
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_insufficient_trend_is_written_as_text() {
    let dir = TempDir::new().unwrap();
    let report = sample_report(Err(TrendError::InsufficientData("need at least 2 results, got 1".into())));

    let path = ReportEmitter::new(dir.path()).write_trend(&report).unwrap();

    let text = std::fs::read_to_string(path).unwrap();
    assert_eq!(text, "Trend: insufficient data (need at least 2 results, got 1)\n");
}

#[test]
fn test_failed_write_leaves_no_artifacts() {
    let dir = TempDir::new().unwrap();
    // A directory in the way makes the last rename fail
    let blocker = dir.path().join(MONITORING_FILE);
    std::fs::create_dir(&blocker).unwrap();
    std::fs::write(blocker.join("keep"), "x").unwrap();
    let report = sample_report(Err(TrendError::InsufficientData("flat sizes".into())));

    let result = ReportEmitter::new(dir.path()).write_all(&report);

    assert!(result.is_err());
    assert!(!dir.path().join(STATS_FILE).exists());
    assert!(!dir.path().join(TREND_FILE).exists());
    let staged: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(staged.is_empty());
}

#[tokio::test]
async fn test_run_then_report_end_to_end() {
    let mock = MockSearchService::start().await.unwrap();
    let dir = TempDir::new().unwrap();
    let benchmark = Benchmark::new(client_for(&mock), fast_settings(&[10, 50, 100]));

    let report = benchmark.run(&cities(1000)).await.unwrap();
    ReportEmitter::new(dir.path()).write_all(&report).unwrap();

    let csv = std::fs::read_to_string(dir.path().join(STATS_FILE)).unwrap();
    assert_eq!(csv.lines().count(), 4, "header plus one row per fraction");
    assert!(dir.path().join(TREND_FILE).exists());
    assert!(dir.path().join(MONITORING_FILE).exists());
}

#[test]
fn test_split_writes_nested_prefix_files() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("world-cities.json");
    let records: Vec<Value> = (0..20).map(|i| json!({ "geonameid": i, "name": "Łódź" })).collect();
    std::fs::write(&input, serde_json::to_string(&records).unwrap()).unwrap();

    let out = dir.path().join("splits");
    let fractions = FractionSequence::from_percents(&[10, 50, 100]).unwrap();
    let written = split_dataset(&input, &out, &fractions).unwrap();

    assert_eq!(written.len(), 3);
    assert_eq!(written[0], out.join("world-cities_10.json"));

    let ten = Dataset::load(&written[0]).unwrap();
    let full = Dataset::load(&written[2]).unwrap();
    assert_eq!(ten.len(), 2);
    assert_eq!(full.len(), 20);
    assert_eq!(ten.records(), &full.records()[..2]);
    assert_eq!(full.records()[0]["name"], "Łódź");
}

#[test]
fn test_load_rejects_non_array_dataset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"geonameid": 1}"#).unwrap();

    assert!(matches!(Dataset::load(&path), Err(HarnessError::Dataset(_))));
}

#[test]
fn test_load_rejects_non_object_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"[{"geonameid": 1}, 2]"#).unwrap();

    let err = Dataset::load(&path).unwrap_err();
    assert!(err.to_string().contains("record 1"));
}
