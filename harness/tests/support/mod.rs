//! Shared setup for harness integration tests.
//!
//! Runs the real HTTP client against the in-process mock service, with waits
//! shrunk to milliseconds.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use common::FractionSequence;
use indexbench_harness::{BenchmarkSettings, Dataset};
use indexbench_search_client::mock::MockSearchService;
use indexbench_search_client::{ClientConfig, IndexingService, ResetPolicy, SearchClient, WaitPolicy};
use serde_json::json;

pub fn client_for(mock: &MockSearchService) -> Arc<dyn IndexingService> {
    let mut config = ClientConfig::new(mock.base_url());
    config.request_timeout = Duration::from_secs(5);
    Arc::new(SearchClient::new(config).expect("client builds"))
}

pub fn fast_wait() -> WaitPolicy {
    WaitPolicy {
        timeout: Duration::from_millis(300),
        poll_interval: Duration::from_millis(20),
        grace_period: Duration::from_millis(100),
    }
}

pub fn fast_settings(percents: &[u32]) -> BenchmarkSettings {
    BenchmarkSettings {
        fractions: FractionSequence::from_percents(percents).expect("valid fractions"),
        wait: fast_wait(),
        reset: ResetPolicy {
            settle_delay: Duration::from_millis(10),
            settle_wait: fast_wait(),
        },
        cpu_window: Duration::from_millis(250),
        ..BenchmarkSettings::default()
    }
}

/// `n` city-like documents keyed by `geonameid`.
pub fn cities(n: usize) -> Dataset {
    Dataset::from_records(
        (0..n)
            .map(|i| {
                json!({
                    "geonameid": i,
                    "name": format!("city-{i}"),
                    "country": "PL",
                    "population": 1000 + i,
                })
            })
            .collect(),
    )
}
