//! Configuration system for the indexbench binary.
//!
//! Supports:
//! - CLI arguments (highest priority)
//! - Environment variables
//! - TOML config file
//! - Defaults (lowest priority)
//!
//! clap resolves CLI over environment for each flag; [`BenchConfig::load`]
//! then layers whatever was given over the file and the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use common::{FractionSequence, IndexName};
use indexbench_harness::{BenchmarkSettings, TrendOptions};
use indexbench_search_client::{ClientConfig, ResetPolicy, WaitPolicy};
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

/// Command-line arguments for indexbench.
#[derive(Parser, Debug, Clone)]
#[command(name = "indexbench")]
#[command(about = "Measure how ingestion time and index size scale with dataset size")]
#[command(version)]
pub struct CliArgs {
    /// Configuration file path (optional; missing file means defaults)
    #[arg(long, short = 'c', env = "INDEXBENCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the fraction-by-fraction benchmark and write the reports
    Run(RunArgs),
    /// Write percentage-sized prefix files of a dataset
    Split(SplitArgs),
}

/// Overrides for a benchmark run. Unset flags fall back to the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Base URL of the indexing service
    #[arg(long, env = "MEILISEARCH_HOST")]
    pub host: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "MEILISEARCH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// JSON array of documents to ingest
    #[arg(long, short = 'd', env = "DATASET_PATH")]
    pub dataset: Option<PathBuf>,

    /// Directory receiving the report files
    #[arg(long, short = 'o', env = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, env = "INDEXBENCH_INDEX")]
    pub index_name: Option<String>,

    #[arg(long)]
    pub primary_key: Option<String>,

    /// Ascending percentages, e.g. `10,50,100`
    #[arg(long, value_delimiter = ',')]
    pub fractions: Option<Vec<u32>>,

    /// Number of simultaneous search probes
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Search query used for the probes
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Seconds to wait for an ingestion task before assuming completion
    #[arg(long)]
    pub timeout_secs: Option<f64>,

    #[arg(long)]
    pub poll_interval_secs: Option<f64>,

    /// Extra settle time after a task wait times out
    #[arg(long)]
    pub grace_period_secs: Option<f64>,

    /// Pause after an index deletion that returned no task
    #[arg(long)]
    pub settle_delay_secs: Option<f64>,

    #[arg(long)]
    pub request_timeout_secs: Option<f64>,

    /// CPU measurement window for the resource snapshot
    #[arg(long)]
    pub cpu_window_secs: Option<f64>,

    /// Leave timed-out iterations out of the trend fit (`--exclude-unconfirmed=false` to undo a config file)
    #[arg(
        long,
        env = "INDEXBENCH_EXCLUDE_UNCONFIRMED",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub exclude_unconfirmed: Option<bool>,
}

/// Arguments of the `split` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Dataset base name; reads `<dataset-dir>/<name>.json`
    #[arg(long, default_value = "world-cities", env = "DATASET_NAME")]
    pub dataset_name: String,

    #[arg(long, default_value = "dataset")]
    pub dataset_dir: PathBuf,

    /// Where the split files go (defaults to the dataset directory)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Ascending percentages, e.g. `10,50,100`
    #[arg(long, value_delimiter = ',')]
    pub fractions: Option<Vec<u32>>,
}

impl SplitArgs {
    pub fn input_path(&self) -> PathBuf {
        self.dataset_dir.join(format!("{}.json", self.dataset_name))
    }

    pub fn output_dir(&self) -> &Path {
        self.out_dir.as_deref().unwrap_or(&self.dataset_dir)
    }

    pub fn fraction_sequence(&self) -> BenchResult<FractionSequence> {
        match &self.fractions {
            Some(percents) => Ok(FractionSequence::from_percents(percents)?),
            None => Ok(FractionSequence::deciles()),
        }
    }
}

/// Full run configuration (merged from all sources).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub host: String,
    pub api_key: Option<String>,
    pub dataset: PathBuf,
    pub output_dir: PathBuf,
    pub index_name: String,
    pub primary_key: String,
    pub fractions: Vec<u32>,
    pub concurrency: usize,
    pub query: String,
    pub timeout_secs: f64,
    pub poll_interval_secs: f64,
    pub grace_period_secs: f64,
    pub settle_delay_secs: f64,
    pub request_timeout_secs: f64,
    pub cpu_window_secs: f64,
    pub exclude_unconfirmed: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:7700".to_string(),
            api_key: None,
            dataset: PathBuf::from("dataset/world-cities.json"),
            output_dir: PathBuf::from("output"),
            index_name: "cities".to_string(),
            primary_key: "geonameid".to_string(),
            fractions: (1..=10).map(|d| d * 10).collect(),
            concurrency: 5,
            query: "Warsaw".to_string(),
            timeout_secs: 60.0,
            poll_interval_secs: 1.0,
            grace_period_secs: 10.0,
            settle_delay_secs: 1.0,
            request_timeout_secs: 30.0,
            cpu_window_secs: 1.0,
            exclude_unconfirmed: false,
        }
    }
}

impl BenchConfig {
    /// Load configuration from run arguments and an optional config file.
    ///
    /// Priority: CLI args > Environment > Config file > Defaults
    pub fn load(config_path: Option<&Path>, args: &RunArgs) -> Result<Self> {
        let mut config = match config_path {
            Some(path) if path.exists() => Self::from_file(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?,
            Some(path) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply(args);
        Ok(config)
    }

    /// Load configuration from a TOML file. Absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: BenchConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Overlay every flag that was actually given.
    fn apply(&mut self, args: &RunArgs) {
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(key) = &args.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(dataset) = &args.dataset {
            self.dataset = dataset.clone();
        }
        if let Some(dir) = &args.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(name) = &args.index_name {
            self.index_name = name.clone();
        }
        if let Some(pk) = &args.primary_key {
            self.primary_key = pk.clone();
        }
        if let Some(fractions) = &args.fractions {
            self.fractions = fractions.clone();
        }
        if let Some(concurrency) = args.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(query) = &args.query {
            self.query = query.clone();
        }

        let seconds = [
            (args.timeout_secs, &mut self.timeout_secs),
            (args.poll_interval_secs, &mut self.poll_interval_secs),
            (args.grace_period_secs, &mut self.grace_period_secs),
            (args.settle_delay_secs, &mut self.settle_delay_secs),
            (args.request_timeout_secs, &mut self.request_timeout_secs),
            (args.cpu_window_secs, &mut self.cpu_window_secs),
        ];
        for (given, slot) in seconds {
            if let Some(value) = given {
                *slot = value;
            }
        }

        if let Some(exclude) = args.exclude_unconfirmed {
            self.exclude_unconfirmed = exclude;
        }
    }

    pub fn client_config(&self) -> BenchResult<ClientConfig> {
        Ok(ClientConfig {
            base_url: self.host.clone(),
            api_key: self.api_key.clone(),
            request_timeout: secs("request_timeout_secs", self.request_timeout_secs)?,
        })
    }

    /// Validate and convert into harness settings.
    pub fn settings(&self) -> BenchResult<BenchmarkSettings> {
        if self.concurrency == 0 {
            return Err(BenchError::Config("concurrency must be at least 1".to_string()));
        }
        if self.index_name.trim().is_empty() {
            return Err(BenchError::Config("index_name must not be empty".to_string()));
        }

        let wait = WaitPolicy {
            timeout: secs("timeout_secs", self.timeout_secs)?,
            poll_interval: positive_secs("poll_interval_secs", self.poll_interval_secs)?,
            grace_period: secs("grace_period_secs", self.grace_period_secs)?,
        };

        Ok(BenchmarkSettings {
            index_name: IndexName::new(self.index_name.clone()),
            primary_key: self.primary_key.clone(),
            fractions: FractionSequence::from_percents(&self.fractions)?,
            concurrency: self.concurrency,
            query: self.query.clone(),
            wait,
            reset: ResetPolicy {
                settle_delay: secs("settle_delay_secs", self.settle_delay_secs)?,
                settle_wait: wait,
            },
            cpu_window: positive_secs("cpu_window_secs", self.cpu_window_secs)?,
            trend: TrendOptions {
                exclude_assumed: self.exclude_unconfirmed,
            },
        })
    }
}

/// Upper bound for every duration setting (one week).
const MAX_DURATION_SECS: f64 = 7.0 * 24.0 * 60.0 * 60.0;

fn secs(field: &str, value: f64) -> BenchResult<Duration> {
    if value > MAX_DURATION_SECS {
        return Err(BenchError::Config(format!(
            "{} must be at most {} seconds, got {}",
            field, MAX_DURATION_SECS, value
        )));
    }
    Duration::try_from_secs_f64(value)
        .map_err(|_| BenchError::Config(format!("{} must be a non-negative number, got {}", field, value)))
}

fn positive_secs(field: &str, value: f64) -> BenchResult<Duration> {
    let duration = secs(field, value)?;
    if duration.is_zero() {
        return Err(BenchError::Config(format!("{} must be greater than zero", field)));
    }
    Ok(duration)
}
