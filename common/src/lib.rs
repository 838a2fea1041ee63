//! Common types shared across the indexbench crates.
//!
//! This crate provides the data model that every stage of a benchmark run
//! exchanges: dataset fractions, per-fraction batch results, latency and
//! resource observations, and the fitted trend model.
//!
//! # Architecture
//!
//! The `common` crate sits at the bottom of the dependency hierarchy:
//! - Has NO dependencies on other workspace crates
//! - Provides shared types that all other crates can use
//! - Ensures type consistency across the entire system

pub mod errors;
pub mod fraction;
pub mod models;

pub use errors::{CommonError, CommonResult};
pub use fraction::{DatasetFraction, FractionSequence};
pub use models::{
    BatchResult, Confidence, LatencyStats, ResourceSnapshot, TrendModel, BYTES_PER_MIB,
};

// --- Core Newtype Wrappers ---

/// Identifier of a server-side asynchronous task.
///
/// **Type Safety**: Using a newtype instead of a bare `u64` keeps task ids from
/// being confused with document counts or byte sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TaskUid(u64);

impl TaskUid {
    /// Create a new TaskUid from the raw server value
    pub fn new(uid: u64) -> Self {
        Self(uid)
    }

    /// Get the raw server value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskUid {
    fn from(uid: u64) -> Self {
        Self(uid)
    }
}

/// Name (uid) of a remote index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct IndexName(String);

impl IndexName {
    /// Create a new IndexName from a string
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IndexName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IndexName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IndexName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// --- Serde Helpers ---

/// Serializes a `Duration` as fractional seconds.
///
/// Use with `#[serde(with = "common::duration_secs")]`.
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Serializes an `f64` that may be infinite.
///
/// JSON has no representation for infinity, so `+inf` is written as the
/// string `"inf"` and read back the same way.
pub mod lossy_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_infinite() && value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) if s == "inf" => Ok(f64::INFINITY),
            Repr::Text(s) => Err(serde::de::Error::custom(format!("invalid number: {s}"))),
        }
    }
}

// --- Tests ---
