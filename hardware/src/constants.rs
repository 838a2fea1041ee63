/*!
Resource Sampling Constants

Centralized constants for process sampling to avoid magic numbers across crates.
*/

use std::time::Duration;

// ========== CPU Measurement ==========

/// Default CPU measurement window between the priming and the reading refresh
pub const DEFAULT_CPU_WINDOW: Duration = Duration::from_secs(1);

/// Shortest window sysinfo can turn into a meaningful CPU percentage
pub const MIN_CPU_WINDOW: Duration = sysinfo::MINIMUM_CPU_UPDATE_INTERVAL;
