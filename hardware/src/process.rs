/*!
Process CPU and memory sampling
*/

use std::time::Duration;

use common::ResourceSnapshot;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::constants::{DEFAULT_CPU_WINDOW, MIN_CPU_WINDOW};
use crate::{HardwareError, Result};

/// Samples one process (by default the current one).
///
/// sysinfo derives CPU usage from the delta between two refreshes, so the
/// first refresh after construction only primes the counters. Every
/// `sample_self` call primes, waits `window`, then reads; the primed value is
/// never reported.
pub struct ResourceSampler {
    system: System,
    pid: Pid,
    window: Duration,
}

impl ResourceSampler {
    /// Sampler for the current process with the default 1 s window.
    pub fn new() -> Result<Self> {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| HardwareError::CurrentProcess(e.to_string()))?;
        Ok(Self::for_pid(pid))
    }

    pub fn for_pid(pid: Pid) -> Self {
        Self {
            system: System::new(),
            pid,
            window: DEFAULT_CPU_WINDOW,
        }
    }

    /// Override the CPU measurement window.
    ///
    /// Windows shorter than sysinfo's minimum update interval still sample,
    /// but the snapshot is flagged as unreliable.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Blocking: sleeps for the measurement window.
    pub fn sample_self(&mut self) -> Result<ResourceSnapshot> {
        self.refresh()?;
        if !self.window.is_zero() {
            std::thread::sleep(self.window);
        }
        self.refresh()?;

        let process = self
            .system
            .process(self.pid)
            .ok_or(HardwareError::ProcessGone(self.pid.as_u32()))?;

        let reliable = self.window >= MIN_CPU_WINDOW;
        if !reliable {
            tracing::warn!(
                window_ms = self.window.as_millis() as u64,
                "CPU window shorter than {:?}; reading is unreliable",
                MIN_CPU_WINDOW
            );
        }

        Ok(ResourceSnapshot {
            cpu_percent: process.cpu_usage(),
            resident_memory_bytes: process.memory(),
            window: self.window,
            reliable,
        })
    }

    fn refresh(&mut self) -> Result<()> {
        let updated = self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        if updated == 0 {
            return Err(HardwareError::ProcessGone(self.pid.as_u32()));
        }
        Ok(())
    }
}
