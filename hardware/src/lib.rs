/*!
# IndexBench Resource Sampling

Samples the harness process's own CPU utilization and resident memory.

## Features

- CPU percentage measured over an explicit window
- Resident set size in bytes
- Flags readings taken over a window too short to be meaningful
- Serializable for JSON output

## Example

```rust,no_run
use indexbench_hardware::ResourceSampler;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut sampler = ResourceSampler::new()?;
    let snapshot = sampler.sample_self()?;
    println!("CPU: {:.1}%", snapshot.cpu_percent);
    println!("RAM: {:.2} MB", snapshot.resident_memory_mb());
    Ok(())
}
```
*/

use thiserror::Error;

pub mod constants;
mod process;

pub use process::ResourceSampler;

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("Failed to resolve current process: {0}")]
    CurrentProcess(String),

    #[error("Process {0} disappeared while sampling")]
    ProcessGone(u32),
}

pub type Result<T> = std::result::Result<T, HardwareError>;
