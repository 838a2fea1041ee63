//! Dataset source and percentage splitter.
//!
//! A dataset is a JSON array of document objects. The harness only ever
//! takes leading prefixes of it, so smaller fractions are always subsets of
//! larger ones.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use common::{DatasetFraction, FractionSequence};
use serde_json::Value;
use tracing::info;

use crate::error::{HarnessError, HarnessResult};

/// Ordered document records loaded into memory.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Value>,
}

impl Dataset {
    /// Load a JSON array of objects from `path`.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let file = File::open(path).map_err(|e| {
            HarnessError::Dataset(format!("cannot open {}: {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            HarnessError::Dataset(format!("cannot parse {}: {}", path.display(), e))
        })?;

        let Value::Array(records) = value else {
            return Err(HarnessError::Dataset(format!(
                "{} must contain a JSON array of documents",
                path.display()
            )));
        };
        if let Some(pos) = records.iter().position(|r| !r.is_object()) {
            return Err(HarnessError::Dataset(format!(
                "record {} in {} is not an object",
                pos,
                path.display()
            )));
        }

        info!(path = %path.display(), documents = records.len(), "dataset loaded");
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<Value>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    /// Leading `floor(len * pct / 100)` records.
    pub fn prefix(&self, fraction: DatasetFraction) -> &[Value] {
        &self.records[..fraction.prefix_len(self.records.len())]
    }
}

/// Write one `<stem>_<pct>.json` prefix file per fraction into `out_dir`.
///
/// Returns the written paths in fraction order.
pub fn split_dataset(
    input: &Path,
    out_dir: &Path,
    fractions: &FractionSequence,
) -> HarnessResult<Vec<PathBuf>> {
    let dataset = Dataset::load(input)?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| HarnessError::Dataset(format!("{} has no file name", input.display())))?;

    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(fractions.len());
    for fraction in fractions.iter() {
        let part = dataset.prefix(fraction);
        let path = out_dir.join(format!("{}_{}.json", stem, fraction.percent()));

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, part)?;
        writer.flush()?;

        info!(path = %path.display(), documents = part.len(), "wrote {} split", fraction);
        written.push(path);
    }

    Ok(written)
}
