//! Manifest loading.
//!
//! A manifest is a CSV file whose first line is a header and whose remaining
//! lines are `checksum,url`. Each line becomes a [`ManifestRecord`] with a
//! local destination path derived by a [`PathMapping`].

mod error;
mod filter;
mod parse;
mod path;

pub use error::ManifestError;
pub use filter::{read_listed, retain_listed};
pub use path::{PathError, PathMapping};

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One file of the dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    /// 1-based line in the manifest file.
    pub line: usize,
    /// Lowercase hex digest.
    pub reference_checksum: String,
    pub source_url: String,
    pub local_path: PathBuf,
}

/// Parses manifests into records. Directory creation is a separate step
/// ([`ensure_parent_dirs`]) so verification runs stay read-only.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    mapping: PathMapping,
}

impl ManifestLoader {
    pub fn new(mapping: PathMapping) -> Self {
        Self { mapping }
    }

    /// Load and parse the manifest at `path`.
    pub fn load(&self, path: &Path) -> Result<Vec<ManifestRecord>, ManifestError> {
        let file = File::open(path)?;
        let records = self.parse(BufReader::new(file))?;
        tracing::info!(
            manifest = %path.display(),
            records = records.len(),
            "manifest loaded"
        );
        Ok(records)
    }

    /// Parse manifest content. The first line is discarded as a header; blank
    /// lines are skipped.
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<Vec<ManifestRecord>, ManifestError> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            if idx == 0 || line.trim().is_empty() {
                continue;
            }
            let (reference_checksum, source_url) = parse::parse_line(line_no, &line)?;
            let local_path = self
                .mapping
                .local_path(&source_url)
                .map_err(|e| match e {
                    PathError::InvalidUrl(source) => ManifestError::InvalidUrl {
                        line: line_no,
                        source,
                    },
                    PathError::Unsafe => ManifestError::UnsafePath { line: line_no },
                })?;
            if !seen.insert(local_path.clone()) {
                tracing::warn!(line = line_no, url = %source_url, "duplicate manifest entry");
            }
            records.push(ManifestRecord {
                line: line_no,
                reference_checksum,
                source_url,
                local_path,
            });
        }
        Ok(records)
    }
}

/// Create the parent directory of every record. Safe to race with other
/// callers creating the same directories. Failures are logged, not returned:
/// the affected records fail individually when their download cannot write.
pub fn ensure_parent_dirs(records: &[ManifestRecord]) {
    let mut done: HashSet<&Path> = HashSet::new();
    for record in records {
        let Some(parent) = record.local_path.parent() else {
            continue;
        };
        if !done.insert(parent) {
            continue;
        }
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::warn!(dir = %parent.display(), error = %e, "could not create directory");
        }
    }
}

/// Split `records` into the first entry for each local path and the later
/// entries that repeat one. Both keep manifest order.
pub fn split_duplicates(
    records: Vec<ManifestRecord>,
) -> (Vec<ManifestRecord>, Vec<ManifestRecord>) {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .partition(|r| seen.insert(r.local_path.clone()))
}
