//! Persisted failure lists: `<kind>_error_files_<YYYYMMDD>.txt`.

use super::Summary;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Which failure list a report file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Download,
    Checksum,
}

impl ReportKind {
    fn prefix(self) -> &'static str {
        match self {
            ReportKind::Download => "download_error_files",
            ReportKind::Checksum => "checksum_error_files",
        }
    }
}

/// Local date as `YYYYMMDD`.
pub fn today_stamp() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

pub fn report_file_name(kind: ReportKind, date: &str) -> String {
    format!("{}_{}.txt", kind.prefix(), date)
}

/// Write each non-empty failure list of `summary` into `dir`, one identifier
/// per line, replacing any same-named file. Returns the files written.
pub fn write_reports(summary: &Summary, dir: &Path, date: &str) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (kind, ids) in [
        (ReportKind::Download, &summary.download_errors),
        (ReportKind::Checksum, &summary.checksum_errors),
    ] {
        if ids.is_empty() {
            continue;
        }
        let path = dir.join(report_file_name(kind, date));
        write_list(&path, ids).with_context(|| format!("write report {}", path.display()))?;
        tracing::info!(path = %path.display(), entries = ids.len(), "wrote error report");
        written.push(path);
    }
    Ok(written)
}

fn write_list(path: &Path, ids: &[String]) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    for id in ids {
        writeln!(w, "{}", id)?;
    }
    w.flush()
}
