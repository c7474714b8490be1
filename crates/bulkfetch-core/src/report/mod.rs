//! Outcome aggregation: per-status counts, failing identifier lists and the
//! printed summary block.

mod files;

pub use files::{report_file_name, today_stamp, write_reports, ReportKind};

use crate::outcome::{Outcome, Status};
use std::fmt;

/// Which entry point produced the outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Download,
    Verify,
}

/// Totals of one run plus the identifiers behind each failure category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub mode: RunMode,
    pub total: usize,
    pub verified: usize,
    pub skipped: usize,
    pub download_failed: usize,
    pub checksum_failed: usize,
    pub not_present: usize,
    /// Download mode: failing URLs. Verification mode: missing local paths.
    pub download_errors: Vec<String>,
    /// Identifiers whose content did not match the reference checksum.
    pub checksum_errors: Vec<String>,
}

impl Summary {
    /// Tally outcomes. Counts depend only on the multiset of outcomes; lists
    /// keep the order outcomes were given in.
    pub fn tally(mode: RunMode, outcomes: &[Outcome]) -> Self {
        let mut s = Summary {
            mode,
            total: outcomes.len(),
            verified: 0,
            skipped: 0,
            download_failed: 0,
            checksum_failed: 0,
            not_present: 0,
            download_errors: Vec::new(),
            checksum_errors: Vec::new(),
        };
        for outcome in outcomes {
            let id = outcome.identifier.clone().unwrap_or_default();
            match outcome.status {
                Status::Verified => s.verified += 1,
                Status::Skipped => s.skipped += 1,
                Status::DownloadFailed => {
                    s.download_failed += 1;
                    s.download_errors.push(id);
                }
                Status::NotPresent => {
                    s.not_present += 1;
                    s.download_errors.push(id);
                }
                Status::ChecksumFailed => {
                    s.checksum_failed += 1;
                    s.checksum_errors.push(id);
                }
            }
        }
        s
    }

    pub fn failures(&self) -> usize {
        self.download_failed + self.checksum_failed + self.not_present
    }

    /// Heading printed above the download-error identifiers.
    pub fn download_errors_heading(&self) -> &'static str {
        match self.mode {
            RunMode::Download => "Files that failed downloading",
            RunMode::Verify => "Files that do not exist",
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SUMMARY")?;
        match self.mode {
            RunMode::Download => {
                writeln!(f, "Total files attempted: {}", self.total)?;
                writeln!(f, "Files successfully downloaded: {}", self.verified)?;
                writeln!(f, "Files that failed download   : {}", self.download_failed)?;
                writeln!(f, "Files that failed checksum   : {}", self.checksum_failed)?;
                write!(f, "Files that were skipped      : {}", self.skipped)
            }
            RunMode::Verify => {
                writeln!(f, "Total files attempted          : {}", self.total)?;
                writeln!(f, "Files that passed verification : {}", self.verified)?;
                writeln!(f, "Files that are not present     : {}", self.not_present)?;
                write!(f, "Files that failed checksum     : {}", self.checksum_failed)
            }
        }
    }
}
