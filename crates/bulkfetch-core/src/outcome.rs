//! Per-record results of a fetch or verification attempt.

use std::fmt;

/// What happened to one manifest record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Already present locally with a matching checksum; nothing fetched.
    Skipped,
    /// Downloaded (or checked) and the checksum matched.
    Verified,
    DownloadFailed,
    ChecksumFailed,
    /// Verification mode: the local file is missing or unreadable.
    NotPresent,
}

/// Stage a failing download stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Checksum,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Download => write!(f, "download"),
            Stage::Checksum => write!(f, "checksum"),
        }
    }
}

/// Result for one record. Exactly one is produced per dispatched record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    /// Failing URL (download mode) or local path (verification mode).
    pub identifier: Option<String>,
    pub stage: Option<Stage>,
}

impl Outcome {
    pub fn skipped() -> Self {
        Self {
            status: Status::Skipped,
            identifier: None,
            stage: None,
        }
    }

    pub fn verified() -> Self {
        Self {
            status: Status::Verified,
            identifier: None,
            stage: None,
        }
    }

    pub fn download_failed(identifier: impl Into<String>) -> Self {
        Self {
            status: Status::DownloadFailed,
            identifier: Some(identifier.into()),
            stage: Some(Stage::Download),
        }
    }

    pub fn checksum_failed(identifier: impl Into<String>) -> Self {
        Self {
            status: Status::ChecksumFailed,
            identifier: Some(identifier.into()),
            stage: Some(Stage::Checksum),
        }
    }

    pub fn not_present(identifier: impl Into<String>) -> Self {
        Self {
            status: Status::NotPresent,
            identifier: Some(identifier.into()),
            stage: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            Status::DownloadFailed | Status::ChecksumFailed | Status::NotPresent
        )
    }
}
