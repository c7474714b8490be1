//! Per-record workers.
//!
//! [`Downloader`] makes the skip/download/verify decision for one record;
//! [`Verifier`] is its read-only counterpart for re-scanning a finished tree.
//! Both turn every failure into an [`Outcome`] rather than an error.

mod error;
pub mod storage;
mod transport;

pub use error::{classify_curl_error, FailureKind, FetchError};
pub use transport::{CurlTransport, Transport};

use crate::checksum;
use crate::manifest::ManifestRecord;
use crate::outcome::Outcome;
use std::fs;

/// Maps one manifest record to exactly one outcome. Shared across pool threads.
pub trait RecordWorker: Sync {
    fn process(&self, record: &ManifestRecord) -> Outcome;

    /// Outcome reported for `record` when `process` panicked.
    fn failed(&self, record: &ManifestRecord) -> Outcome;
}

/// Download mode: skip files that already verify, otherwise fetch and verify.
pub struct Downloader<T> {
    transport: T,
}

impl<T: Transport> Downloader<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// True when the destination already holds the expected bytes.
    fn already_present(&self, record: &ManifestRecord) -> bool {
        if !record.local_path.exists() {
            return false;
        }
        match checksum::verify(&record.local_path, &record.reference_checksum) {
            Ok(true) => true,
            Ok(false) => {
                tracing::debug!(path = %record.local_path.display(), "existing file fails checksum, re-downloading");
                false
            }
            Err(e) => {
                tracing::warn!(path = %record.local_path.display(), error = %e, "existing file unreadable, re-downloading");
                false
            }
        }
    }
}

impl<T: Transport> RecordWorker for Downloader<T> {
    fn process(&self, record: &ManifestRecord) -> Outcome {
        if self.already_present(record) {
            tracing::info!(path = %record.local_path.display(), "skipping, already verified");
            return Outcome::skipped();
        }

        if let Some(parent) = record.local_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(url = %record.source_url, dir = %parent.display(), error = %e, "cannot create destination directory");
                return Outcome::download_failed(&record.source_url);
            }
        }

        let part = storage::temp_path(&record.local_path);
        match self.transport.fetch(&record.source_url, &part) {
            Ok(bytes) => {
                tracing::debug!(url = %record.source_url, bytes, "download complete");
            }
            Err(e) => {
                tracing::warn!(url = %record.source_url, kind = %e.kind(), error = %e, "download failed");
                storage::discard(&part);
                return Outcome::download_failed(&record.source_url);
            }
        }

        match checksum::verify(&part, &record.reference_checksum) {
            Ok(true) => {}
            Ok(false) => {
                // Keep the .part file for inspection; the destination is untouched.
                tracing::warn!(url = %record.source_url, part = %part.display(), "checksum mismatch after download");
                return Outcome::checksum_failed(&record.source_url);
            }
            Err(e) => {
                tracing::warn!(url = %record.source_url, error = %e, "downloaded file unreadable");
                storage::discard(&part);
                return Outcome::download_failed(&record.source_url);
            }
        }

        if let Err(e) = storage::finalize(&part, &record.local_path) {
            tracing::warn!(url = %record.source_url, path = %record.local_path.display(), error = %e, "cannot move download into place");
            return Outcome::download_failed(&record.source_url);
        }
        Outcome::verified()
    }

    fn failed(&self, record: &ManifestRecord) -> Outcome {
        Outcome::download_failed(&record.source_url)
    }
}

/// Verification mode: existence and checksum only. Never writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier;

impl RecordWorker for Verifier {
    fn process(&self, record: &ManifestRecord) -> Outcome {
        let path = &record.local_path;
        if !path.exists() {
            return Outcome::not_present(path.to_string_lossy());
        }
        match checksum::verify(path, &record.reference_checksum) {
            Ok(true) => Outcome::verified(),
            Ok(false) => {
                tracing::debug!(path = %path.display(), "checksum mismatch");
                Outcome::checksum_failed(path.to_string_lossy())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "file unreadable");
                Outcome::not_present(path.to_string_lossy())
            }
        }
    }

    fn failed(&self, record: &ManifestRecord) -> Outcome {
        Outcome::not_present(record.local_path.to_string_lossy())
    }
}
