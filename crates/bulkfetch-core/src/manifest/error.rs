//! Manifest load errors. Every variant is fatal to a run.

use thiserror::Error;

/// Line numbers are 1-based file lines; the header is line 1.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected 2 fields (checksum,url), found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: reference checksum is not a 32- or 64-char hex digest")]
    InvalidChecksum { line: usize },

    #[error("line {line}: invalid URL: {source}")]
    InvalidUrl {
        line: usize,
        #[source]
        source: url::ParseError,
    },

    #[error("line {line}: URL path does not map to a file under the dataset root")]
    UnsafePath { line: usize },
}
