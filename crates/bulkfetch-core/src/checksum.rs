//! Content digests for integrity checks.
//!
//! The manifest carries one hex digest per file; its length selects the
//! algorithm (32 hex chars = MD5, 64 = SHA-256). Files are read in chunks so
//! multi-gigabyte files never need to fit in memory.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithm of a reference checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    Md5,
    Sha256,
}

impl ChecksumKind {
    /// Infer the algorithm from a hex reference value. Returns `None` for
    /// non-hex input or a length that matches no supported digest.
    pub fn detect(reference: &str) -> Option<Self> {
        if !reference.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match reference.len() {
            32 => Some(ChecksumKind::Md5),
            64 => Some(ChecksumKind::Sha256),
            _ => None,
        }
    }
}

fn digest_path<D: Digest>(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute MD5 of a file and return the digest as lowercase hex.
pub fn md5_path(path: &Path) -> io::Result<String> {
    digest_path::<Md5>(path)
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> io::Result<String> {
    digest_path::<Sha256>(path)
}

/// Check a file against a reference digest.
///
/// `Ok(false)` means the file was read and its digest differs (or the
/// reference is not a supported digest). `Err` means the file could not be
/// opened or read; callers map that to a different outcome than a mismatch.
pub fn verify(path: &Path, reference: &str) -> io::Result<bool> {
    let actual = match ChecksumKind::detect(reference) {
        Some(ChecksumKind::Md5) => md5_path(path)?,
        Some(ChecksumKind::Sha256) => sha256_path(path)?,
        None => {
            // Still surface unreadable files as errors.
            File::open(path)?;
            return Ok(false);
        }
    };
    Ok(actual.eq_ignore_ascii_case(reference))
}
