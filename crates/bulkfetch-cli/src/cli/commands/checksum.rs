//! Checksum command: digest of one local file.

use anyhow::{Context, Result};
use bulkfetch_core::checksum;
use std::path::Path;

/// Compute and print MD5 (or SHA-256) of the given file.
pub fn run_checksum(path: &Path, sha256: bool) -> Result<()> {
    let digest = if sha256 {
        checksum::sha256_path(path)
    } else {
        checksum::md5_path(path)
    }
    .with_context(|| format!("read {}", path.display()))?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
