//! Staging files for in-flight downloads.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.nc` → `a.nc.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Atomically move a verified temp file onto its final path, replacing any
/// previous content.
pub fn finalize(temp: &Path, final_path: &Path) -> io::Result<()> {
    fs::rename(temp, final_path)
}

/// Remove a temp file left by a failed transfer. Missing files are fine.
pub fn discard(temp: &Path) {
    match fs::remove_file(temp) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %temp.display(), error = %e, "could not remove partial file"),
    }
}
