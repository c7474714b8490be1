//! Restrict a run to identifiers listed in an earlier error report.

use super::ManifestRecord;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Read a report file (one identifier per line, blanks ignored).
pub fn read_listed(path: &Path) -> io::Result<HashSet<String>> {
    let data = fs::read_to_string(path)?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Keep records whose source URL or local path appears in `listed`.
pub fn retain_listed(records: &mut Vec<ManifestRecord>, listed: &HashSet<String>) {
    records.retain(|r| {
        listed.contains(&r.source_url) || listed.contains(&*r.local_path.to_string_lossy())
    });
}
