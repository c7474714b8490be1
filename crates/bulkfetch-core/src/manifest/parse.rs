//! One manifest line: `checksum,url`.

use super::error::ManifestError;
use crate::checksum::ChecksumKind;

/// Split and validate one data line. Fields are whitespace-trimmed; quoting
/// and embedded commas are not supported.
pub(super) fn parse_line(line_no: usize, line: &str) -> Result<(String, String), ManifestError> {
    let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    let [checksum, url] = fields.as_slice() else {
        return Err(ManifestError::FieldCount {
            line: line_no,
            found: fields.len(),
        });
    };
    if ChecksumKind::detect(checksum).is_none() {
        return Err(ManifestError::InvalidChecksum { line: line_no });
    }
    Ok((checksum.to_ascii_lowercase(), url.to_string()))
}
