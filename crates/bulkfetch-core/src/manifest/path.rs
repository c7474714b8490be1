//! Destination path derivation from source URLs.

use std::path::{Path, PathBuf};

/// Why a URL could not be mapped to a local path.
#[derive(Debug)]
pub enum PathError {
    InvalidUrl(url::ParseError),
    /// Empty path, a segment that would escape the root, or one that does
    /// not decode to UTF-8.
    Unsafe,
}

/// How a source URL becomes a local file path.
///
/// Both variants work on the decoded segments of the parsed URL path, so a
/// URL maps to the same file whichever mode produced or checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMapping {
    /// `root` joined with the URL's path component (download mode).
    UrlPath { root: PathBuf },
    /// `prefix` replaced by `root` (verification mode). URLs that do not start
    /// with `prefix` fall back to the URL path component.
    StripPrefix { prefix: String, root: PathBuf },
}

impl PathMapping {
    /// Map `url` to its local path. Deterministic; distinct URL paths map to
    /// distinct local paths.
    pub fn local_path(&self, url: &str) -> Result<PathBuf, PathError> {
        let parsed = url::Url::parse(url).map_err(PathError::InvalidUrl)?;
        let segments = decoded_segments(&parsed)?;
        match self {
            PathMapping::UrlPath { root } => join_segments(root, &segments),
            PathMapping::StripPrefix { prefix, root } => {
                let head = if url.starts_with(prefix.as_str()) {
                    url::Url::parse(prefix)
                        .ok()
                        .and_then(|base| decoded_segments(&base).ok())
                        .unwrap_or_default()
                } else {
                    Vec::new()
                };
                let rest = segments.strip_prefix(head.as_slice()).unwrap_or(&segments[..]);
                join_segments(root, rest)
            }
        }
    }
}

/// Non-empty path segments of `url`, percent-decoded. The parser has already
/// resolved `.` and `..` segments.
fn decoded_segments(url: &url::Url) -> Result<Vec<String>, PathError> {
    url.path()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(percent_decode)
        .collect()
}

fn percent_decode(segment: &str) -> Result<String, PathError> {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = match bytes.get(i..i + 3) {
            Some([b'%', h, l]) => hex_digit(*h).zip(hex_digit(*l)),
            _ => None,
        };
        match escaped {
            Some((high, low)) => {
                out.push(high << 4 | low);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| PathError::Unsafe)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn join_segments(root: &Path, segments: &[String]) -> Result<PathBuf, PathError> {
    if segments.is_empty() {
        return Err(PathError::Unsafe);
    }
    let mut out = root.to_path_buf();
    for segment in segments {
        // Decoding can reintroduce separators or dot segments.
        if segment == "." || segment == ".." || segment.contains(['/', '\\', '\0']) {
            return Err(PathError::Unsafe);
        }
        out.push(segment);
    }
    Ok(out)
}
