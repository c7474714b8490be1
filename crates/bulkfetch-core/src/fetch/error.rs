//! Transport error type and its classification for log fields.

use std::fmt;

/// Error returned by one HTTP fetch (curl failure, HTTP error, or storage failure).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response status other than 200.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the destination failed (disk full, permission denied, ...).
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
}

/// Coarse failure category, logged with every failed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connection,
    Http(u32),
    Storage,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Connection => write!(f, "connection"),
            FailureKind::Http(code) => write!(f, "http_{}", code),
            FailureKind::Storage => write!(f, "storage"),
            FailureKind::Other => write!(f, "other"),
        }
    }
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Curl(e) => classify_curl_error(e),
            FetchError::Http(code) => FailureKind::Http(*code),
            FetchError::Storage(_) => FailureKind::Storage,
        }
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> FailureKind {
    if e.is_operation_timedout() {
        return FailureKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return FailureKind::Connection;
    }
    FailureKind::Other
}
