//! HTTP GET into a local file.

use super::error::FetchError;
use crate::config::HttpConfig;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Moves the bytes behind a URL into a local file.
///
/// Implementations are shared by every pool worker, hence `Sync`.
pub trait Transport: Sync {
    /// Stream `url` into `dest`, creating or truncating it. Anything other
    /// than a 200 response is an error. Returns the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// Plain HTTP(S) GET through libcurl, one easy handle per fetch.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    http: HttpConfig,
}

impl CurlTransport {
    pub fn new(http: HttpConfig) -> Self {
        Self { http }
    }
}

impl Transport for CurlTransport {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let file = File::create(dest).map_err(FetchError::Storage)?;
        let mut writer = BufWriter::new(file);
        let mut written = 0u64;
        let mut storage_error: Option<std::io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.http.connect_timeout())?;
        // Abort stalled transfers instead of holding a pool slot forever.
        easy.low_speed_limit(self.http.low_speed_limit_bytes)?;
        easy.low_speed_time(self.http.low_speed_time())?;
        easy.timeout(self.http.timeout())?;

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match writer.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    storage_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Err(e) = perform_result {
            if e.is_write_error() {
                if let Some(io_err) = storage_error.take() {
                    return Err(FetchError::Storage(io_err));
                }
            }
            return Err(FetchError::Curl(e));
        }

        let code = easy.response_code()?;
        if code != 200 {
            return Err(FetchError::Http(code));
        }

        let file = writer
            .into_inner()
            .map_err(|e| FetchError::Storage(e.into_error()))?;
        file.sync_all().map_err(FetchError::Storage)?;
        Ok(written)
    }
}
