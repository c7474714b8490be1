use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Host prefix of the public dataset bucket; stripped from URLs in verification mode.
pub const DEFAULT_SOURCE_PREFIX: &str = "https://nex-gddp-cmip6.s3.us-west-2.amazonaws.com";

/// HTTP transfer limits (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Seconds allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// Hard wall-clock limit for one transfer in seconds.
    pub timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 3600,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn low_speed_time(&self) -> Duration {
        Duration::from_secs(self.low_speed_time_secs)
    }
}

/// Global configuration loaded from `~/.config/bulkfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Local directory every destination path is placed under.
    pub dataset_root: PathBuf,
    /// URL prefix replaced by `dataset_root` in verification mode. When unset,
    /// the URL path component is used as in download mode.
    #[serde(default)]
    pub source_prefix: Option<String>,
    /// Parallel downloads. 10 keeps S3-style object stores from throttling us.
    pub download_concurrency: usize,
    /// Parallel local checks; disk bound, so higher than downloads.
    pub verify_concurrency: usize,
    /// Directory the error report files are written to (None = current directory).
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
    /// Optional HTTP limits; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            dataset_root: PathBuf::from("/data/Datasets"),
            source_prefix: Some(DEFAULT_SOURCE_PREFIX.to_string()),
            download_concurrency: 10,
            verify_concurrency: 20,
            report_dir: None,
            http: None,
        }
    }
}

impl FetchConfig {
    /// HTTP limits, falling back to defaults when the section is absent.
    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    /// Report directory, falling back to the current directory.
    pub fn report_dir(&self) -> PathBuf {
        self.report_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bulkfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<FetchConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
