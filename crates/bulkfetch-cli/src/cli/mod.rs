//! CLI for bulkfetch.

mod commands;

use anyhow::Result;
use bulkfetch_core::config::{self, FetchConfig};
use bulkfetch_core::pipeline::RunOptions;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_checksum, run_download, run_verify};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bulkfetch")]
#[command(about = "Bulk-download a checksummed dataset manifest and verify it", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/bulkfetch/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every manifest entry not already present with a matching checksum.
    Download {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Check existence and checksum of every manifest entry without downloading.
    Verify {
        #[command(flatten)]
        run: RunArgs,

        /// URL prefix replaced by the dataset root when deriving local paths.
        #[arg(long, value_name = "URL")]
        source_prefix: Option<String>,
    },

    /// Print the digest of a local file.
    Checksum {
        /// Path to the file.
        path: PathBuf,

        /// SHA-256 instead of MD5.
        #[arg(long)]
        sha256: bool,
    },
}

/// Options shared by the download and verify entry points.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Manifest CSV (header line, then `checksum,url` per line).
    #[arg(long, short = 'm', value_name = "CSV")]
    pub manifest: PathBuf,

    /// Records processed in parallel (defaults: 10 for download, 20 for verify).
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Local directory the dataset lives under.
    #[arg(long, value_name = "DIR")]
    pub dataset_root: Option<PathBuf>,

    /// Skip the first N manifest records.
    #[arg(long, default_value = "0", value_name = "N")]
    pub offset: usize,

    /// Only process records listed in this file (e.g. an earlier error report).
    #[arg(long, value_name = "FILE")]
    pub only: Option<PathBuf>,

    /// Where to write the error report files (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Config with this run's overrides applied.
    pub fn apply(&self, cfg: &FetchConfig) -> FetchConfig {
        let mut cfg = cfg.clone();
        if let Some(root) = &self.dataset_root {
            cfg.dataset_root = root.clone();
        }
        if let Some(dir) = &self.report_dir {
            cfg.report_dir = Some(dir.clone());
        }
        cfg
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            manifest: self.manifest.clone(),
            concurrency: self.jobs,
            offset: self.offset,
            only: self.only.clone(),
        }
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download { run } => run_download(&run.apply(&cfg), &run)?,
            CliCommand::Verify { run, source_prefix } => {
                let mut cfg = run.apply(&cfg);
                if source_prefix.is_some() {
                    cfg.source_prefix = source_prefix;
                }
                run_verify(&cfg, &run)?;
            }
            CliCommand::Checksum { path, sha256 } => run_checksum(&path, sha256)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
