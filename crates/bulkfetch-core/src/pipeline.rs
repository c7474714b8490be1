//! The two entry points: bulk download and post-download verification.
//!
//! Each loads the manifest, runs the worker pool and tallies the outcomes.
//! Only manifest problems are returned as errors; per-record failures end up
//! in the [`Summary`].

use crate::config::FetchConfig;
use crate::fetch::{Downloader, RecordWorker, Transport, Verifier};
use crate::manifest::{self, ManifestLoader, ManifestRecord, PathMapping};
use crate::outcome::Outcome;
use crate::report::{RunMode, Summary};
use crate::scheduler;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Per-run inputs that are not part of the persisted configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub manifest: PathBuf,
    /// Overrides the mode's configured concurrency.
    pub concurrency: Option<usize>,
    /// Number of leading records to leave out.
    pub offset: usize,
    /// Only process records listed in this report file.
    pub only: Option<PathBuf>,
}

/// Bulk download: fetch every record not already present and verified.
///
/// Entries repeating an earlier entry's local path are not fetched and count
/// as skipped, so no two workers ever write the same file.
pub fn run_download<T: Transport>(
    cfg: &FetchConfig,
    opts: &RunOptions,
    transport: T,
) -> Result<Summary> {
    let loader = ManifestLoader::new(PathMapping::UrlPath {
        root: cfg.dataset_root.clone(),
    });
    let (records, repeated) = manifest::split_duplicates(select(&loader, opts)?);
    manifest::ensure_parent_dirs(&records);
    let concurrency = opts.concurrency.unwrap_or(cfg.download_concurrency);
    let worker = Downloader::new(transport);
    Ok(run(RunMode::Download, &records, &repeated, concurrency, &worker))
}

/// Verification only: existence and checksum of every record, no network.
pub fn run_verify(cfg: &FetchConfig, opts: &RunOptions) -> Result<Summary> {
    let root = cfg.dataset_root.clone();
    let mapping = match &cfg.source_prefix {
        Some(prefix) => PathMapping::StripPrefix {
            prefix: prefix.clone(),
            root,
        },
        None => PathMapping::UrlPath { root },
    };
    let records = select(&ManifestLoader::new(mapping), opts)?;
    let concurrency = opts.concurrency.unwrap_or(cfg.verify_concurrency);
    Ok(run(RunMode::Verify, &records, &[], concurrency, &Verifier))
}

fn select(loader: &ManifestLoader, opts: &RunOptions) -> Result<Vec<ManifestRecord>> {
    let mut records = loader
        .load(&opts.manifest)
        .with_context(|| format!("load manifest {}", opts.manifest.display()))?;
    if opts.offset > 0 {
        let skip = opts.offset.min(records.len());
        records.drain(..skip);
        tracing::info!(offset = skip, remaining = records.len(), "skipping leading records");
    }
    if let Some(only) = &opts.only {
        let listed = manifest::read_listed(only)
            .with_context(|| format!("read id list {}", only.display()))?;
        manifest::retain_listed(&mut records, &listed);
        tracing::info!(list = %only.display(), remaining = records.len(), "restricted to listed records");
    }
    Ok(records)
}

fn run<W: RecordWorker>(
    mode: RunMode,
    records: &[ManifestRecord],
    repeated: &[ManifestRecord],
    concurrency: usize,
    worker: &W,
) -> Summary {
    let mut outcomes = scheduler::run_pool(records, concurrency, worker);
    for record in repeated {
        tracing::info!(line = record.line, url = %record.source_url, "skipping repeated destination");
        outcomes.push(Outcome::skipped());
    }
    let summary = Summary::tally(mode, &outcomes);
    tracing::info!(
        total = summary.total,
        verified = summary.verified,
        skipped = summary.skipped,
        failures = summary.failures(),
        "run finished"
    );
    summary
}
