//! `bulkfetch verify` – re-scan a downloaded tree without touching the network.

use anyhow::Result;
use bulkfetch_core::config::FetchConfig;
use bulkfetch_core::pipeline;

use super::summary::print_and_persist;
use crate::cli::RunArgs;

pub fn run_verify(cfg: &FetchConfig, args: &RunArgs) -> Result<()> {
    tracing::info!(
        manifest = %args.manifest.display(),
        root = %cfg.dataset_root.display(),
        "verification run starting"
    );
    let summary = pipeline::run_verify(cfg, &args.run_options())?;
    print_and_persist(&summary, &cfg.report_dir())
}
