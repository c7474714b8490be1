//! `bulkfetch download` – fetch and verify every manifest entry.

use anyhow::Result;
use bulkfetch_core::config::FetchConfig;
use bulkfetch_core::fetch::CurlTransport;
use bulkfetch_core::pipeline;

use super::summary::print_and_persist;
use crate::cli::RunArgs;

pub fn run_download(cfg: &FetchConfig, args: &RunArgs) -> Result<()> {
    tracing::info!(
        manifest = %args.manifest.display(),
        root = %cfg.dataset_root.display(),
        "download run starting"
    );
    let transport = CurlTransport::new(cfg.http());
    let summary = pipeline::run_download(cfg, &args.run_options(), transport)?;
    print_and_persist(&summary, &cfg.report_dir())
}
