//! Summary block, failing identifiers and report files for a finished run.

use anyhow::Result;
use bulkfetch_core::report::{self, Summary};
use std::path::Path;

/// Print the summary, echo each failing identifier and persist the failure
/// lists. The summary is printed before anything can fail.
pub fn print_and_persist(summary: &Summary, report_dir: &Path) -> Result<()> {
    println!("\n\n\n{}", summary);

    if !summary.download_errors.is_empty() {
        println!("\n\n\n{}", summary.download_errors_heading());
        for id in &summary.download_errors {
            println!("{}", id);
        }
    }
    if !summary.checksum_errors.is_empty() {
        println!("\n\n\nFiles that failed checksum");
        for id in &summary.checksum_errors {
            println!("{}", id);
        }
    }

    let written = report::write_reports(summary, report_dir, &report::today_stamp())?;
    for path in written {
        tracing::info!("failure list saved to {}", path.display());
    }
    Ok(())
}
