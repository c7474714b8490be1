//! CLI command handlers.

mod checksum;
mod download;
mod summary;
mod verify;

pub use checksum::run_checksum;
pub use download::run_download;
pub use verify::run_verify;
