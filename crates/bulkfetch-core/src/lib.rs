pub mod config;
pub mod logging;

pub mod checksum;
pub mod fetch;
pub mod manifest;
pub mod outcome;
pub mod pipeline;
pub mod report;
pub mod scheduler;
