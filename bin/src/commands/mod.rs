//! CLI subcommand implementations.

pub(crate) mod cancel;
pub(crate) mod clean;
pub(crate) mod fetch;
pub(crate) mod status;
pub(crate) mod watch;

use anyhow::{Context, Result};
use leech_lib::prelude::*;
use std::path::PathBuf;

/// Opens the job store at the given path, or the default location.
pub(crate) fn open_store(store_path: Option<PathBuf>) -> Result<JobStore> {
    let base = store_path.unwrap_or_else(JobStore::default_path);
    JobStore::open(base).context("Failed to open job store")
}

/// Parses a job id argument.
pub(crate) fn parse_job_id(raw: &str) -> Result<JobId> {
    raw.parse().context("Invalid job ID format")
}
