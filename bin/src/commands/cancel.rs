//! External cancellation of a job.

use super::{open_store, parse_job_id};
use anyhow::{Context, Result};
use leech_lib::prelude::*;
use std::path::PathBuf;

/// Execute the cancel command.
///
/// Cancellation is a single atomic status write: any worker owning the job
/// observes it within one poll interval, releases engine resources, and
/// stops without further writes.
pub(crate) async fn cancel(job_id: &str, store_path: Option<PathBuf>) -> Result<()> {
    let store = open_store(store_path)?;
    let id = parse_job_id(job_id)?;

    let mut cancelled = false;
    let job = store
        .update(id, |job| {
            if !job.is_finished() {
                job.mark_failed(CANCEL_MESSAGE);
                cancelled = true;
            }
        })
        .await
        .context("Job not found")?;

    if cancelled {
        println!("Job {id} cancelled.");
    } else {
        println!("Job {id} already {}.", job.status.label().to_lowercase());
    }

    Ok(())
}
