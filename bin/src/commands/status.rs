//! Job status command: single-job detail or a listing.

use super::{open_store, parse_job_id};
use anyhow::{Context, Result};
use leech_lib::prelude::*;
use std::path::PathBuf;

/// Execute the status command.
pub(crate) async fn status(
    job_id: Option<&str>,
    show_all: bool,
    store_path: Option<PathBuf>,
) -> Result<()> {
    let store = open_store(store_path)?;

    match job_id {
        Some(raw) => show_job_detail(&store, raw).await,
        None => list_jobs(&store, show_all).await,
    }
}

async fn show_job_detail(store: &JobStore, raw: &str) -> Result<()> {
    let id = parse_job_id(raw)?;
    let job = store.get(id).await.context("Job not found")?;

    println!("Job: {}", job.id);
    println!("Status: {}", job.status.label());
    println!("Source: {}", job.source);
    println!("Created: {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated: {}", job.updated_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Progress: {:.1}%", job.progress);

    if let Some(ref output) = job.output_path {
        println!("Output: {}", output.display());
    }
    if let Some(ref error) = job.error_message {
        println!("Error: {error}");
    }

    Ok(())
}

async fn list_jobs(store: &JobStore, show_all: bool) -> Result<()> {
    let jobs = store.list().await;

    let filtered: Vec<_> = jobs
        .into_iter()
        .filter(|job| show_all || !job.is_finished())
        .collect();

    if filtered.is_empty() {
        if show_all {
            println!("No jobs.");
        } else {
            println!("No active jobs. Use --all to include finished jobs.");
        }
        return Ok(());
    }

    for job in filtered {
        println!(
            "{}  {:<11} {:>5.1}%  {}",
            job.id,
            job.status.label(),
            job.progress,
            job.source.describe(),
        );
    }

    Ok(())
}
