//! Submit a download job and follow it in the foreground.

use super::open_store;
use anyhow::{Result, bail};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use leech_lib::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Delay between progress snapshots shown in the foreground; deliberately
/// independent of the worker's poll interval.
const DISPLAY_TICK: Duration = Duration::from_millis(250);

/// Execute the fetch command: submit, follow, report the outcome.
pub(crate) async fn fetch(
    magnet: Option<String>,
    torrent: Option<PathBuf>,
    poll_interval_ms: u64,
    max_concurrent: Option<usize>,
    store_path: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let store = open_store(store_path)?;
    let engine = Arc::new(SimulatedEngine::new(store.downloads_path().to_path_buf()));
    let config = SupervisorConfig {
        poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
        max_concurrent,
    };
    let supervisor = Arc::new(JobSupervisor::new(store.clone(), engine, config));

    let job_id = supervisor.submit(magnet, torrent).await?;
    if !quiet {
        println!("Job {job_id} submitted.");
    }

    // Ctrl-C is the external cancellation actor for a foreground job.
    {
        let supervisor = Arc::clone(&supervisor);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = supervisor.cancel(job_id).await;
            }
        });
    }

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}",
                )
                .expect("Invalid progress template")
                .progress_chars("=>-"),
        );
        pb
    };

    let notifier = ProgressNotifier::with_tick(store.clone(), DISPLAY_TICK);
    let mut snapshots = Box::pin(notifier.subscribe(job_id).await?);
    while let Some(snapshot) = snapshots.next().await {
        progress.set_position(snapshot.progress.round() as u64);
        progress.set_message(snapshot.status_label.clone());
    }

    supervisor.wait(job_id).await?;

    let job = store.get(job_id).await?;
    match job.status {
        JobStatus::Completed => {
            let output = job
                .output_path
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            progress.finish_with_message(format!("Completed: {output}"));
            if !quiet {
                println!("Output written to: {output}");
            }
            Ok(())
        }
        status => {
            let cause = job.error_message.unwrap_or_else(|| status.label().into());
            progress.abandon_with_message(cause.clone());
            bail!("Download failed: {cause}");
        }
    }
}
