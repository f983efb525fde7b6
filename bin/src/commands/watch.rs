//! Live progress streaming as server-sent-event frames.

use super::{open_store, parse_job_id};
use anyhow::Result;
use futures::StreamExt;
use leech_lib::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Execute the watch command.
///
/// Prints one `data: <json>\n\n` frame per tick until the job reaches a
/// terminal state, then exits.
pub(crate) async fn watch(job_id: &str, tick_ms: u64, store_path: Option<PathBuf>) -> Result<()> {
    let store = open_store(store_path)?;
    let id = parse_job_id(job_id)?;

    let notifier = ProgressNotifier::with_tick(store, Duration::from_millis(tick_ms.max(1)));
    let mut frames = Box::pin(notifier.sse_frames(id).await?);

    let mut stdout = std::io::stdout();
    while let Some(frame) = frames.next().await {
        stdout.write_all(frame?.as_bytes())?;
        stdout.flush()?;
    }

    Ok(())
}
