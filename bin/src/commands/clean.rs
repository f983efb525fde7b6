//! Remove finished job records from storage.

use super::open_store;
use anyhow::Result;
use std::path::PathBuf;

/// Execute the clean command.
///
/// The engine itself never deletes records; retention belongs to this
/// external actor. Artifacts under `downloads/` are left in place.
pub(crate) async fn clean(store_path: Option<PathBuf>) -> Result<()> {
    let store = open_store(store_path)?;

    let mut removed = 0usize;
    for job in store.list().await {
        if job.is_finished() {
            store.delete(job.id).await?;
            removed += 1;
        }
    }

    println!("Removed {removed} finished job(s).");
    Ok(())
}
