//! Job submission, admission control, and the active-worker registry.

use crate::{JobStore, JobWorker};
use leech_engine::TransferEngine;
use leech_types::{JobId, JobSource, LeechError, LeechJob};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Error message recorded on jobs failed by external cancellation, so the
/// failed-implies-message invariant holds on that path too.
pub const CANCEL_MESSAGE: &str = "Job cancelled";

/// Configuration for the job supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Delay between successive worker polls of the transfer engine.
    pub poll_interval: Duration,
    /// Upper bound on concurrently running workers; jobs beyond the bound
    /// stay queued until a slot frees. `None` runs every job immediately.
    pub max_concurrent: Option<usize>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_concurrent: None,
        }
    }
}

/// Accepts submissions, spawns one worker task per job, and owns the
/// process-wide registry of active workers.
///
/// The registry exists so a job id can be mapped back to its running
/// worker; entries are removed when the worker terminates. At most one
/// worker is ever launched per job id.
#[derive(Debug)]
pub struct JobSupervisor<E: TransferEngine> {
    store: JobStore,
    engine: Arc<E>,
    config: SupervisorConfig,
    permits: Option<Arc<Semaphore>>,
    active: Arc<Mutex<HashMap<JobId, JoinHandle<()>>>>,
}

impl<E: TransferEngine> JobSupervisor<E> {
    /// Creates a supervisor driving the given engine against the given store.
    #[must_use]
    pub fn new(store: JobStore, engine: Arc<E>, config: SupervisorConfig) -> Self {
        let permits = config
            .max_concurrent
            .map(|n| Arc::new(Semaphore::new(n.max(1))));
        Self {
            store,
            engine,
            config,
            permits,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the store this supervisor writes to.
    #[must_use]
    pub const fn store(&self) -> &JobStore {
        &self.store
    }

    /// Submits a new download job and returns its id immediately.
    ///
    /// Exactly one source must be present: a non-blank magnet link or a
    /// torrent descriptor path. The record is created queued and a worker
    /// is launched (subject to admission control); the call never waits for
    /// the transfer.
    ///
    /// # Errors
    ///
    /// Returns [`LeechError::InvalidSubmission`] if neither or both sources
    /// are given (no record is created), or a store error if the record
    /// cannot be persisted.
    pub async fn submit(
        &self,
        magnet: Option<String>,
        torrent_file: Option<PathBuf>,
    ) -> Result<JobId, LeechError> {
        let source = resolve_source(magnet, torrent_file)?;

        let job = LeechJob::new(source);
        let job_id = job.id;
        self.store.insert(job).await.map_err(LeechError::from)?;
        info!(%job_id, "job submitted");

        let store = self.store.clone();
        let engine = Arc::clone(&self.engine);
        let poll_interval = self.config.poll_interval;
        let permits = self.permits.clone();
        let active = Arc::clone(&self.active);

        // Holding the registry lock across the spawn means the worker's
        // own removal cannot run before the entry is inserted. A poisoned
        // lock is recovered rather than skipped; dropping the submission
        // would strand the freshly persisted record in the queued state.
        let mut registry = lock_registry(&self.active);
        let handle = tokio::spawn(async move {
            let _permit = match permits {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            let worker = JobWorker::new(store, engine, job_id, poll_interval);
            if let Err(e) = worker.run().await {
                error!(%job_id, error = %e, "worker aborted on store failure");
            }

            lock_registry(&active).remove(&job_id);
        });
        registry.insert(job_id, handle);
        drop(registry);

        Ok(job_id)
    }

    /// Forces a non-terminal job into the failed state.
    ///
    /// This is the external cancellation path: it writes `status` only (plus
    /// the mandatory error message) in one atomic update. The owning worker
    /// observes the change within one poll interval, releases the engine's
    /// resources, and stops. Returns true if the job was still live, false
    /// if it had already settled.
    ///
    /// # Errors
    ///
    /// Returns [`LeechError::NotFound`] for unknown job ids.
    pub async fn cancel(&self, job_id: JobId) -> Result<bool, LeechError> {
        let mut cancelled = false;
        self.store
            .update(job_id, |job| {
                if !job.is_finished() {
                    job.mark_failed(CANCEL_MESSAGE);
                    cancelled = true;
                }
            })
            .await
            .map_err(LeechError::from)?;

        if cancelled {
            info!(%job_id, "job cancelled");
        }
        Ok(cancelled)
    }

    /// Waits for the worker owning `job_id` to terminate.
    ///
    /// Returns immediately if no worker is registered for the id (never
    /// started, or already finished).
    ///
    /// # Errors
    ///
    /// Returns a store error if the worker task panicked.
    pub async fn wait(&self, job_id: JobId) -> Result<(), LeechError> {
        let handle = lock_registry(&self.active).remove(&job_id);

        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| LeechError::Store(format!("worker task failed: {e}")))?;
        }
        Ok(())
    }

    /// Returns the number of workers currently registered.
    #[must_use]
    pub fn active_count(&self) -> usize {
        lock_registry(&self.active).len()
    }

    /// Returns true if a worker is registered for the given job id.
    #[must_use]
    pub fn is_active(&self, job_id: JobId) -> bool {
        lock_registry(&self.active).contains_key(&job_id)
    }
}

/// Locks the worker registry, recovering the guard if a panic on another
/// thread poisoned the mutex. The map stays consistent either way; insert
/// and remove are single operations.
fn lock_registry(
    active: &Mutex<HashMap<JobId, JoinHandle<()>>>,
) -> std::sync::MutexGuard<'_, HashMap<JobId, JoinHandle<()>>> {
    active
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Validates that exactly one source is present and builds it.
///
/// A blank or whitespace-only magnet link counts as absent.
fn resolve_source(
    magnet: Option<String>,
    torrent_file: Option<PathBuf>,
) -> Result<JobSource, LeechError> {
    let magnet = magnet
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    match (magnet, torrent_file) {
        (Some(link), None) => Ok(JobSource::Magnet(link)),
        (None, Some(path)) => Ok(JobSource::TorrentFile(path)),
        (Some(_), Some(_)) => Err(LeechError::InvalidSubmission(
            "provide either a magnet link or a torrent file, not both".into(),
        )),
        (None, None) => Err(LeechError::InvalidSubmission(
            "provide a magnet link or a torrent file".into(),
        )),
    }
}
