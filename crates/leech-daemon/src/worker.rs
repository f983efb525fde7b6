//! The per-job worker driving a transfer to a terminal state.

use crate::{JobStore, Result};
use leech_engine::TransferEngine;
use leech_types::{JobId, LeechError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives one job from queued to a terminal state.
///
/// Exactly one worker exists per job id, spawned by the supervisor. The
/// worker owns every worker-driven mutation of its record; the only other
/// writer is the external cancellation path, which the worker observes
/// within one poll interval.
#[derive(Debug)]
pub struct JobWorker<E: TransferEngine> {
    store: JobStore,
    engine: Arc<E>,
    job_id: JobId,
    poll_interval: Duration,
}

impl<E: TransferEngine> JobWorker<E> {
    /// Creates a worker bound to one job id.
    #[must_use]
    pub const fn new(
        store: JobStore,
        engine: Arc<E>,
        job_id: JobId,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            engine,
            job_id,
            poll_interval,
        }
    }

    /// Runs the job to a terminal state.
    ///
    /// Engine failures are recorded on the job, not returned; the returned
    /// error covers store failures only, which are fatal to this worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the job store becomes unavailable.
    pub async fn run(self) -> Result<()> {
        let job_id = self.job_id;
        let job = self.store.get(job_id).await?;

        // Cancelled before this worker got scheduled: nothing was started,
        // so there is nothing to release.
        if job.is_finished() {
            debug!(%job_id, "job already terminal before start");
            return Ok(());
        }

        let handle = match self.engine.begin(&job.source).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(%job_id, error = %e, "engine rejected source");
                self.fail(LeechError::from(e)).await?;
                return Ok(());
            }
        };

        let record = self
            .store
            .update(job_id, |job| {
                if !job.is_finished() {
                    job.mark_downloading();
                }
            })
            .await?;
        if record.is_finished() {
            info!(%job_id, "job cancelled while queued");
            self.engine.cancel(&handle).await;
            return Ok(());
        }
        info!(%job_id, source = %record.source.describe(), "transfer started");

        loop {
            // External cancellation short-circuit: stop without further
            // writes and release engine resources.
            let current = self.store.get(job_id).await?;
            if current.is_finished() {
                info!(%job_id, "job cancelled externally");
                self.engine.cancel(&handle).await;
                return Ok(());
            }

            let snapshot = match self.engine.poll(&handle).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(%job_id, error = %e, "transfer failed");
                    self.fail(LeechError::from(e)).await?;
                    return Ok(());
                }
            };

            let fraction = snapshot.fraction_complete.clamp(0.0, 1.0);
            let record = self
                .store
                .update(job_id, |job| {
                    if !job.is_finished() {
                        job.set_progress(fraction * 100.0);
                    }
                })
                .await?;
            if record.is_finished() {
                info!(%job_id, "job cancelled externally");
                self.engine.cancel(&handle).await;
                return Ok(());
            }
            debug!(%job_id, progress = record.progress, "transfer progress");

            if snapshot.done {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        match self.engine.locate_output(&handle).await {
            Ok(output_path) => {
                info!(%job_id, output = %output_path.display(), "transfer completed");
                self.store
                    .update(job_id, |job| {
                        if !job.is_finished() {
                            job.mark_completed(output_path);
                        }
                    })
                    .await?;
            }
            Err(e) => {
                warn!(%job_id, error = %e, "transfer done but artifact missing");
                self.fail(LeechError::from(e)).await?;
            }
        }

        Ok(())
    }

    /// Records a terminal failure unless the job already settled.
    async fn fail(&self, error: LeechError) -> Result<()> {
        self.store
            .update(self.job_id, |job| {
                if !job.is_finished() {
                    job.mark_failed(error.to_string());
                }
            })
            .await?;
        Ok(())
    }
}
