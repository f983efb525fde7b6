//! Live progress subscriptions over the job store.

use crate::JobStore;
use futures::Stream;
use futures::stream;
use leech_types::{JobId, LeechError, ProgressSnapshot};
use std::time::Duration;

/// Encodes one snapshot as a server-sent-event text frame.
///
/// The frame is `data: <json>\n\n`, with the payload fields
/// `{status, status_label, progress, output_url, error}`.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be serialized.
pub fn sse_frame(snapshot: &ProgressSnapshot) -> serde_json::Result<String> {
    let payload = serde_json::to_string(snapshot)?;
    Ok(format!("data: {payload}\n\n"))
}

/// Streams live job snapshots to observers.
///
/// Each subscription re-reads the store on its own cadence, fully decoupled
/// from the worker's poll interval, and terminates after the first snapshot
/// carrying a terminal status. Subscriptions are independent: any number of
/// simultaneous observers may watch the same job without interfering with
/// each other or with the owning worker.
#[derive(Debug, Clone)]
pub struct ProgressNotifier {
    store: JobStore,
    tick: Duration,
}

struct Subscription {
    store: JobStore,
    job_id: JobId,
    tick: Duration,
    first: bool,
    done: bool,
}

impl ProgressNotifier {
    /// Default delay between successive snapshots of one subscription.
    pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

    /// Creates a notifier reading from the given store at the default tick.
    #[must_use]
    pub const fn new(store: JobStore) -> Self {
        Self {
            store,
            tick: Self::DEFAULT_TICK,
        }
    }

    /// Creates a notifier with a custom tick.
    #[must_use]
    pub const fn with_tick(store: JobStore, tick: Duration) -> Self {
        Self { store, tick }
    }

    /// Opens a live snapshot stream for one job.
    ///
    /// The first snapshot is emitted immediately; subsequent snapshots
    /// follow one tick apart until a terminal status is observed, which is
    /// emitted and ends the stream. The stream is not restartable.
    ///
    /// # Errors
    ///
    /// Returns [`LeechError::NotFound`] if no job exists with the given id.
    pub async fn subscribe(
        &self,
        job_id: JobId,
    ) -> Result<impl Stream<Item = ProgressSnapshot> + Send, LeechError> {
        // Unknown ids fail synchronously rather than as an empty stream.
        self.store.get(job_id).await.map_err(LeechError::from)?;

        let subscription = Subscription {
            store: self.store.clone(),
            job_id,
            tick: self.tick,
            first: true,
            done: false,
        };

        Ok(stream::unfold(subscription, |mut sub| async move {
            if sub.done {
                return None;
            }
            if sub.first {
                sub.first = false;
            } else {
                tokio::time::sleep(sub.tick).await;
            }

            // The core never deletes records; if an external actor removed
            // this one mid-stream, the stream simply ends.
            let job = sub.store.get(sub.job_id).await.ok()?;
            let snapshot = ProgressSnapshot::from(&job);
            if snapshot.is_terminal() {
                sub.done = true;
            }
            Some((snapshot, sub))
        }))
    }

    /// Opens a live stream of SSE text frames for one job.
    ///
    /// Same cadence and termination as [`subscribe`](Self::subscribe), with
    /// each snapshot encoded by [`sse_frame`].
    ///
    /// # Errors
    ///
    /// Returns [`LeechError::NotFound`] if no job exists with the given id.
    pub async fn sse_frames(
        &self,
        job_id: JobId,
    ) -> Result<impl Stream<Item = serde_json::Result<String>> + Send, LeechError> {
        use futures::StreamExt;
        let snapshots = self.subscribe(job_id).await?;
        Ok(snapshots.map(|snapshot| sse_frame(&snapshot)))
    }
}
