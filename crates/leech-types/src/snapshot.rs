//! Point-in-time job snapshots emitted to progress observers.

use crate::{JobStatus, LeechJob};
use serde::{Deserialize, Serialize};

/// Observable copy of a job's state, emitted to subscribers on every
/// notifier tick.
///
/// `output_url` and `error` are empty strings rather than nulls when unset,
/// matching the wire payload consumed by observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Display label for `status`, resolved at the interface boundary.
    pub status_label: String,
    /// Transfer progress in percent.
    pub progress: f64,
    /// Reference to the completed artifact, or empty while unavailable.
    pub output_url: String,
    /// Failure cause, or empty while the job has not failed.
    pub error: String,
}

impl ProgressSnapshot {
    /// Returns true if this snapshot carries a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_finished()
    }
}

impl From<&LeechJob> for ProgressSnapshot {
    fn from(job: &LeechJob) -> Self {
        Self {
            status: job.status,
            status_label: job.status.label().to_string(),
            progress: job.progress,
            output_url: job
                .output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            error: job.error_message.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JobSource;
    use std::path::PathBuf;

    #[test]
    fn test_snapshot_of_running_job() {
        let mut job = LeechJob::new(JobSource::Magnet("magnet:?xt=urn:btih:abc".into()));
        job.mark_downloading();
        job.set_progress(24.0);

        let snap = ProgressSnapshot::from(&job);
        assert_eq!(snap.status, JobStatus::Downloading);
        assert_eq!(snap.status_label, "Downloading");
        assert_eq!(snap.progress, 24.0);
        assert_eq!(snap.output_url, "");
        assert_eq!(snap.error, "");
        assert!(!snap.is_terminal());
    }

    #[test]
    fn test_snapshot_of_completed_job() {
        let mut job = LeechJob::new(JobSource::Magnet("magnet:?xt=urn:btih:abc".into()));
        job.mark_completed(PathBuf::from("/data/downloads/out.txt"));

        let snap = ProgressSnapshot::from(&job);
        assert_eq!(snap.status, JobStatus::Completed);
        assert_eq!(snap.progress, 100.0);
        assert_eq!(snap.output_url, "/data/downloads/out.txt");
        assert!(snap.is_terminal());
    }

    #[test]
    fn test_snapshot_serializes_expected_fields() {
        let mut job = LeechJob::new(JobSource::Magnet("magnet:?xt=urn:btih:abc".into()));
        job.mark_failed("no peers");

        let snap = ProgressSnapshot::from(&job);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["status_label"], "Failed");
        assert_eq!(json["error"], "no peers");
        assert_eq!(json["output_url"], "");
    }
}
