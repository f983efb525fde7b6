//! Download job record and lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a download job.
pub type JobId = Uuid;

/// Lifecycle state of a download job.
///
/// A job moves `Queued -> Downloading -> {Completed | Failed}`. There is no
/// transition out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job is queued but no worker has started it yet.
    #[default]
    Queued,
    /// A worker is actively driving the transfer.
    Downloading,
    /// Transfer finished and the output artifact was located.
    Completed,
    /// Transfer failed or was cancelled.
    Failed,
}

impl JobStatus {
    /// Returns true if the status is terminal (no further worker-driven
    /// mutation occurs).
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns the status as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Downloading => "downloading",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns the human-readable display label for this status.
    ///
    /// This is the only place status strings for rendered output come from;
    /// it is evaluated at the interface boundary, never stored.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Downloading => "Downloading",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source of a download job: exactly one of a magnet link or a torrent
/// descriptor on disk, fixed for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    /// A magnet URI.
    Magnet(String),
    /// Path to an uploaded `.torrent` descriptor.
    TorrentFile(PathBuf),
}

impl JobSource {
    /// Returns a short label describing the source, suitable for listings.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Magnet(link) => {
                let mut label: String = link.chars().take(40).collect();
                if link.chars().count() > 40 {
                    label.push_str("...");
                }
                label
            }
            Self::TorrentFile(path) => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
        }
    }
}

impl std::fmt::Display for JobSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Magnet(link) => write!(f, "{link}"),
            Self::TorrentFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A download job record, tracked from submission to a terminal state.
///
/// Created by the supervisor at submission time and mutated exclusively by
/// the one worker owning the job, plus the external cancellation path which
/// only forces `status` to [`JobStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeechJob {
    /// Unique identifier, assigned at creation.
    pub id: JobId,
    /// Timestamp when the job was submitted.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent mutation.
    pub updated_at: DateTime<Utc>,
    /// Transfer source for this job.
    pub source: JobSource,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Transfer progress in percent, within `[0, 100]`.
    pub progress: f64,
    /// Location of the produced artifact; set only on completion.
    pub output_path: Option<PathBuf>,
    /// Failure cause; set only when the job failed.
    pub error_message: Option<String>,
}

impl LeechJob {
    /// Creates a new queued job for the given source.
    #[must_use]
    pub fn new(source: JobSource) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            source,
            status: JobStatus::Queued,
            progress: 0.0,
            output_path: None,
            error_message: None,
        }
    }

    /// Returns true if the job is in a terminal state.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Refreshes the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Marks the job as actively downloading, resetting progress and
    /// clearing any stale error message.
    pub fn mark_downloading(&mut self) {
        self.status = JobStatus::Downloading;
        self.progress = 0.0;
        self.error_message = None;
    }

    /// Records a progress observation while downloading.
    ///
    /// The value is clamped to `[0, 100]`.
    pub fn set_progress(&mut self, percent: f64) {
        self.status = JobStatus::Downloading;
        self.progress = percent.clamp(0.0, 100.0);
    }

    /// Marks the job as completed with the located output artifact.
    pub fn mark_completed(&mut self, output_path: PathBuf) {
        self.status = JobStatus::Completed;
        self.progress = 100.0;
        self.output_path = Some(output_path);
    }

    /// Marks the job as failed with the given cause.
    ///
    /// Progress is left at its last good value.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error_message = Some(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_is_finished() {
        assert!(!JobStatus::Queued.is_finished());
        assert!(!JobStatus::Downloading.is_finished());
        assert!(JobStatus::Completed.is_finished());
        assert!(JobStatus::Failed.is_finished());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(JobStatus::Queued.as_str(), "queued");
        assert_eq!(JobStatus::Queued.label(), "Queued");
        assert_eq!(JobStatus::Downloading.label(), "Downloading");
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_new_job_is_queued() {
        let job = LeechJob::new(JobSource::Magnet("magnet:?xt=urn:btih:abc".into()));
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0.0);
        assert!(job.output_path.is_none());
        assert!(job.error_message.is_none());
        assert!(!job.is_finished());
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let mut job = LeechJob::new(JobSource::Magnet("magnet:?xt=urn:btih:abc".into()));

        job.mark_downloading();
        assert_eq!(job.status, JobStatus::Downloading);
        assert_eq!(job.progress, 0.0);

        job.set_progress(42.5);
        assert_eq!(job.progress, 42.5);

        job.mark_completed(PathBuf::from("/tmp/out.txt"));
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100.0);
        assert_eq!(job.output_path, Some(PathBuf::from("/tmp/out.txt")));
        assert!(job.is_finished());
    }

    #[test]
    fn test_failure_freezes_progress() {
        let mut job = LeechJob::new(JobSource::Magnet("magnet:?xt=urn:btih:abc".into()));
        job.mark_downloading();
        job.set_progress(64.0);

        job.mark_failed("tracker unreachable");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.progress, 64.0);
        assert_eq!(job.error_message.as_deref(), Some("tracker unreachable"));
        assert!(job.output_path.is_none());
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut job = LeechJob::new(JobSource::TorrentFile(PathBuf::from("a.torrent")));
        job.set_progress(150.0);
        assert_eq!(job.progress, 100.0);
        job.set_progress(-3.0);
        assert_eq!(job.progress, 0.0);
    }

    #[test]
    fn test_downloading_clears_error() {
        let mut job = LeechJob::new(JobSource::Magnet("magnet:?xt=urn:btih:abc".into()));
        job.mark_failed("boom");
        job.mark_downloading();
        assert!(job.error_message.is_none());
    }

    #[test]
    fn test_source_describe_truncates_magnet() {
        let link = format!("magnet:?xt=urn:btih:{}", "a".repeat(64));
        let source = JobSource::Magnet(link);
        let label = source.describe();
        assert!(label.ends_with("..."));
        assert_eq!(label.chars().count(), 43);
    }

    #[test]
    fn test_source_serde_round_trip() {
        let source = JobSource::TorrentFile(PathBuf::from("ubuntu.torrent"));
        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains("torrent_file"));
        let back: JobSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, source);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Downloading).unwrap();
        assert_eq!(json, "\"downloading\"");
    }
}
