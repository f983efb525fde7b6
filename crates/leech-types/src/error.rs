//! Error taxonomy for leech.

use crate::JobId;
use thiserror::Error;

/// Result type alias for leech operations.
pub type Result<T> = std::result::Result<T, LeechError>;

/// Errors surfaced by the job lifecycle engine.
///
/// Engine-originated failures ([`EngineStartFailure`](Self::EngineStartFailure),
/// [`EngineRuntimeFailure`](Self::EngineRuntimeFailure),
/// [`ArtifactMissing`](Self::ArtifactMissing)) are terminal for the job they
/// belong to: the job is marked failed and never automatically retried.
/// [`InvalidSubmission`](Self::InvalidSubmission) is rejected synchronously
/// before any job record exists.
#[derive(Error, Debug)]
pub enum LeechError {
    /// Submission carried neither or both of a magnet link and a torrent
    /// descriptor.
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// The transfer engine rejected the source when starting.
    #[error("Failed to start transfer: {0}")]
    EngineStartFailure(String),

    /// The transfer engine reported an unrecoverable error mid-transfer.
    #[error("Transfer failed: {0}")]
    EngineRuntimeFailure(String),

    /// The transfer reported done but the output artifact cannot be located.
    #[error("Transfer output missing: {0}")]
    ArtifactMissing(String),

    /// No job exists with the given identifier.
    #[error("Job not found: {0}")]
    NotFound(JobId),

    /// The job store failed; fatal to the current operation.
    #[error("Store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_messages() {
        let err = LeechError::InvalidSubmission("provide a magnet link or a torrent file".into());
        assert!(err.to_string().starts_with("Invalid submission"));

        let id = Uuid::new_v4();
        let err = LeechError::NotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }
}
