//! The transfer engine adapter contract.

use async_trait::async_trait;
use leech_types::{JobSource, LeechError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by a transfer engine.
///
/// The adapter owns all protocol-level retry and backoff internally; any
/// error that escapes through this type is unrecoverable for the job that
/// triggered it.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The source is invalid: empty magnet link, unreadable torrent
    /// descriptor, or malformed torrent metadata.
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// The transfer failed after it had started.
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// The transfer reported done but the artifact cannot be produced or
    /// located on disk.
    #[error("Artifact missing: {0}")]
    ArtifactMissing(String),
}

impl From<EngineError> for LeechError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidSource(msg) => Self::EngineStartFailure(msg),
            EngineError::Transfer(msg) => Self::EngineRuntimeFailure(msg),
            EngineError::ArtifactMissing(msg) => Self::ArtifactMissing(msg),
        }
    }
}

/// One bounded-time observation of an in-progress transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferPoll {
    /// Fraction of the transfer completed, in `[0, 1]`.
    pub fraction_complete: f64,
    /// True once the transfer has finished and the output can be located.
    pub done: bool,
}

/// Interface to an external transfer engine.
///
/// One handle corresponds to one in-flight transfer; handles are never
/// shared between jobs. All methods are bounded-time or internally
/// asynchronous, so callers may invoke them from a polling loop without
/// blocking longer than one poll interval.
#[async_trait]
pub trait TransferEngine: Send + Sync + 'static {
    /// Opaque per-transfer handle.
    type Handle: Send + Sync;

    /// Starts a transfer for the given source.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSource`] if the source cannot be used
    /// to start a transfer.
    async fn begin(&self, source: &JobSource) -> Result<Self::Handle, EngineError>;

    /// Takes a progress snapshot of an in-flight transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer has failed; the failure is terminal.
    async fn poll(&self, handle: &Self::Handle) -> Result<TransferPoll, EngineError>;

    /// Resolves the on-disk location of the completed artifact.
    ///
    /// Only meaningful after [`poll`](Self::poll) has reported `done`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ArtifactMissing`] if the artifact cannot be
    /// located despite the transfer having finished.
    async fn locate_output(&self, handle: &Self::Handle) -> Result<PathBuf, EngineError>;

    /// Best-effort abort of an in-progress transfer. Idempotent.
    async fn cancel(&self, handle: &Self::Handle);
}
