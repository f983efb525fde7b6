//! Simulated transfer engine with synthetic progress.
//!
//! Conforms to [`TransferEngine`] without touching the network: each poll
//! advances the transfer by a fixed step, and completion produces a small
//! synthetic text artifact. The CLI uses it as its default engine and the
//! test suite uses it to drive workers deterministically.

use crate::{EngineError, TransferEngine, TransferPoll};
use async_trait::async_trait;
use leech_types::JobSource;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

/// A transfer engine that fakes the download.
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    output_dir: PathBuf,
    step: f64,
}

/// Handle for one simulated transfer.
#[derive(Debug)]
pub struct SimulatedTransfer {
    id: Uuid,
    label: String,
    state: Mutex<SimState>,
}

#[derive(Debug)]
struct SimState {
    fraction: f64,
    cancelled: bool,
}

impl SimulatedEngine {
    /// Fraction of the transfer completed per poll (8%, so a transfer
    /// finishes after 13 polls).
    pub const DEFAULT_STEP: f64 = 0.08;

    /// Creates a simulated engine writing artifacts under `output_dir`.
    #[must_use]
    pub fn new(output_dir: PathBuf) -> Self {
        Self::with_step(output_dir, Self::DEFAULT_STEP)
    }

    /// Creates a simulated engine with a custom per-poll step.
    ///
    /// The step is clamped to `(0, 1]` so every transfer terminates.
    #[must_use]
    pub fn with_step(output_dir: PathBuf, step: f64) -> Self {
        Self {
            output_dir,
            step: step.clamp(f64::MIN_POSITIVE, 1.0),
        }
    }

    /// Returns the directory artifacts are written to.
    #[must_use]
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }
}

#[async_trait]
impl TransferEngine for SimulatedEngine {
    type Handle = SimulatedTransfer;

    async fn begin(&self, source: &JobSource) -> Result<Self::Handle, EngineError> {
        match source {
            JobSource::Magnet(link) => {
                let link = link.trim();
                if link.is_empty() {
                    return Err(EngineError::InvalidSource("empty magnet link".into()));
                }
                if !link.starts_with("magnet:") {
                    return Err(EngineError::InvalidSource(format!(
                        "not a magnet URI: {link}"
                    )));
                }
            }
            JobSource::TorrentFile(path) => {
                let content = tokio::fs::read(path).await.map_err(|e| {
                    EngineError::InvalidSource(format!(
                        "unreadable torrent descriptor '{}': {e}",
                        path.display()
                    ))
                })?;
                // Bencoded metadata always opens a dictionary.
                if content.first() != Some(&b'd') {
                    return Err(EngineError::InvalidSource(format!(
                        "malformed torrent metadata in '{}'",
                        path.display()
                    )));
                }
            }
        }

        Ok(SimulatedTransfer {
            id: Uuid::new_v4(),
            label: source.describe(),
            state: Mutex::new(SimState {
                fraction: 0.0,
                cancelled: false,
            }),
        })
    }

    async fn poll(&self, handle: &Self::Handle) -> Result<TransferPoll, EngineError> {
        let mut state = handle
            .state
            .lock()
            .map_err(|_| EngineError::Transfer("simulated transfer state poisoned".into()))?;

        if state.cancelled {
            return Err(EngineError::Transfer("transfer cancelled".into()));
        }

        state.fraction = (state.fraction + self.step).min(1.0);
        Ok(TransferPoll {
            fraction_complete: state.fraction,
            done: state.fraction >= 1.0,
        })
    }

    async fn locate_output(&self, handle: &Self::Handle) -> Result<PathBuf, EngineError> {
        let path = self.output_dir.join(format!("{}.txt", handle.id));

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                EngineError::ArtifactMissing(format!(
                    "cannot create output directory '{}': {e}",
                    self.output_dir.display()
                ))
            })?;

        let content = format!("Simulated leech result for {}\n", handle.label);
        tokio::fs::write(&path, content).await.map_err(|e| {
            EngineError::ArtifactMissing(format!(
                "cannot write artifact '{}': {e}",
                path.display()
            ))
        })?;

        Ok(path)
    }

    async fn cancel(&self, handle: &Self::Handle) {
        if let Ok(mut state) = handle.state.lock() {
            state.cancelled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine(dir: &TempDir) -> SimulatedEngine {
        SimulatedEngine::new(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn test_begin_rejects_empty_magnet() {
        let dir = TempDir::new().unwrap();
        let result = engine(&dir).begin(&JobSource::Magnet("   ".into())).await;
        assert!(matches!(result, Err(EngineError::InvalidSource(_))));
    }

    #[tokio::test]
    async fn test_begin_rejects_non_magnet_uri() {
        let dir = TempDir::new().unwrap();
        let result = engine(&dir)
            .begin(&JobSource::Magnet("http://example.com/file".into()))
            .await;
        assert!(matches!(result, Err(EngineError::InvalidSource(_))));
    }

    #[tokio::test]
    async fn test_begin_rejects_missing_torrent_file() {
        let dir = TempDir::new().unwrap();
        let result = engine(&dir)
            .begin(&JobSource::TorrentFile(
                dir.path().join("does-not-exist.torrent"),
            ))
            .await;
        assert!(matches!(result, Err(EngineError::InvalidSource(_))));
    }

    #[tokio::test]
    async fn test_begin_rejects_malformed_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.torrent");
        std::fs::write(&path, "this is not bencoded").unwrap();

        let result = engine(&dir).begin(&JobSource::TorrentFile(path)).await;
        assert!(matches!(result, Err(EngineError::InvalidSource(_))));
    }

    #[tokio::test]
    async fn test_begin_accepts_bencoded_descriptor() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ok.torrent");
        std::fs::write(&path, "d8:announce3:urle").unwrap();

        assert!(engine(&dir).begin(&JobSource::TorrentFile(path)).await.is_ok());
    }

    #[tokio::test]
    async fn test_poll_advances_to_done() {
        let dir = TempDir::new().unwrap();
        let engine = SimulatedEngine::with_step(dir.path().to_path_buf(), 0.25);
        let handle = engine
            .begin(&JobSource::Magnet("magnet:?xt=urn:btih:abc".into()))
            .await
            .unwrap();

        let mut last = 0.0;
        let mut polls = 0;
        loop {
            let snapshot = engine.poll(&handle).await.unwrap();
            assert!(snapshot.fraction_complete >= last);
            last = snapshot.fraction_complete;
            polls += 1;
            if snapshot.done {
                break;
            }
        }

        assert_eq!(polls, 4);
        assert_eq!(last, 1.0);
    }

    #[tokio::test]
    async fn test_locate_output_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let engine = SimulatedEngine::with_step(dir.path().to_path_buf(), 1.0);
        let handle = engine
            .begin(&JobSource::Magnet("magnet:?xt=urn:btih:abc".into()))
            .await
            .unwrap();

        let snapshot = engine.poll(&handle).await.unwrap();
        assert!(snapshot.done);

        let path = engine.locate_output(&handle).await.unwrap();
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Simulated leech result"));
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_fails_polls() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let handle = engine
            .begin(&JobSource::Magnet("magnet:?xt=urn:btih:abc".into()))
            .await
            .unwrap();

        engine.cancel(&handle).await;
        engine.cancel(&handle).await;

        let result = engine.poll(&handle).await;
        assert!(matches!(result, Err(EngineError::Transfer(_))));
    }
}
