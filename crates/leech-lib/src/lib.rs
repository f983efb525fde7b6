//! Asynchronous torrent-leech job engine.
//!
//! This is a facade crate that re-exports functionality from the leech
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use leech_lib::prelude::*;
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = JobStore::open_default()?;
//!     let engine = Arc::new(SimulatedEngine::new(store.downloads_path().to_path_buf()));
//!     let supervisor = JobSupervisor::new(store.clone(), engine, SupervisorConfig::default());
//!
//!     let job_id = supervisor.submit(Some("magnet:?xt=urn:btih:...".into()), None).await?;
//!
//!     let notifier = ProgressNotifier::new(store);
//!     let mut snapshots = Box::pin(notifier.subscribe(job_id).await?);
//!     while let Some(snapshot) = snapshots.next().await {
//!         println!("{} {:.0}%", snapshot.status_label, snapshot.progress);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/leechd/leech/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the data model
pub use leech_types::*;

// Re-export the transfer engine adapter
pub use leech_engine::{EngineError, SimulatedEngine, SimulatedTransfer, TransferEngine, TransferPoll};

// Re-export the job lifecycle engine
pub use leech_daemon::{
    CANCEL_MESSAGE, JobStore, JobSupervisor, JobWorker, ProgressNotifier, StoreError,
    SupervisorConfig, sse_frame,
};

/// Prelude module for convenient imports.
///
/// ```
/// use leech_lib::prelude::*;
/// ```
pub mod prelude {
    pub use leech_types::{
        JobId, JobSource, JobStatus, LeechError, LeechJob, ProgressSnapshot, Result,
    };

    pub use leech_engine::{EngineError, SimulatedEngine, TransferEngine, TransferPoll};

    pub use leech_daemon::{
        CANCEL_MESSAGE, JobStore, JobSupervisor, JobWorker, ProgressNotifier, StoreError,
        SupervisorConfig, sse_frame,
    };
}
