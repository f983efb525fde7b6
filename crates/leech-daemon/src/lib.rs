//! Job lifecycle engine for leech.
//!
//! This crate drives a download job from submission to a terminal state:
//!
//! - [`JobStore`] - Persistent job records with atomic read-modify-write
//! - [`JobWorker`] - One polling task per active job
//! - [`JobSupervisor`] - Submission, admission control, worker registry,
//!   cancellation
//! - [`ProgressNotifier`] - Live snapshot streams and SSE frame encoding

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/leechd/leech/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod notifier;
mod store;
mod supervisor;
mod worker;

pub use notifier::{ProgressNotifier, sse_frame};
pub use store::{JobStore, Result, StoreError};
pub use supervisor::{CANCEL_MESSAGE, JobSupervisor, SupervisorConfig};
pub use worker::JobWorker;
