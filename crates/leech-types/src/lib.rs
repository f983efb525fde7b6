//! Core types for the leech download job engine.
//!
//! This crate provides the fundamental data structures used throughout leech:
//!
//! - [`JobId`] - Unique identifier for download jobs
//! - [`JobStatus`] - Lifecycle state of a job
//! - [`JobSource`] - Magnet link or torrent descriptor for a job
//! - [`LeechJob`] - The job record tracked from submission to terminal state
//! - [`ProgressSnapshot`] - Point-in-time view of a job emitted to observers
//! - [`LeechError`] - Top-level error taxonomy

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/leechd/leech/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod job;
mod snapshot;

pub use error::{LeechError, Result};
pub use job::{JobId, JobSource, JobStatus, LeechJob};
pub use snapshot::ProgressSnapshot;
