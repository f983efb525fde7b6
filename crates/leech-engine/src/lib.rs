//! Transfer engine adapter for leech.
//!
//! The job lifecycle engine never speaks a transfer protocol itself; it
//! drives an opaque engine through the [`TransferEngine`] trait:
//!
//! - [`TransferEngine`] - starts, polls, resolves, and cancels transfers
//! - [`TransferPoll`] - one bounded-time progress observation
//! - [`EngineError`] - adapter-originated failures, all terminal for a job
//! - [`SimulatedEngine`] - conforming implementation with synthetic progress

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/leechd/leech/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod simulated;

pub use engine::{EngineError, TransferEngine, TransferPoll};
pub use simulated::{SimulatedEngine, SimulatedTransfer};
