//! Admission side of the pool.
//!
//! Every submitted task passes through the [`AdmissionQueue`], which enforces
//! the pool's backpressure: at most `max_size` tasks may be outstanding, and a
//! submission beyond that is either rejected at once or made to wait for a
//! bounded time, depending on the [`BackpressureStrategy`] the caller picks.

mod admission;

pub use admission::{AdmissionError, AdmissionPermit, AdmissionQueue, Admitted};

use std::time::Duration;

/// How a submission behaves when the pool is saturated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BackpressureStrategy {
    /// Fail immediately with `PoolError::Saturated` (default)
    #[default]
    RejectImmediately,
    /// Wait for a free admission slot, failing with
    /// `PoolError::SubmissionTimeout` once the timeout elapses
    BlockWithTimeout(Duration),
}
