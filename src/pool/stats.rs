//! Pool-wide counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Statistics shared by the façade, the dispatcher and every worker
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Tasks admitted by `submit`/`submit_timeout`
    pub submitted: AtomicU64,
    /// Submissions refused because the pool was saturated or not running
    pub rejected: AtomicU64,
    /// Tasks that ran to completion
    pub completed: AtomicU64,
    /// Tasks that panicked (contained by the worker)
    pub panicked: AtomicU64,
    /// Admitted tasks dropped unexecuted during teardown
    pub discarded: AtomicU64,
    /// Workers spawned over the pool's lifetime
    pub workers_spawned: AtomicU64,
    /// Workers that exited after their idle timeout
    pub workers_reclaimed: AtomicU64,
    /// Tasks executing right now
    pub busy: AtomicUsize,
}

/// Point-in-time copy of [`PoolStats`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatsSnapshot {
    /// Tasks admitted
    pub submitted: u64,
    /// Submissions refused
    pub rejected: u64,
    /// Tasks completed
    pub completed: u64,
    /// Tasks that panicked
    pub panicked: u64,
    /// Tasks discarded at teardown
    pub discarded: u64,
    /// Workers spawned
    pub workers_spawned: u64,
    /// Workers reclaimed by idle timeout
    pub workers_reclaimed: u64,
    /// Tasks executing
    pub busy: usize,
}

impl PoolStats {
    /// Create zeroed statistics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_panicked(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self, count: usize) {
        self.discarded.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_worker_spawned(&self) {
        self.workers_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_worker_reclaimed(&self) {
        self.workers_reclaimed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_started(&self) {
        self.busy.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn task_finished(&self) {
        self.busy.fetch_sub(1, Ordering::AcqRel);
    }

    /// Get the number of tasks executing right now
    pub fn busy(&self) -> usize {
        self.busy.load(Ordering::Acquire)
    }

    /// Copy every counter
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            workers_spawned: self.workers_spawned.load(Ordering::Relaxed),
            workers_reclaimed: self.workers_reclaimed.load(Ordering::Relaxed),
            busy: self.busy(),
        }
    }
}
