//! State shared by the pool façade, the dispatcher and the workers.
//!
//! Every thread holds an `Arc<Shared>`, so the channels inside outlive the
//! last thread that can touch them. Nothing here is ever closed explicitly;
//! shutdown is expressed only through [`StopSignal`].

use crate::core::{Result, StopSignal, WaitGroup};
use crate::pool::config::PoolConfig;
use crate::pool::slots::WorkerSlots;
use crate::pool::stats::PoolStats;
use crate::queue::{AdmissionQueue, Admitted};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) struct Shared {
    pub(crate) config: PoolConfig,
    pub(crate) queue: AdmissionQueue,
    pub(crate) slots: WorkerSlots,
    /// Rendezvous channel from the dispatcher to whichever idle worker is
    /// receiving first.
    pub(crate) handoff_tx: Sender<Admitted>,
    pub(crate) handoff_rx: Receiver<Admitted>,
    pub(crate) stop: StopSignal,
    pub(crate) threads: WaitGroup,
    pub(crate) stats: PoolStats,
    next_worker_id: AtomicUsize,
}

impl Shared {
    pub(crate) fn new(config: PoolConfig) -> Result<Self> {
        let (handoff_tx, handoff_rx) = crossbeam_channel::bounded(0);
        Ok(Self {
            queue: AdmissionQueue::new(config.core_size, config.max_size)?,
            slots: WorkerSlots::new(config.core_size),
            handoff_tx,
            handoff_rx,
            stop: StopSignal::new(),
            threads: WaitGroup::new(),
            stats: PoolStats::new(),
            next_worker_id: AtomicUsize::new(0),
            config,
        })
    }

    pub(crate) fn next_worker_id(&self) -> usize {
        self.next_worker_id.fetch_add(1, Ordering::Relaxed)
    }
}
