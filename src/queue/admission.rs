//! Bounded admission queue.
//!
//! Admission is accounted with permits rather than with the channel's own
//! capacity: a task holds an [`AdmissionPermit`] from the moment it is
//! accepted until it has finished running (or has been discarded). The pool
//! therefore never has more than `max_size` tasks outstanding, counting both
//! the tasks waiting for a worker and the tasks being executed, regardless of
//! how quickly the dispatcher drains the channel.
//!
//! Acquiring a permit and enqueueing the task are separate steps so the pool
//! can re-check its lifecycle in between.

use crate::core::{BoxedTask, PoolError};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Reasons a task was not admitted. The rejected task is handed back.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// Every admission permit is taken
    #[error("admission queue is full")]
    Full(BoxedTask),
    /// No permit freed up before the deadline
    #[error("timed out waiting for admission")]
    Timeout(BoxedTask),
    /// The queue was closed while waiting
    #[error("admission queue is closed")]
    Closed(BoxedTask),
}

/// Permit counter. The count itself is atomic so it can be read without a
/// lock; the mutex only orders waiters against releases and closing.
#[derive(Debug)]
struct AdmissionGate {
    outstanding: AtomicUsize,
    closed: AtomicBool,
    waiters: Mutex<()>,
    freed: Condvar,
    max_size: usize,
}

impl AdmissionGate {
    fn try_acquire(self: &Arc<Self>) -> Option<AdmissionPermit> {
        self.outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_size).then_some(n + 1)
            })
            .ok()
            .map(|_| AdmissionPermit {
                gate: Arc::clone(self),
            })
    }

    /// Wait for a permit until `deadline`, or without limit when `None`.
    /// Gives up early once the gate is closed.
    fn acquire_until(self: &Arc<Self>, deadline: Option<Instant>) -> Option<AdmissionPermit> {
        let mut guard = self.waiters.lock();
        loop {
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            if let Some(permit) = self.try_acquire() {
                return Some(permit);
            }
            match deadline {
                Some(deadline) => {
                    if self.freed.wait_until(&mut guard, deadline).timed_out() {
                        if self.closed.load(Ordering::Acquire) {
                            return None;
                        }
                        return self.try_acquire();
                    }
                }
                None => self.freed.wait(&mut guard),
            }
        }
    }

    fn release(&self) {
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
        let _guard = self.waiters.lock();
        self.freed.notify_one();
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let _guard = self.waiters.lock();
        self.freed.notify_all();
    }
}

/// Proof that a task holds one of the `max_size` admission slots.
///
/// Dropping the permit frees the slot and wakes one waiting submitter.
#[derive(Debug)]
pub struct AdmissionPermit {
    gate: Arc<AdmissionGate>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// A task travelling through the pool together with its admission permit
#[derive(Debug)]
pub struct Admitted {
    /// The task to run
    pub task: BoxedTask,
    /// Released once the task is done with
    pub permit: AdmissionPermit,
}

/// FIFO of admitted tasks waiting for the dispatcher
pub struct AdmissionQueue {
    sender: Sender<Admitted>,
    receiver: Receiver<Admitted>,
    gate: Arc<AdmissionGate>,
    capacity: usize,
}

impl std::fmt::Debug for AdmissionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionQueue")
            .field("len", &self.len())
            .field("outstanding", &self.outstanding())
            .field("capacity", &self.capacity)
            .field("max_size", &self.gate.max_size)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl AdmissionQueue {
    /// Creates a queue admitting at most `max_size` outstanding tasks, of
    /// which `max_size - core_size` may be waiting.
    pub fn new(core_size: usize, max_size: usize) -> crate::core::Result<Self> {
        if max_size == 0 {
            return Err(PoolError::invalid_config(
                "max_size",
                "max_size must be greater than 0",
            ));
        }
        if max_size < core_size {
            return Err(PoolError::invalid_config(
                "max_size",
                format!(
                    "max_size ({}) must be at least core_size ({})",
                    max_size, core_size
                ),
            ));
        }
        // Sized for every permit so the channel itself never rejects.
        let (sender, receiver) = crossbeam_channel::bounded(max_size);
        Ok(Self {
            sender,
            receiver,
            gate: Arc::new(AdmissionGate {
                outstanding: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                waiters: Mutex::new(()),
                freed: Condvar::new(),
                max_size,
            }),
            capacity: max_size - core_size,
        })
    }

    /// Take a permit if one is free, without blocking
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        self.gate.try_acquire()
    }

    /// Wait up to `timeout` for a permit.
    ///
    /// A timeout too large to represent as a deadline waits without limit.
    /// Returns `None` on timeout or once the queue is closed.
    pub fn acquire_timeout(&self, timeout: Duration) -> Option<AdmissionPermit> {
        self.gate.acquire_until(Instant::now().checked_add(timeout))
    }

    /// Put a task holding `permit` at the back of the queue
    pub fn enqueue(&self, task: BoxedTask, permit: AdmissionPermit) -> Result<(), AdmissionError> {
        self.sender
            .try_send(Admitted { task, permit })
            .map_err(|e| match e {
                TrySendError::Full(admitted) | TrySendError::Disconnected(admitted) => {
                    AdmissionError::Full(admitted.task)
                }
            })
    }

    /// Admit the task if a permit is free, without blocking
    pub fn try_push(&self, task: BoxedTask) -> Result<(), AdmissionError> {
        match self.try_acquire() {
            Some(permit) => self.enqueue(task, permit),
            None => Err(AdmissionError::Full(task)),
        }
    }

    /// Admit the task, waiting up to `timeout` for a permit
    pub fn push_timeout(&self, task: BoxedTask, timeout: Duration) -> Result<(), AdmissionError> {
        match self.acquire_timeout(timeout) {
            Some(permit) => self.enqueue(task, permit),
            None if self.is_closed() => Err(AdmissionError::Closed(task)),
            None => Err(AdmissionError::Timeout(task)),
        }
    }

    /// Wake every waiting submitter and refuse further waits
    pub fn close(&self) {
        self.gate.close();
    }

    /// Check if the queue has been closed
    pub fn is_closed(&self) -> bool {
        self.gate.closed.load(Ordering::Acquire)
    }

    /// Receiving side, consumed only by the dispatcher
    pub fn receiver(&self) -> &Receiver<Admitted> {
        &self.receiver
    }

    /// Number of tasks sitting in the channel
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Check if no task is waiting in the channel
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Tasks holding a permit: waiting, held by the dispatcher, or executing
    pub fn outstanding(&self) -> usize {
        self.gate.outstanding.load(Ordering::Acquire)
    }

    /// Waiting room beyond the core workers (`max_size - core_size`)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total admissible outstanding tasks
    pub fn max_size(&self) -> usize {
        self.gate.max_size
    }

    /// Remove and drop every waiting task, releasing their permits
    pub fn drain(&self) -> usize {
        self.receiver.try_iter().count()
    }
}
