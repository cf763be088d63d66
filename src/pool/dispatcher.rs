//! The dispatcher: sole consumer of the admission queue.
//!
//! For every admitted task the dispatcher arms two operations at once, a send
//! on the handoff channel (succeeds only if an idle worker is receiving) and a
//! send on the slot semaphore (succeeds only if fewer than `core_size` workers
//! are alive), and completes whichever becomes ready first. When neither is
//! ready it blocks, which is what caps parallelism at `core_size` while the
//! admission queue absorbs the overflow.

use crate::core::{PoolError, Result};
use crate::pool::config::DispatchPolicy;
use crate::pool::shared::Shared;
use crate::pool::worker::Worker;
use crate::queue::Admitted;
use crossbeam_channel::{Receiver, Select, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Whether the dispatch loop keeps going
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub(crate) struct Dispatcher;

impl Dispatcher {
    /// Launch the dispatcher thread
    pub(crate) fn spawn(shared: &Arc<Shared>) -> Result<JoinHandle<()>> {
        let membership = shared.threads.enter();
        let dispatcher_shared = Arc::clone(shared);

        thread::Builder::new()
            .name(format!("{}-dispatcher", shared.config.thread_name_prefix))
            .spawn(move || {
                let _membership = membership;
                Self::run(&dispatcher_shared);
            })
            .map_err(|e| PoolError::spawn_with_source(0, "failed to spawn dispatcher", e))
    }

    fn run(shared: &Arc<Shared>) {
        log::debug!("[dispatcher]: started");
        let stop = shared.stop.listener();
        let queue = shared.queue.receiver();

        loop {
            let mut sel = Select::new();
            let stop_index = sel.recv(&stop);
            sel.recv(queue);
            let oper = sel.select();

            if oper.index() == stop_index {
                let _ = oper.recv(&stop);
                break;
            }

            let admitted = match oper.recv(queue) {
                Ok(admitted) => admitted,
                Err(_) => break,
            };

            if Self::dispatch(shared, &stop, admitted) == Flow::Stop {
                break;
            }
        }

        let discarded = shared.queue.drain();
        if discarded > 0 {
            log::warn!(
                "[dispatcher]: discarded {} queued task(s) on shutdown",
                discarded
            );
            shared.stats.record_discarded(discarded);
        }
        log::debug!("[dispatcher]: stopped");
    }

    /// Route one task to an idle worker or to a newly spawned one
    fn dispatch(shared: &Arc<Shared>, stop: &Receiver<()>, admitted: Admitted) -> Flow {
        // Observe the stop before handing anything further out.
        if shared.stop.is_triggered() {
            Self::discard(shared, admitted);
            return Flow::Stop;
        }

        let admitted = match shared.config.dispatch_policy {
            DispatchPolicy::Race => admitted,
            DispatchPolicy::PreferReuse => match shared.handoff_tx.try_send(admitted) {
                Ok(()) => return Flow::Continue,
                Err(TrySendError::Full(admitted)) | Err(TrySendError::Disconnected(admitted)) => {
                    admitted
                }
            },
        };

        let claim = shared.slots.claim_sender();
        let mut sel = Select::new();
        let stop_index = sel.recv(stop);
        let reuse_index = sel.send(&shared.handoff_tx);
        sel.send(claim);
        let oper = sel.select();

        match oper.index() {
            i if i == stop_index => {
                let _ = oper.recv(stop);
                Self::discard(shared, admitted);
                Flow::Stop
            }
            i if i == reuse_index => {
                if let Err(e) = oper.send(&shared.handoff_tx, admitted) {
                    Self::discard(shared, e.into_inner());
                }
                Flow::Continue
            }
            _ => {
                if oper.send(claim, ()).is_err() {
                    Self::discard(shared, admitted);
                    return Flow::Continue;
                }
                let slot = shared.slots.claimed();
                if let Err(e) = Worker::spawn(shared, admitted, slot) {
                    // The task went down with the failed spawn closure.
                    log::error!("[dispatcher]: {}", e);
                    shared.stats.record_discarded(1);
                }
                Flow::Continue
            }
        }
    }

    fn discard(shared: &Shared, admitted: Admitted) {
        log::debug!("[dispatcher]: discard task {}", admitted.task.name());
        shared.stats.record_discarded(1);
    }
}
