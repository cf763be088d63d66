//! Worker thread implementation

use crate::core::{PoolError, Result};
use crate::pool::shared::Shared;
use crate::pool::slots::SlotToken;
use crate::pool::stats::PoolStats;
use crate::queue::Admitted;
use crossbeam_channel::Select;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[cfg(feature = "tracing")]
use tracing::{span, Level};

/// Why a worker left its loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WorkerExit {
    /// No task arrived within the idle timeout
    Idle,
    /// The pool-wide stop signal fired
    Stopped,
}

/// A worker thread: runs its seed task, then serves the handoff channel
/// until it idles out or the pool stops.
pub(crate) struct Worker;

impl Worker {
    /// Spawn a worker seeded with `first`.
    ///
    /// The slot token and the wait-group membership move into the thread, so
    /// both are released when it exits. If the spawn fails they are dropped
    /// right here together with the task, whose permit is released in turn.
    pub(crate) fn spawn(shared: &Arc<Shared>, first: Admitted, slot: SlotToken) -> Result<usize> {
        let id = shared.next_worker_id();
        let membership = shared.threads.enter();
        let worker_shared = Arc::clone(shared);

        thread::Builder::new()
            .name(format!("{}-worker-{}", shared.config.thread_name_prefix, id))
            .spawn(move || {
                let _membership = membership;
                let _slot = slot;
                Self::run(id, &worker_shared, first);
            })
            .map_err(|e| PoolError::spawn_with_source(id, "failed to spawn worker", e))?;

        shared.stats.record_worker_spawned();
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_worker_spawned(id, shared.slots.occupied());
        Ok(id)
    }

    /// Main worker loop: executing -> idle-waiting -> executing | terminated
    fn run(id: usize, shared: &Shared, first: Admitted) -> WorkerExit {
        #[cfg(feature = "tracing")]
        let worker_span = span!(Level::DEBUG, "worker", id = id);
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        log::debug!("[worker {}]: init", id);

        let stop = shared.stop.listener();
        let idle_timeout = shared.config.idle_timeout;
        let mut current = first;

        let exit = loop {
            Self::execute(id, current, &shared.stats);

            let mut sel = Select::new();
            let stop_index = sel.recv(&stop);
            sel.recv(&shared.handoff_rx);

            // A fresh select per iteration restarts the idle timer.
            let oper = match sel.select_timeout(idle_timeout) {
                Ok(oper) => oper,
                Err(_) => {
                    log::debug!("[worker {}]: idle and exit", id);
                    shared.stats.record_worker_reclaimed();
                    break WorkerExit::Idle;
                }
            };

            if oper.index() == stop_index {
                let _ = oper.recv(&stop);
                log::debug!("[worker {}]: stop", id);
                break WorkerExit::Stopped;
            }

            match oper.recv(&shared.handoff_rx) {
                Ok(next) => {
                    log::trace!("[worker {}]: fetch task {}", id, next.task.name());
                    current = next;
                }
                // Shared keeps the sender alive, so this only happens if the
                // pool state is being torn down around us.
                Err(_) => break WorkerExit::Stopped,
            }
        };

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_worker_exit(id, exit == WorkerExit::Idle);
        exit
    }

    /// Execute a single task with panic containment, then release its permit
    fn execute(id: usize, admitted: Admitted, stats: &PoolStats) {
        let Admitted { task, permit } = admitted;

        #[cfg(feature = "tracing")]
        let task_span = span!(Level::DEBUG, "task_execution", task = task.name());
        #[cfg(feature = "tracing")]
        let _task_guard = task_span.enter();

        let name = task.name().to_owned();
        let start = Instant::now();
        stats.task_started();

        let outcome = catch_unwind(AssertUnwindSafe(move || task.run()));

        stats.task_finished();
        let elapsed = start.elapsed();

        match outcome {
            Ok(()) => {
                stats.record_completed();
                #[cfg(feature = "tracing")]
                crate::tracing::metrics::record_completion(elapsed);
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                log::error!(
                    "[worker {}]: task '{}' panicked after {}ms: {}",
                    id,
                    name,
                    elapsed.as_millis(),
                    panic_msg
                );
                #[cfg(feature = "tracing")]
                crate::tracing::metrics::record_panic(elapsed);
                stats.record_panicked();
            }
        }

        drop(permit);
    }
}
