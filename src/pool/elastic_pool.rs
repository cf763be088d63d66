//! Elastic pool façade

use crate::core::{BoxedTask, ClosureTask, PoolError, Result, ResultTask, Task, TaskHandle};
use crate::pool::config::PoolConfig;
use crate::pool::dispatcher::Dispatcher;
use crate::pool::shared::Shared;
use crate::pool::stats::PoolStatsSnapshot;
use crate::pool::usage::PoolUsage;
use crate::pool::WorkerPool;
use crate::queue::{AdmissionPermit, BackpressureStrategy};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const CREATED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Outcome of [`ElasticPool::stop`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Every pool thread exited within the wait bound
    pub drained: bool,
    /// Threads (dispatcher included) still alive when `stop` returned
    pub live_threads: usize,
    /// Admitted tasks dropped unexecuted over the pool's lifetime
    pub discarded: u64,
}

/// A bounded pool whose workers are spawned on demand and reclaimed when idle.
///
/// At most `core_size` workers are alive at once, and at most `max_size`
/// submitted tasks are outstanding (executing or waiting). Submissions beyond
/// that are rejected or wait for a bounded time.
///
/// # Example
///
/// ```rust
/// use elastic_pool::prelude::*;
/// use std::time::Duration;
///
/// # fn main() -> Result<()> {
/// let pool = ElasticPool::with_sizes(2, 5, Duration::from_secs(1))?;
/// pool.start()?;
///
/// let handle = pool.execute_with_result(|| 21 * 2)?;
/// assert_eq!(handle.wait()?, 42);
///
/// let report = pool.stop(Duration::from_secs(5));
/// assert!(report.drained);
/// # Ok(())
/// # }
/// ```
pub struct ElasticPool {
    shared: Arc<Shared>,
    state: AtomicU8,
    /// Held shared while a task is enqueued, exclusively while the state
    /// changes, so no task lands in the queue after the dispatcher stopped.
    transition: RwLock<()>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for ElasticPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElasticPool")
            .field("config", &self.shared.config)
            .field("running", &self.is_running())
            .field("usage", &self.usage())
            .finish()
    }
}

impl ElasticPool {
    /// Create a pool from a validated configuration. No thread is started.
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            shared: Arc::new(Shared::new(config)?),
            state: AtomicU8::new(CREATED),
            transition: RwLock::new(()),
            dispatcher: Mutex::new(None),
        })
    }

    /// Create a pool from the three sizing parameters
    pub fn with_sizes(core_size: usize, max_size: usize, idle_timeout: Duration) -> Result<Self> {
        Self::new(PoolConfig::new(core_size, max_size, idle_timeout))
    }

    /// Start the pool.
    ///
    /// A pool starts exactly once: a second call fails with
    /// [`PoolError::AlreadyStarted`], a call after `stop` with
    /// [`PoolError::AlreadyStopped`].
    pub fn start(&self) -> Result<()> {
        let prefix = &self.shared.config.thread_name_prefix;
        let _transition = self.transition.write();
        match self
            .state
            .compare_exchange(CREATED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {}
            Err(RUNNING) => return Err(PoolError::already_started(prefix)),
            Err(_) => return Err(PoolError::already_stopped(prefix)),
        }

        let handle = match Dispatcher::spawn(&self.shared) {
            Ok(handle) => handle,
            Err(e) => {
                self.state.store(STOPPED, Ordering::Release);
                self.shared.queue.close();
                return Err(e);
            }
        };
        *self.dispatcher.lock() = Some(handle);

        let config = &self.shared.config;
        log::info!(
            "[pool {}]: started (core {}, max {}, idle {:?})",
            prefix,
            config.core_size,
            config.max_size,
            config.idle_timeout
        );
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_pool_start(config.core_size, config.max_size);
        Ok(())
    }

    /// Submit a task without blocking.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotRunning`] if the pool is not running
    /// - [`PoolError::Saturated`] if `max_size` tasks are already outstanding
    pub fn submit<T: Task + 'static>(&self, task: T) -> Result<()> {
        self.submit_with(task, BackpressureStrategy::RejectImmediately)
    }

    /// Submit a task, waiting up to `timeout` for the pool to have room.
    ///
    /// The timeout bounds admission only, not execution.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotRunning`] if the pool is not running
    /// - [`PoolError::SubmissionTimeout`] if no room freed up in time
    pub fn submit_timeout<T: Task + 'static>(&self, task: T, timeout: Duration) -> Result<()> {
        self.submit_with(task, BackpressureStrategy::BlockWithTimeout(timeout))
    }

    /// Submit a task with an explicit backpressure strategy
    pub fn submit_with<T: Task + 'static>(
        &self,
        task: T,
        strategy: BackpressureStrategy,
    ) -> Result<()> {
        self.admit(Box::new(task), strategy)
    }

    fn admit(&self, task: BoxedTask, strategy: BackpressureStrategy) -> Result<()> {
        if !self.is_running() {
            return Err(self.reject_not_running(task));
        }

        let queue = &self.shared.queue;
        let permit = match strategy {
            BackpressureStrategy::RejectImmediately => queue.try_acquire(),
            BackpressureStrategy::BlockWithTimeout(timeout) => queue.acquire_timeout(timeout),
        };
        let Some(permit) = permit else {
            if queue.is_closed() {
                return Err(self.reject_not_running(task));
            }
            let max_size = queue.max_size();
            let err = match strategy {
                BackpressureStrategy::RejectImmediately => {
                    log::debug!("[pool]: discard task {}: saturated", task.name());
                    PoolError::saturated(max_size)
                }
                BackpressureStrategy::BlockWithTimeout(timeout) => {
                    log::debug!("[pool]: discard task {}: admission timed out", task.name());
                    PoolError::submission_timeout(max_size, PoolError::millis(timeout))
                }
            };
            self.shared.stats.record_rejected();
            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_rejection(max_size);
            return Err(err);
        };

        self.enqueue(task, permit)
    }

    /// Hand an admitted task to the dispatcher unless the pool stopped
    /// while the permit was being acquired.
    fn enqueue(&self, task: BoxedTask, permit: AdmissionPermit) -> Result<()> {
        let _transition = self.transition.read();
        if !self.is_running() {
            drop(permit);
            return Err(self.reject_not_running(task));
        }

        let shared = &self.shared;
        if let Err(e) = shared.queue.enqueue(task, permit) {
            // One channel slot exists per permit.
            log::error!("[pool]: admission channel refused a permitted task: {}", e);
            shared.stats.record_rejected();
            return Err(PoolError::saturated(shared.queue.max_size()));
        }
        shared.stats.record_submitted();
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_submission(shared.queue.len());
        Ok(())
    }

    fn reject_not_running(&self, task: BoxedTask) -> PoolError {
        log::debug!("[pool]: reject task {}: not running", task.name());
        self.shared.stats.record_rejected();
        PoolError::NotRunning
    }

    /// Submit a closure without blocking
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(ClosureTask::new(f))
    }

    /// Submit a closure, waiting up to `timeout` for room
    pub fn execute_timeout<F>(&self, f: F, timeout: Duration) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_timeout(ClosureTask::new(f), timeout)
    }

    /// Submit a value-producing closure and get a handle to its result.
    ///
    /// If the task is discarded at shutdown or panics, the handle reports
    /// [`PoolError::TaskAbandoned`].
    pub fn execute_with_result<F, R>(&self, f: F) -> Result<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (task, handle) = ResultTask::new(f);
        self.submit(task)?;
        Ok(handle)
    }

    /// Stop the pool, waiting up to `wait` for every pool thread to exit.
    ///
    /// New submissions are refused from the moment this is called. Tasks
    /// already executing run to completion; tasks still waiting in the
    /// admission queue are discarded. Calling `stop` again only reports the
    /// current state.
    pub fn stop(&self, wait: Duration) -> ShutdownReport {
        let shared = &self.shared;
        let previous = {
            let _transition = self.transition.write();
            let previous = self.state.swap(STOPPED, Ordering::AcqRel);
            if previous == RUNNING {
                log::info!(
                    "[pool {}]: stopping, waiting up to {:?}",
                    shared.config.thread_name_prefix,
                    wait
                );
                shared.queue.close();
                shared.stop.trigger();
            }
            previous
        };

        let drained = shared.threads.wait_timeout(wait);
        if drained {
            if let Some(handle) = self.dispatcher.lock().take() {
                if handle.join().is_err() {
                    log::error!("[pool]: dispatcher thread panicked");
                }
            }
        }

        let report = ShutdownReport {
            drained,
            live_threads: shared.threads.count(),
            discarded: shared.stats.snapshot().discarded,
        };

        if previous == RUNNING {
            if drained {
                log::info!("[pool {}]: stopped", shared.config.thread_name_prefix);
            } else {
                log::warn!(
                    "[pool {}]: stop timed out with {} thread(s) still running",
                    shared.config.thread_name_prefix,
                    report.live_threads
                );
            }
            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_pool_shutdown(
                shared.stats.snapshot().completed,
                report.discarded,
                drained,
            );
        }
        report
    }

    /// Stop with the configured short bound (`cancel_wait`, 3s by default)
    pub fn cancel(&self) -> ShutdownReport {
        self.stop(self.shared.config.cancel_wait)
    }

    /// Best-effort snapshot of queued tasks, live workers and free slots
    pub fn usage(&self) -> PoolUsage {
        let shared = &self.shared;
        PoolUsage {
            queued: shared
                .queue
                .outstanding()
                .saturating_sub(shared.stats.busy()),
            running: shared.slots.occupied(),
            idle_capacity: shared.slots.available(),
        }
    }

    /// Copy of the pool-wide counters
    pub fn stats(&self) -> PoolStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Check if the pool accepts submissions
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }
}

impl WorkerPool for ElasticPool {
    fn start(&self) -> Result<()> {
        ElasticPool::start(self)
    }

    fn submit_task(&self, task: BoxedTask) -> Result<()> {
        self.admit(task, BackpressureStrategy::RejectImmediately)
    }

    fn submit_task_timeout(&self, task: BoxedTask, timeout: Duration) -> Result<()> {
        self.admit(task, BackpressureStrategy::BlockWithTimeout(timeout))
    }

    fn stop(&self, wait: Duration) -> ShutdownReport {
        ElasticPool::stop(self, wait)
    }

    fn cancel(&self) -> ShutdownReport {
        ElasticPool::cancel(self)
    }

    fn usage(&self) -> PoolUsage {
        ElasticPool::usage(self)
    }

    fn is_running(&self) -> bool {
        ElasticPool::is_running(self)
    }
}

impl Drop for ElasticPool {
    fn drop(&mut self) {
        if self.is_running() {
            let report = self.cancel();
            if !report.drained {
                log::error!(
                    "[pool {}]: dropped with {} thread(s) still running",
                    self.shared.config.thread_name_prefix,
                    report.live_threads
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::config::DispatchPolicy;
    use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    /// Task body that reports start and then blocks until released
    fn gated(started: &Sender<()>, release: &Receiver<()>) -> impl FnOnce() + Send + 'static {
        let started = started.clone();
        let release = release.clone();
        move || {
            let _ = started.send(());
            let _ = release.recv();
        }
    }

    fn wait_for(rx: &Receiver<()>, n: usize) {
        for _ in 0..n {
            rx.recv_timeout(Duration::from_secs(5))
                .expect("task should have started");
        }
    }

    #[test]
    fn test_pool_creation() {
        let pool = ElasticPool::with_sizes(2, 5, Duration::from_secs(1)).expect("valid config");
        assert!(!pool.is_running());
        assert_eq!(pool.config().queue_capacity(), 3);
        assert_eq!(pool.usage(), PoolUsage {
            queued: 0,
            running: 0,
            idle_capacity: 2,
        });
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(ElasticPool::with_sizes(0, 1, Duration::from_secs(1)).is_err());
        assert!(ElasticPool::with_sizes(3, 2, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_submit_before_start() {
        let pool = ElasticPool::with_sizes(1, 1, Duration::from_secs(1)).expect("valid config");
        let err = pool.execute(|| {}).unwrap_err();
        assert!(matches!(err, PoolError::NotRunning));
        assert_eq!(err.to_string(), "pool is not running");
        assert_eq!(pool.stats().rejected, 1);
    }

    #[test]
    fn test_start_is_one_shot() {
        let pool = ElasticPool::with_sizes(1, 2, Duration::from_secs(1)).expect("valid config");
        pool.start().expect("first start");
        assert!(matches!(
            pool.start(),
            Err(PoolError::AlreadyStarted { .. })
        ));

        assert!(pool.stop(Duration::from_secs(5)).drained);
        assert!(matches!(
            pool.start(),
            Err(PoolError::AlreadyStopped { .. })
        ));
    }

    #[test]
    fn test_core_bound_and_waiting_room() {
        let pool = ElasticPool::with_sizes(2, 5, Duration::from_secs(5)).expect("valid config");
        pool.start().expect("start");

        let (started_tx, started_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();
        let concurrent = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let body = gated(&started_tx, &release_rx);
            let concurrent = Arc::clone(&concurrent);
            let peak = Arc::clone(&peak);
            pool.execute(move || {
                let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                body();
                concurrent.fetch_sub(1, Ordering::SeqCst);
            })
            .expect("within max_size");
        }

        wait_for(&started_rx, 2);
        thread::sleep(Duration::from_millis(50));
        assert!(started_rx.try_recv().is_err(), "third task must wait");

        let usage = pool.usage();
        assert_eq!(usage.running, 2);
        assert_eq!(usage.queued, 3);
        assert_eq!(usage.to_string(), "wait/run/idle:3/2/0");

        let err = pool.execute(|| {}).unwrap_err();
        assert_eq!(err.to_string(), "exceed max size 5, and discard");

        for _ in 0..5 {
            release_tx.send(()).expect("release");
        }
        wait_for(&started_rx, 3);

        assert!(pool.stop(Duration::from_secs(5)).drained);
        assert_eq!(peak.load(Ordering::SeqCst), 2);
        let stats = pool.stats();
        assert_eq!(stats.completed, 5);
        assert_eq!(stats.submitted, 5);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_saturated_pool_rejects() {
        let pool = ElasticPool::with_sizes(1, 1, Duration::from_secs(5)).expect("valid config");
        pool.start().expect("start");

        let (started_tx, started_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();
        pool.execute(gated(&started_tx, &release_rx))
            .expect("first accepted");
        wait_for(&started_rx, 1);

        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let ran = Arc::clone(&ran);
            let err = pool
                .execute(move || {
                    ran.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap_err();
            assert!(matches!(err, PoolError::Saturated { max_size: 1 }));
        }

        release_tx.send(()).expect("release");
        assert!(pool.stop(Duration::from_secs(5)).drained);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_submit_timeout() {
        let pool = ElasticPool::with_sizes(1, 1, Duration::from_secs(5)).expect("valid config");
        pool.start().expect("start");

        let (started_tx, started_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();
        pool.execute(gated(&started_tx, &release_rx))
            .expect("first accepted");
        wait_for(&started_rx, 1);

        let err = pool
            .execute_timeout(|| {}, Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(
            err,
            PoolError::SubmissionTimeout {
                max_size: 1,
                timeout_ms: 50
            }
        ));
        assert_eq!(err.to_string(), "timeout: exceed max size 1, and discard");

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).expect("release");
        });
        let (done_tx, done_rx) = bounded(1);
        pool.execute_timeout(
            move || {
                let _ = done_tx.send(());
            },
            Duration::from_secs(5),
        )
        .expect("room freed within timeout");
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("second task ran");

        releaser.join().expect("releaser panicked");
        assert!(pool.stop(Duration::from_secs(5)).drained);
    }

    #[test]
    fn test_unbounded_submit_timeout() {
        let pool = ElasticPool::with_sizes(1, 1, Duration::from_secs(5)).expect("valid config");
        pool.start().expect("start");

        let (done_tx, done_rx) = unbounded();
        let first = done_tx.clone();
        pool.execute_timeout(
            move || {
                thread::sleep(Duration::from_millis(50));
                let _ = first.send(());
            },
            Duration::MAX,
        )
        .expect("idle pool admits at once");

        // Waits for the first task to finish instead of overflowing the deadline.
        pool.execute_timeout(
            move || {
                let _ = done_tx.send(());
            },
            Duration::MAX,
        )
        .expect("admitted once room frees up");
        wait_for(&done_rx, 2);

        let report = pool.stop(Duration::MAX);
        assert!(report.drained);
        assert_eq!(report.live_threads, 0);
    }

    #[test]
    fn test_stop_wakes_blocked_submitter() {
        let pool = Arc::new(
            ElasticPool::with_sizes(1, 1, Duration::from_secs(5)).expect("valid config"),
        );
        pool.start().expect("start");

        let (started_tx, started_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();
        pool.execute(gated(&started_tx, &release_rx))
            .expect("first accepted");
        wait_for(&started_rx, 1);

        let submitter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.execute_timeout(|| {}, Duration::MAX))
        };
        thread::sleep(Duration::from_millis(50));

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).expect("release");
        });
        assert!(pool.stop(Duration::from_secs(5)).drained);
        releaser.join().expect("releaser panicked");

        let result = submitter.join().expect("submitter panicked");
        assert!(matches!(result, Err(PoolError::NotRunning)));
        assert_eq!(pool.usage().queued, 0);
    }

    #[test]
    fn test_submissions_racing_stop_never_strand() {
        for _ in 0..20 {
            let pool = Arc::new(
                ElasticPool::with_sizes(2, 8, Duration::from_secs(5)).expect("valid config"),
            );
            pool.start().expect("start");

            let submitters: Vec<_> = (0..4)
                .map(|_| {
                    let pool = Arc::clone(&pool);
                    thread::spawn(move || {
                        let mut handles = Vec::new();
                        loop {
                            match pool.execute_with_result(|| 1u8) {
                                Ok(handle) => handles.push(handle),
                                Err(PoolError::NotRunning) => return handles,
                                Err(_) => thread::yield_now(),
                            }
                        }
                    })
                })
                .collect();

            thread::sleep(Duration::from_millis(2));
            assert!(pool.stop(Duration::from_secs(5)).drained);

            for submitter in submitters {
                for handle in submitter.join().expect("submitter panicked") {
                    match handle.wait_timeout(Duration::from_secs(5)) {
                        Ok(1) | Err(PoolError::TaskAbandoned { .. }) => {}
                        other => panic!("task left unresolved: {:?}", other.map(|_| ())),
                    }
                }
            }
            assert_eq!(pool.usage().queued, 0);
            assert_eq!(pool.shared.queue.outstanding(), 0);
        }
    }

    #[test]
    fn test_idle_workers_reclaimed() {
        let pool = ElasticPool::new(
            PoolConfig::new(3, 3, Duration::from_millis(100)).with_thread_name_prefix("reclaim"),
        )
        .expect("valid config");
        pool.start().expect("start");

        let handle = pool.execute_with_result(|| "done").expect("accepted");
        assert_eq!(handle.wait().expect("ran"), "done");
        assert_eq!(pool.usage().running, 1);

        thread::sleep(Duration::from_millis(400));
        assert_eq!(pool.usage().running, 0);
        assert_eq!(pool.stats().workers_reclaimed, 1);

        assert!(pool.stop(Duration::from_secs(5)).drained);
    }

    #[test]
    fn test_stop_refuses_new_work_and_discards_queue() {
        let pool = ElasticPool::with_sizes(1, 3, Duration::from_secs(5)).expect("valid config");
        pool.start().expect("start");

        let (started_tx, started_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();
        pool.execute(gated(&started_tx, &release_rx))
            .expect("first accepted");
        wait_for(&started_rx, 1);

        let queued = pool.execute_with_result(|| 1).expect("queued");

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            release_tx.send(()).expect("release");
        });
        let report = pool.stop(Duration::from_secs(5));
        releaser.join().expect("releaser panicked");

        assert!(report.drained);
        assert_eq!(report.live_threads, 0);
        assert_eq!(report.discarded, 1);
        assert!(matches!(
            queued.wait(),
            Err(PoolError::TaskAbandoned { .. })
        ));
        assert!(matches!(pool.execute(|| {}), Err(PoolError::NotRunning)));
        assert_eq!(pool.usage().running, 0);
    }

    #[test]
    fn test_stop_times_out_on_stuck_task() {
        let pool = ElasticPool::with_sizes(1, 1, Duration::from_secs(5)).expect("valid config");
        pool.start().expect("start");

        let (started_tx, started_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();
        pool.execute(gated(&started_tx, &release_rx))
            .expect("accepted");
        wait_for(&started_rx, 1);

        let report = pool.stop(Duration::from_millis(50));
        assert!(!report.drained);
        assert_eq!(report.live_threads, 1);

        release_tx.send(()).expect("release");
        assert!(pool.stop(Duration::from_secs(5)).drained);
    }

    #[test]
    fn test_stop_without_start() {
        let pool = ElasticPool::with_sizes(1, 1, Duration::from_secs(1)).expect("valid config");
        let report = pool.cancel();
        assert!(report.drained);
        assert!(matches!(pool.start(), Err(PoolError::AlreadyStopped { .. })));
    }

    #[test]
    fn test_panicking_task_is_contained() {
        let pool = ElasticPool::with_sizes(1, 2, Duration::from_secs(5)).expect("valid config");
        pool.start().expect("start");

        let exploding = pool
            .execute_with_result(|| -> u32 { panic!("Intentional panic for testing") })
            .expect("accepted");
        assert!(matches!(
            exploding.wait(),
            Err(PoolError::TaskAbandoned { .. })
        ));

        let after = pool.execute_with_result(|| 7).expect("accepted");
        assert_eq!(after.wait().expect("worker survived"), 7);

        assert!(pool.stop(Duration::from_secs(5)).drained);
        let stats = pool.stats();
        assert_eq!(stats.panicked, 1);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn test_prefer_reuse_policy() {
        let config = PoolConfig::new(4, 4, Duration::from_secs(5))
            .with_dispatch_policy(DispatchPolicy::PreferReuse);
        let pool = ElasticPool::new(config).expect("valid config");
        pool.start().expect("start");

        for i in 0..5 {
            let handle = pool.execute_with_result(move || i).expect("accepted");
            assert_eq!(handle.wait().expect("ran"), i);
            thread::sleep(Duration::from_millis(30));
        }

        assert_eq!(pool.stats().workers_spawned, 1);
        assert!(pool.stop(Duration::from_secs(5)).drained);
    }

    #[test]
    fn test_drop_cancels_running_pool() {
        let pool = ElasticPool::with_sizes(1, 1, Duration::from_secs(30)).expect("valid config");
        pool.start().expect("start");

        let (done_tx, done_rx) = bounded(1);
        pool.execute(move || {
            let _ = done_tx.send(());
        })
        .expect("accepted");
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("task ran");

        // The idle worker is told to stop instead of waiting out its 30s.
        let start = std::time::Instant::now();
        drop(pool);
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_trait_object_surface() {
        let pool = ElasticPool::with_sizes(1, 2, Duration::from_secs(5)).expect("valid config");
        let pool: &dyn WorkerPool = &pool;
        pool.start().expect("start");

        let (done_tx, done_rx) = bounded(1);
        pool.submit_task(Box::new(ClosureTask::new(move || {
            let _ = done_tx.send(());
        })))
        .expect("accepted");
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("task ran");

        crate::pool::log_pool_usage(pool);
        assert!(pool.cancel().drained);
        assert!(!pool.is_running());
    }
}
