//! Tracing integration for observability.
//!
//! Worker loops and task executions are wrapped in spans, and the helpers in
//! [`metrics`] emit counter/gauge events, when the `tracing` feature is
//! enabled. Without the feature, [`TracedTask`] is a transparent wrapper.
//!
//! # Example
//!
//! ```rust,ignore
//! use elastic_pool::prelude::*;
//! use elastic_pool::tracing::TracedTask;
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env()
//!         .add_directive("elastic_pool=debug".parse().unwrap()))
//!     .init();
//!
//! let pool = ElasticPool::with_sizes(4, 16, Duration::from_secs(30))?;
//! pool.start()?;
//!
//! let span = tracing::info_span!("ingest", batch = 7);
//! let _entered = span.enter();
//! pool.submit(TracedTask::new(ClosureTask::new(|| tracing::info!("inside ingest"))))?;
//! ```

use crate::core::Task;

/// A task wrapper that carries the submitting thread's span into the worker.
///
/// The current span is captured when the wrapper is created and entered
/// around the inner task's `run`.
pub struct TracedTask<T: Task> {
    inner: T,
    #[cfg(feature = "tracing")]
    span: tracing::Span,
}

impl<T: Task> TracedTask<T> {
    /// Wrap `task`, capturing the current span
    pub fn new(task: T) -> Self {
        Self {
            inner: task,
            #[cfg(feature = "tracing")]
            span: tracing::Span::current(),
        }
    }

    /// Wrap `task` with an explicit span
    #[cfg(feature = "tracing")]
    pub fn with_span(task: T, span: tracing::Span) -> Self {
        Self { inner: task, span }
    }
}

impl<T: Task> Task for TracedTask<T> {
    fn run(self: Box<Self>) {
        let this = *self;
        #[cfg(feature = "tracing")]
        let _guard = this.span.enter();
        Box::new(this.inner).run()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Metrics recording functions for observability.
///
/// These emit tracing events that a subscriber (for example one bridging to
/// Prometheus through tracing-opentelemetry) can turn into metrics.
#[cfg(feature = "tracing")]
pub mod metrics {
    use std::time::Duration;

    /// Records an admitted task
    #[inline]
    pub fn record_submission(queue_depth: usize) {
        tracing::trace!(
            counter.tasks_submitted = 1,
            gauge.queue_depth = queue_depth as i64,
            "task submitted"
        );
    }

    /// Records a rejected submission
    #[inline]
    pub fn record_rejection(max_size: usize) {
        tracing::debug!(
            counter.tasks_rejected = 1,
            max_size = max_size,
            "task rejected"
        );
    }

    /// Records a worker spawn
    #[inline]
    pub fn record_worker_spawned(worker_id: usize, live_workers: usize) {
        tracing::trace!(
            counter.workers_spawned = 1,
            gauge.live_workers = live_workers as i64,
            worker_id = worker_id,
            "worker spawned"
        );
    }

    /// Records a worker leaving its loop
    #[inline]
    pub fn record_worker_exit(worker_id: usize, idle: bool) {
        tracing::trace!(
            worker_id = worker_id,
            reclaimed = idle,
            "worker exited"
        );
    }

    /// Records task completion with timing
    #[inline]
    pub fn record_completion(duration: Duration) {
        tracing::trace!(
            counter.tasks_completed = 1,
            histogram.task_duration_ms = crate::core::PoolError::millis(duration),
            "task completed"
        );
    }

    /// Records a contained task panic
    #[inline]
    pub fn record_panic(duration: Duration) {
        tracing::trace!(
            counter.tasks_panicked = 1,
            histogram.task_duration_ms = crate::core::PoolError::millis(duration),
            "task panicked"
        );
    }

    /// Records pool startup
    #[inline]
    pub fn record_pool_start(core_size: usize, max_size: usize) {
        tracing::info!(
            core_size = core_size,
            max_size = max_size,
            "elastic pool started"
        );
    }

    /// Records pool shutdown
    #[inline]
    pub fn record_pool_shutdown(tasks_completed: u64, tasks_discarded: u64, drained: bool) {
        tracing::info!(
            tasks_completed = tasks_completed,
            tasks_discarded = tasks_discarded,
            drained = drained,
            "elastic pool stopped"
        );
    }
}
