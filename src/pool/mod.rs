//! Elastic pool and its moving parts

pub mod config;
mod dispatcher;
pub mod elastic_pool;
mod shared;
pub mod slots;
pub mod stats;
pub mod usage;
mod worker;

pub use config::{DispatchPolicy, PoolConfig};
pub use elastic_pool::{ElasticPool, ShutdownReport};
pub use slots::{SlotToken, WorkerSlots};
pub use stats::{PoolStats, PoolStatsSnapshot};
pub use usage::PoolUsage;

use crate::core::{BoxedTask, Result};
use std::time::Duration;

/// Object-safe lifecycle and submission surface shared by pool implementations
pub trait WorkerPool: Send + Sync {
    /// Start the pool
    fn start(&self) -> Result<()>;

    /// Submit a boxed task without blocking
    fn submit_task(&self, task: BoxedTask) -> Result<()>;

    /// Submit a boxed task, waiting up to `timeout` for room
    fn submit_task_timeout(&self, task: BoxedTask, timeout: Duration) -> Result<()>;

    /// Stop the pool, waiting up to `wait` for its threads
    fn stop(&self, wait: Duration) -> ShutdownReport;

    /// Stop with the pool's short default bound
    fn cancel(&self) -> ShutdownReport;

    /// Snapshot of the pool's load
    fn usage(&self) -> PoolUsage;

    /// Check if the pool accepts submissions
    fn is_running(&self) -> bool;
}

/// Log a pool's usage line at info level
pub fn log_pool_usage(pool: &dyn WorkerPool) {
    log::info!("usage: {}", pool.usage());
}
