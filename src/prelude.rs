//! Convenient re-exports for common types and traits

pub use crate::core::{BoxedTask, ClosureTask, PoolError, Result, Task, TaskHandle};
pub use crate::pool::{
    log_pool_usage, DispatchPolicy, ElasticPool, PoolConfig, PoolUsage, ShutdownReport,
    WorkerPool,
};
pub use crate::queue::BackpressureStrategy;
