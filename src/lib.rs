//! # Elastic Pool
//!
//! A bounded, elastic worker pool: workers are spawned on demand up to a
//! fixed ceiling, reclaimed after sitting idle, and fed through a bounded
//! admission queue that rejects or briefly blocks submitters when the pool is
//! saturated.
//!
//! ## Features
//!
//! - **Bounded parallelism**: at most `core_size` tasks execute at once
//! - **Overflow queueing**: up to `max_size - core_size` further tasks wait
//! - **Backpressure**: `submit` rejects at once, `submit_timeout` waits a bounded time
//! - **Idle reclamation**: workers exit after `idle_timeout` without work
//! - **Bounded shutdown**: `stop(wait)` never blocks longer than `wait`
//! - **Panic containment**: a panicking task never takes its worker down
//!
//! ## Quick Start
//!
//! ```rust
//! use elastic_pool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let pool = ElasticPool::with_sizes(2, 5, Duration::from_secs(2))?;
//! pool.start()?;
//!
//! for i in 0..5 {
//!     pool.execute(move || {
//!         println!("task {} executing", i);
//!     })?;
//! }
//!
//! println!("{}", pool.usage());
//! pool.stop(Duration::from_secs(5));
//! # Ok(())
//! # }
//! ```
//!
//! ## Saturation
//!
//! ```rust
//! use elastic_pool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let pool = ElasticPool::with_sizes(1, 1, Duration::from_secs(2))?;
//! pool.start()?;
//!
//! let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(1);
//! pool.execute(move || {
//!     let _ = release_rx.recv();
//! })?;
//!
//! match pool.execute(|| {}) {
//!     Err(PoolError::Saturated { max_size }) => assert_eq!(max_size, 1),
//!     other => panic!("expected saturation, got {:?}", other),
//! }
//!
//! release_tx.send(()).unwrap();
//! pool.cancel();
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Tasks
//!
//! ```rust
//! use elastic_pool::prelude::*;
//! use std::time::Duration;
//!
//! struct Reindex {
//!     shard: u32,
//! }
//!
//! impl Task for Reindex {
//!     fn run(self: Box<Self>) {
//!         println!("reindexing shard {}", self.shard);
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Reindex"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let config = PoolConfig::new(4, 16, Duration::from_secs(30))
//!     .with_thread_name_prefix("reindex")
//!     .prefer_reuse();
//! let pool = ElasticPool::new(config)?;
//! pool.start()?;
//!
//! pool.submit_timeout(Reindex { shard: 3 }, Duration::from_millis(100))?;
//! pool.stop(Duration::from_secs(5));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod tracing;

pub use crate::core::{
    BoxedTask, ClosureTask, PoolError, Result, ResultTask, StopSignal, Task, TaskHandle,
    WaitGroup,
};
pub use crate::pool::{
    log_pool_usage, DispatchPolicy, ElasticPool, PoolConfig, PoolStatsSnapshot, PoolUsage,
    ShutdownReport, WorkerPool,
};
pub use crate::queue::BackpressureStrategy;
