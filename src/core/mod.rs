//! Core types and traits for the worker pool

pub mod error;
pub mod handle;
pub mod signal;
pub mod task;
pub mod wait_group;

pub use error::{PoolError, Result};
pub use handle::{ResultTask, TaskHandle};
pub use signal::StopSignal;
pub use task::{BoxedTask, ClosureTask, Task};
pub use wait_group::{WaitGroup, WaitGuard};
