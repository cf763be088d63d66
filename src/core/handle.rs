//! Completion handles for tasks that produce a value

use crate::core::error::{PoolError, Result};
use crate::core::task::Task;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Receiving side of a task's result.
///
/// The handle resolves to the task's return value once the task has run. If
/// the task is discarded (pool teardown) or panics, the sending side is dropped
/// and the handle reports [`PoolError::TaskAbandoned`].
#[derive(Debug)]
pub struct TaskHandle<R> {
    receiver: Receiver<R>,
    name: String,
}

impl<R> TaskHandle<R> {
    /// Name of the task this handle belongs to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block until the task produces its result
    pub fn wait(self) -> Result<R> {
        self.receiver
            .recv()
            .map_err(|_| PoolError::task_abandoned(self.name))
    }

    /// Block up to `timeout` for the task's result
    pub fn wait_timeout(&self, timeout: Duration) -> Result<R> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => {
                PoolError::result_timeout(&self.name, PoolError::millis(timeout))
            }
            RecvTimeoutError::Disconnected => PoolError::task_abandoned(&self.name),
        })
    }

    /// Poll for the result without blocking
    pub fn try_result(&self) -> Result<Option<R>> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PoolError::task_abandoned(&self.name)),
        }
    }
}

/// A task wrapping a value-returning closure and the sender for its handle
pub struct ResultTask<F, R>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    closure: F,
    sender: Sender<R>,
    name: String,
}

impl<F, R> ResultTask<F, R>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    /// Create the task together with the handle that receives its result
    pub fn new(closure: F) -> (Self, TaskHandle<R>) {
        Self::with_name(closure, "ResultTask")
    }

    /// Create a named task together with its handle
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> (Self, TaskHandle<R>) {
        let name = name.into();
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let handle = TaskHandle {
            receiver,
            name: name.clone(),
        };
        (
            Self {
                closure,
                sender,
                name,
            },
            handle,
        )
    }
}

impl<F, R> Task for ResultTask<F, R>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    fn run(self: Box<Self>) {
        let this = *self;
        let value = (this.closure)();
        // The caller may have dropped its handle.
        let _ = this.sender.send(value);
    }

    fn name(&self) -> &str {
        &self.name
    }
}
