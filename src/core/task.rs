//! Task trait and related types

use std::fmt;

/// A unit of work executed by exactly one worker of the pool.
///
/// The pool treats a task as a black box: it is run once, to completion, on a
/// worker thread. A task that never returns occupies its worker slot forever,
/// so long-running tasks should observe whatever cancellation contract the
/// caller needs on their own.
pub trait Task: Send {
    /// Run the task, consuming it
    fn run(self: Box<Self>);

    /// Get the task's name for logging and statistics
    fn name(&self) -> &str {
        "Task"
    }
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.name())
    }
}

/// A boxed task that can be sent across threads
pub type BoxedTask = Box<dyn Task>;

/// Helper to create a task from a closure
pub struct ClosureTask<F>
where
    F: FnOnce() + Send,
{
    closure: F,
    name: String,
}

impl<F> ClosureTask<F>
where
    F: FnOnce() + Send,
{
    /// Create a new closure task
    pub fn new(closure: F) -> Self {
        Self {
            closure,
            name: "ClosureTask".to_string(),
        }
    }

    /// Create a new closure task with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure,
            name: name.into(),
        }
    }
}

impl<F> Task for ClosureTask<F>
where
    F: FnOnce() + Send,
{
    fn run(self: Box<Self>) {
        (self.closure)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
