//! Counting wait group with a bounded wait
//!
//! Every pool thread holds a [`WaitGuard`] for as long as it is alive. The
//! guard is released on drop, including during unwinding, so the count can
//! never leak past a panicking thread. Shutdown joins on the group with a
//! deadline instead of closing channels under live threads.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct WaitGroupInner {
    count: Mutex<usize>,
    drained: Condvar,
}

/// A wait group whose members are RAII guards
#[derive(Clone, Debug, Default)]
pub struct WaitGroup {
    inner: Arc<WaitGroupInner>,
}

/// Membership in a [`WaitGroup`]; leaving happens on drop
#[derive(Debug)]
pub struct WaitGuard {
    inner: Arc<WaitGroupInner>,
}

impl WaitGroup {
    /// Create an empty wait group
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new member
    pub fn enter(&self) -> WaitGuard {
        *self.inner.count.lock() += 1;
        WaitGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of live members
    pub fn count(&self) -> usize {
        *self.inner.count.lock()
    }

    /// Block until every member has left or `timeout` elapses.
    ///
    /// Returns `true` if the group drained in time.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut count = self.inner.count.lock();
        // A bound too large to represent is no bound at all.
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while *count > 0 {
                self.inner.drained.wait(&mut count);
            }
            return true;
        };
        while *count > 0 {
            if self
                .inner
                .drained
                .wait_until(&mut count, deadline)
                .timed_out()
            {
                return *count == 0;
            }
        }
        true
    }
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        let mut count = self.inner.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.inner.drained.notify_all();
        }
    }
}
