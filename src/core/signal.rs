//! One-shot stop broadcast shared by the dispatcher and every worker
//!
//! The signal is a channel that nobody ever sends on. Triggering drops the
//! only sender, after which every `recv` on a listener completes immediately
//! with a disconnection. Listeners can therefore arm the signal inside a
//! `crossbeam_channel::Select` next to their real work channels.
//!
//! # Example
//!
//! ```rust
//! use elastic_pool::StopSignal;
//!
//! let signal = StopSignal::new();
//! let listener = signal.listener();
//!
//! assert!(listener.try_recv().is_err());
//! assert!(!signal.is_triggered());
//!
//! signal.trigger();
//! assert!(signal.is_triggered());
//! assert!(listener.recv().is_err());
//! ```

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct StopSignalInner {
    triggered: AtomicBool,
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
}

/// A clonable, idempotent, one-shot stop broadcast
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<StopSignalInner>,
}

impl std::fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignal")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    /// Create a new, untriggered signal
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(StopSignalInner {
                triggered: AtomicBool::new(false),
                sender: Mutex::new(Some(sender)),
                receiver,
            }),
        }
    }

    /// Broadcast the stop to every listener.
    ///
    /// Returns `true` for the call that actually triggered the signal and
    /// `false` for every later call.
    pub fn trigger(&self) -> bool {
        if self.inner.triggered.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.inner.sender.lock().take();
        true
    }

    /// Check whether the signal has fired
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Get a receiver that becomes ready (disconnected) once the signal fires
    pub fn listener(&self) -> Receiver<()> {
        self.inner.receiver.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_trigger_is_one_shot() {
        let signal = StopSignal::new();
        assert!(signal.trigger());
        assert!(!signal.trigger());
        assert!(signal.is_triggered());
    }

    #[test]
    fn test_listener_wakes_blocked_thread() {
        let signal = StopSignal::new();
        let listener = signal.listener();

        let handle = thread::spawn(move || listener.recv().is_err());

        thread::sleep(Duration::from_millis(20));
        signal.trigger();

        assert!(handle.join().expect("listener thread panicked"));
    }

    #[test]
    fn test_listener_created_after_trigger() {
        let signal = StopSignal::new();
        signal.trigger();

        let late = signal.clone().listener();
        assert!(matches!(
            late.recv_timeout(Duration::from_secs(1)),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected)
        ));
    }
}
