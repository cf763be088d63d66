//! Worker slot semaphore.
//!
//! A bounded channel of capacity `core_size` whose messages are plain tokens.
//! Sending a token claims a slot, receiving one gives it back, and the
//! channel length is the number of live workers. Because claiming is a
//! channel send, the dispatcher can arm it inside the same `Select` as the
//! idle-worker handoff.

use crossbeam_channel::{Receiver, Sender};

/// Counting semaphore bounding live workers
#[derive(Debug)]
pub struct WorkerSlots {
    sender: Sender<()>,
    receiver: Receiver<()>,
    capacity: usize,
}

/// A claimed slot; dropping it releases the slot
#[derive(Debug)]
pub struct SlotToken {
    receiver: Receiver<()>,
}

impl WorkerSlots {
    /// Create a semaphore with `capacity` slots
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Claim a slot if one is free
    pub fn try_acquire(&self) -> Option<SlotToken> {
        self.sender.try_send(()).ok().map(|()| self.claimed())
    }

    /// Sending side, for arming a claim inside a `Select`
    pub(crate) fn claim_sender(&self) -> &Sender<()> {
        &self.sender
    }

    /// Wrap a token already sent through [`claim_sender`](Self::claim_sender)
    pub(crate) fn claimed(&self) -> SlotToken {
        SlotToken {
            receiver: self.receiver.clone(),
        }
    }

    /// Number of claimed slots (live workers)
    pub fn occupied(&self) -> usize {
        self.sender.len()
    }

    /// Number of free slots
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.occupied())
    }

    /// Total number of slots (`core_size`)
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Drop for SlotToken {
    fn drop(&mut self) {
        // One token was sent for this slot, so one is there to take back.
        let _ = self.receiver.try_recv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_up_to_capacity() {
        let slots = WorkerSlots::new(2);
        let first = slots.try_acquire().expect("slot free");
        let second = slots.try_acquire().expect("slot free");
        assert!(slots.try_acquire().is_none());
        assert_eq!(slots.occupied(), 2);
        assert_eq!(slots.available(), 0);

        drop(first);
        assert_eq!(slots.occupied(), 1);
        let _third = slots.try_acquire().expect("slot released");

        drop(second);
        assert_eq!(slots.available(), 1);
    }

    #[test]
    fn test_claim_through_sender() {
        let slots = WorkerSlots::new(1);
        slots.claim_sender().send(()).expect("slot free");
        let token = slots.claimed();
        assert_eq!(slots.occupied(), 1);

        drop(token);
        assert_eq!(slots.occupied(), 0);
        assert_eq!(slots.capacity(), 1);
    }
}
