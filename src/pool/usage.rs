//! Usage snapshot for debugging and metrics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Best-effort view of the pool's load.
///
/// The fields are read one after another without a common lock, so a
/// snapshot taken under load may be momentarily inconsistent (for example a
/// task counted both as waiting and as running).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUsage {
    /// Admitted tasks not yet executing
    pub queued: usize,
    /// Live workers (claimed slots), busy or idle
    pub running: usize,
    /// Slots still free for new workers
    pub idle_capacity: usize,
}

impl fmt::Display for PoolUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wait/run/idle:{}/{}/{}",
            self.queued, self.running, self.idle_capacity
        )
    }
}
