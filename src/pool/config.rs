//! Pool configuration

use crate::core::{PoolError, Result};
use std::time::Duration;

/// How the dispatcher chooses between an idle worker and a fresh one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Arm both the idle-worker handoff and a new-worker spawn and take
    /// whichever is ready; when both are, the choice is random.
    #[default]
    Race,
    /// Offer the task to an idle worker first and only race for a spawn if
    /// no worker is waiting at that instant.
    PreferReuse,
}

/// Configuration for an elastic pool
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum number of concurrently alive workers
    pub core_size: usize,
    /// Maximum number of outstanding tasks (running + waiting).
    /// The waiting room is `max_size - core_size`.
    pub max_size: usize,
    /// How long an idle worker waits for work before exiting
    pub idle_timeout: Duration,
    /// Thread name prefix for the dispatcher and workers
    pub thread_name_prefix: String,
    /// Drain bound used by `cancel()`.
    /// Default: 3s
    pub cancel_wait: Duration,
    /// Reuse-versus-spawn policy of the dispatcher.
    /// Default: Race
    pub dispatch_policy: DispatchPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let core_size = num_cpus::get();
        Self {
            core_size,
            max_size: core_size * 4,
            idle_timeout: Duration::from_secs(60),
            thread_name_prefix: "elastic".to_string(),
            cancel_wait: Duration::from_secs(3),
            dispatch_policy: DispatchPolicy::default(),
        }
    }
}

impl PoolConfig {
    /// Create a new configuration from the three sizing parameters
    #[must_use]
    pub fn new(core_size: usize, max_size: usize, idle_timeout: Duration) -> Self {
        Self {
            core_size,
            max_size,
            idle_timeout,
            ..Default::default()
        }
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the drain bound used by `cancel()`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_cancel_wait(mut self, wait: Duration) -> Self {
        self.cancel_wait = wait;
        self
    }

    /// Set the dispatcher's reuse-versus-spawn policy
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_dispatch_policy(mut self, policy: DispatchPolicy) -> Self {
        self.dispatch_policy = policy;
        self
    }

    /// Shorthand for [`DispatchPolicy::PreferReuse`]
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn prefer_reuse(self) -> Self {
        self.with_dispatch_policy(DispatchPolicy::PreferReuse)
    }

    /// Number of tasks that may wait beyond the core workers
    pub fn queue_capacity(&self) -> usize {
        self.max_size.saturating_sub(self.core_size)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.core_size == 0 {
            return Err(PoolError::invalid_config(
                "core_size",
                "Number of workers must be greater than 0",
            ));
        }
        if self.max_size < self.core_size {
            return Err(PoolError::invalid_config(
                "max_size",
                format!(
                    "max_size ({}) must be at least core_size ({})",
                    self.max_size, self.core_size
                ),
            ));
        }
        if self.idle_timeout.is_zero() {
            return Err(PoolError::invalid_config(
                "idle_timeout",
                "idle timeout must be non-zero",
            ));
        }
        Ok(())
    }
}
