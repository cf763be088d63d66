//! Error types for the worker pool

/// Result type for worker pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the worker pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Pool has not been started or has been stopped
    #[error("pool is not running")]
    NotRunning,

    /// `start()` was called on a pool that is already running
    #[error("pool '{pool_name}' has already been started")]
    AlreadyStarted {
        /// Thread name prefix of the pool
        pool_name: String,
    },

    /// `start()` was called on a pool that has been stopped
    #[error("pool '{pool_name}' has been stopped and cannot be restarted")]
    AlreadyStopped {
        /// Thread name prefix of the pool
        pool_name: String,
    },

    /// All `max_size` admission slots are taken
    #[error("exceed max size {max_size}, and discard")]
    Saturated {
        /// Total admissible outstanding tasks
        max_size: usize,
    },

    /// No admission slot freed up within the submission timeout
    #[error("timeout: exceed max size {max_size}, and discard")]
    SubmissionTimeout {
        /// Total admissible outstanding tasks
        max_size: usize,
        /// How long the caller waited in milliseconds
        timeout_ms: u64,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Failed to spawn a worker or dispatcher thread
    #[error("Failed to spawn thread #{worker_id}: {message}")]
    SpawnError {
        /// ID of the thread that failed to spawn
        worker_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// The task was dropped without producing a result
    #[error("task '{task}' was abandoned before producing a result")]
    TaskAbandoned {
        /// Name of the abandoned task
        task: String,
    },

    /// Waiting on a task result timed out
    #[error("waiting for task '{task}' timed out after {timeout_ms}ms")]
    ResultTimeout {
        /// Name of the task
        task: String,
        /// Wait duration in milliseconds
        timeout_ms: u64,
    },
}

impl PoolError {
    /// Create an already started error
    pub fn already_started(pool_name: impl Into<String>) -> Self {
        PoolError::AlreadyStarted {
            pool_name: pool_name.into(),
        }
    }

    /// Create an already stopped error
    pub fn already_stopped(pool_name: impl Into<String>) -> Self {
        PoolError::AlreadyStopped {
            pool_name: pool_name.into(),
        }
    }

    /// Create a saturation error
    pub fn saturated(max_size: usize) -> Self {
        PoolError::Saturated { max_size }
    }

    /// Create a submission timeout error
    pub fn submission_timeout(max_size: usize, timeout_ms: u64) -> Self {
        PoolError::SubmissionTimeout {
            max_size,
            timeout_ms,
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::SpawnError {
            worker_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a task abandoned error
    pub fn task_abandoned(task: impl Into<String>) -> Self {
        PoolError::TaskAbandoned { task: task.into() }
    }

    /// Create a result timeout error
    pub fn result_timeout(task: impl Into<String>, timeout_ms: u64) -> Self {
        PoolError::ResultTimeout {
            task: task.into(),
            timeout_ms,
        }
    }

    /// Convert a duration to whole milliseconds, saturating at `u64::MAX`
    pub(crate) fn millis(duration: std::time::Duration) -> u64 {
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
    }

    /// Whether the error is one of the admission rejections a caller may retry
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PoolError::NotRunning | PoolError::Saturated { .. } | PoolError::SubmissionTimeout { .. }
        )
    }
}
