//! Scheduler error types

use std::time::Duration;

use thiserror::Error;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler is already running
    #[error("Scheduler already running")]
    AlreadyRunning,

    /// Scheduler is not running
    #[error("Scheduler not running")]
    NotRunning,

    /// Stopping the scheduler timed out
    #[error("Scheduler stop timed out after {0:?}")]
    StopTimeout(Duration),

    /// The background task panicked or was aborted
    #[error("Scheduler task join failed: {0}")]
    TaskJoinFailed(#[from] tokio::task::JoinError),
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
