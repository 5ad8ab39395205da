//! Scheduling infrastructure for background task execution.
//!
//! Contains the token refresh scheduler, which sweeps the token store on a
//! fixed interval and refreshes tokens approaching expiry. Schedulers follow
//! explicit lifecycle management (start/stop), hold join handles for spawned
//! tasks, and support cancellation tokens.

pub mod error;
pub mod refresh_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use refresh_scheduler::{RefreshSchedulerConfig, TokenRefreshScheduler};
