//! Background token refresh scheduler.
//!
//! Sweeps the token store on a fixed interval (hourly by default), asking
//! the lifecycle manager to refresh every active token approaching expiry.
//! Per-token failures are logged and never propagate, so one token's failure
//! cannot block the sweep of the rest. The lifecycle manager serializes
//! refreshes per token, so a sweep racing a request-time refresh performs no
//! duplicate provider call.

use std::sync::Arc;
use std::time::Duration;

use stockline_core::{TokenLifecycleManager, TokenStore};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for the guarded task handle
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the token refresh scheduler
#[derive(Debug, Clone)]
pub struct RefreshSchedulerConfig {
    /// Sweep interval
    pub interval: Duration,
}

impl Default for RefreshSchedulerConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(3_600) }
    }
}

/// Interval-based scheduler that keeps marketplace tokens fresh.
pub struct TokenRefreshScheduler {
    lifecycle: Arc<TokenLifecycleManager>,
    tokens: Arc<dyn TokenStore>,
    config: RefreshSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl TokenRefreshScheduler {
    /// Create a new scheduler.
    pub fn new(
        lifecycle: Arc<TokenLifecycleManager>,
        tokens: Arc<dyn TokenStore>,
        config: RefreshSchedulerConfig,
    ) -> Self {
        Self {
            lifecycle,
            tokens,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the scheduler.
    ///
    /// Spawns a background task that sweeps the token store periodically.
    ///
    /// # Errors
    /// Returns error if the scheduler is already running.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(interval_secs = self.config.interval.as_secs(), "Starting token refresh scheduler");

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        let lifecycle = Arc::clone(&self.lifecycle);
        let tokens = Arc::clone(&self.tokens);
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::sweep_loop(lifecycle, tokens, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Token refresh scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully.
    ///
    /// Cancels the background task and awaits completion.
    ///
    /// # Errors
    /// Returns error if the scheduler is not running or the task does not
    /// finish within the stop timeout.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping token refresh scheduler");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::StopTimeout(join_timeout))??;
        }

        info!("Token refresh scheduler stopped");
        Ok(())
    }

    /// Check if the scheduler is running.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Background sweep loop.
    async fn sweep_loop(
        lifecycle: Arc<TokenLifecycleManager>,
        tokens: Arc<dyn TokenStore>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Refresh sweep loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    Self::sweep(&lifecycle, &tokens).await;
                }
            }
        }
    }

    /// Sweep the token store once, refreshing every stale active token.
    ///
    /// Side effects only; failures are logged, never propagated.
    async fn sweep(lifecycle: &Arc<TokenLifecycleManager>, tokens: &Arc<dyn TokenStore>) {
        let active = match tokens.list_active().await {
            Ok(active) => active,
            Err(err) => {
                warn!(error = %err, "Failed to snapshot active tokens for refresh sweep");
                return;
            }
        };

        let stale: Vec<_> =
            active.into_iter().filter(|token| lifecycle.needs_refresh(token)).collect();

        if stale.is_empty() {
            debug!("No tokens approaching expiry");
            return;
        }

        info!(count = stale.len(), "Refreshing tokens approaching expiry");

        for token in stale {
            match lifecycle.refresh_if_stale(&token.id).await {
                Ok(_) => debug!(token_id = %token.id, user_id = %token.user_id, "Token refreshed"),
                Err(err) => {
                    // One token's failure never blocks the sweep of the rest
                    warn!(
                        token_id = %token.id,
                        user_id = %token.user_id,
                        error = %err,
                        "Token refresh failed during sweep"
                    );
                }
            }
        }
    }
}

/// Ensure scheduler is stopped when dropped
impl Drop for TokenRefreshScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            self.cancellation_token.cancel();
        }
    }
}
