//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Stockline
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum StocklineError {
    /// OAuth handshake step failed (bad code, revoked client credentials).
    /// Not retried; surfaced to the caller.
    #[error("Remote authentication failed: {0}")]
    RemoteAuth(String),

    /// Refresh grant rejected. The token is deactivated as a side effect and
    /// the user must re-run the authorization flow.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// No active marketplace token exists for the user.
    #[error("No active marketplace connection: {0}")]
    NotConnected(String),

    /// Any other remote-call failure (catalog read/write, user-info fetch),
    /// carrying the upstream status and message.
    #[error("Remote API error: {0}")]
    RemoteApi(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// OAuth `state` token failed signature verification or parsing.
    #[error("Invalid state token: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Stockline operations
pub type Result<T> = std::result::Result<T, StocklineError>;
