//! Marketplace token record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// OAuth token record for one local user's marketplace connection.
///
/// At most one record with `is_active == true` exists per `user_id`.
/// Records are mutated in place on refresh and deactivated (never deleted)
/// when a refresh fails permanently or the user disconnects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceToken {
    pub id: String,

    /// Local user the token belongs to.
    pub user_id: String,

    /// Account id on the remote marketplace.
    pub remote_user_id: String,

    pub access_token: String,
    pub refresh_token: String,

    /// Absolute expiry instant, derived from the provider's `expires_in`
    /// relative to the instant the response was received.
    pub expires_at: DateTime<Utc>,

    /// Cleared on unrecoverable refresh failure or explicit disconnect;
    /// re-entry requires a fresh authorization flow.
    pub is_active: bool,

    pub scopes: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh_at: Option<DateTime<Utc>>,
}

impl MarketplaceToken {
    /// Whether the token needs refreshing at the given instant.
    ///
    /// True when `now >= expires_at - lead`; the boundary counts as
    /// needing refresh.
    #[must_use]
    pub fn needs_refresh_at(&self, now: DateTime<Utc>, lead: Duration) -> bool {
        now >= self.expires_at - lead
    }

    /// Whether the token needs refreshing right now.
    #[must_use]
    pub fn needs_refresh(&self, lead: Duration) -> bool {
        self.needs_refresh_at(Utc::now(), lead)
    }

    /// Seconds until the access token expires (negative if already expired).
    #[must_use]
    pub fn seconds_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds()
    }
}
