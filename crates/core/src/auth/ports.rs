//! Port interfaces for token persistence.

use async_trait::async_trait;
use stockline_domain::{MarketplaceToken, Result};

/// Keyed store holding one token record per local user.
///
/// Records are upserted in place and never deleted; deactivated tokens stay
/// around for audit history.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Look up a token by its id.
    async fn get(&self, token_id: &str) -> Result<Option<MarketplaceToken>>;

    /// Look up the user's token record regardless of its active flag.
    async fn find_for_user(&self, user_id: &str) -> Result<Option<MarketplaceToken>>;

    /// Look up the user's active token, if any.
    async fn find_active_for_user(&self, user_id: &str) -> Result<Option<MarketplaceToken>>;

    /// Snapshot all active tokens (scheduler sweep input).
    async fn list_active(&self) -> Result<Vec<MarketplaceToken>>;

    /// Insert or overwrite the record with the same id.
    async fn upsert(&self, token: &MarketplaceToken) -> Result<()>;
}
