//! Port interface for the remote marketplace API.

use async_trait::async_trait;
use stockline_domain::{
    ItemUpdate, NewItemPayload, RemoteAuthTokens, RemoteItem, RemoteUserInfo, Result,
};

/// Stateless wrapper around the remote marketplace operations.
///
/// Every method takes the credential it needs explicitly; implementations
/// own no authentication state. Any non-2xx or transport failure surfaces as
/// a single `RemoteApi` error; callers decide whether that is fatal
/// (token-related calls) or recoverable per item (catalog calls).
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Exchange an authorization code for an access/refresh token pair.
    async fn exchange_code(&self, code: &str) -> Result<RemoteAuthTokens>;

    /// Mint a new access token from a refresh token. The response may omit
    /// the refresh token, meaning the previous one stays valid.
    async fn refresh_grant(&self, refresh_token: &str) -> Result<RemoteAuthTokens>;

    /// Fetch account details for the bearer of `access_token`.
    async fn fetch_user_info(&self, access_token: &str) -> Result<RemoteUserInfo>;

    /// List ids of the user's active listings.
    async fn list_active_item_ids(
        &self,
        access_token: &str,
        remote_user_id: &str,
    ) -> Result<Vec<String>>;

    /// Fetch listing details in chunks, concatenated in request order.
    /// Items the remote marks as failed within a chunk are dropped.
    async fn fetch_items_batch(
        &self,
        access_token: &str,
        ids: &[String],
    ) -> Result<Vec<RemoteItem>>;

    /// Create a listing; returns the assigned remote item id.
    async fn create_item(&self, access_token: &str, payload: &NewItemPayload) -> Result<String>;

    /// Push updated fields onto an existing listing.
    async fn update_item(
        &self,
        access_token: &str,
        item_id: &str,
        update: &ItemUpdate,
    ) -> Result<()>;
}
