//! Token lifecycle manager.
//!
//! Owns the OAuth handshake, staleness checks, refresh, and deactivation of
//! marketplace tokens. Refreshes are serialized per token id: a request-time
//! refresh (`active_token`) and the background sweep can never both be in
//! flight for the same token, which would invalidate one of the two rotated
//! credential pairs at the provider. The original implementation this engine
//! replaces had no such guard.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use stockline_domain::{
    MarketplaceConfig, MarketplaceToken, RemoteAuthTokens, RemoteUserInfo, Result, StocklineError,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::ports::TokenStore;
use super::state;
use crate::marketplace_ports::MarketplaceApi;

/// Manages the full lifecycle of marketplace tokens.
pub struct TokenLifecycleManager {
    marketplace: Arc<dyn MarketplaceApi>,
    tokens: Arc<dyn TokenStore>,
    config: MarketplaceConfig,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TokenLifecycleManager {
    /// Create a new lifecycle manager.
    pub fn new(
        marketplace: Arc<dyn MarketplaceApi>,
        tokens: Arc<dyn TokenStore>,
        config: MarketplaceConfig,
    ) -> Self {
        Self { marketplace, tokens, config, refresh_locks: DashMap::new() }
    }

    /// Build the provider authorization URL and its signed `state` token.
    ///
    /// Pure computation; the state is self-describing and round-tripped
    /// through the redirect, nothing is stored server-side.
    ///
    /// # Errors
    /// Returns error if the state token cannot be signed.
    pub fn authorization_url(&self, user_id: &str) -> Result<(String, String)> {
        let state = state::encode(&self.config.state_secret, user_id)?;

        let url = format!(
            "{}/authorization?response_type=code&client_id={}&redirect_uri={}&state={}",
            self.config.auth_base,
            self.config.client_id,
            urlencoding::encode(&self.config.redirect_uri),
            state,
        );

        Ok((url, state))
    }

    /// Complete the OAuth handshake for a provider callback.
    ///
    /// Exchanges `code` for a token pair, fetches the remote account info,
    /// and upserts the user's token record (preserving `id` and `created_at`
    /// of an existing record). No partial token is persisted on failure.
    ///
    /// # Errors
    /// Returns `InvalidState` for an unverifiable `state` and `RemoteAuth`
    /// if either remote call fails.
    pub async fn complete_authorization(
        &self,
        code: &str,
        state: &str,
    ) -> Result<(MarketplaceToken, RemoteUserInfo)> {
        let auth_state = state::decode(&self.config.state_secret, state)?;

        let grant = self.marketplace.exchange_code(code).await.map_err(into_remote_auth)?;
        let user_info =
            self.marketplace.fetch_user_info(&grant.access_token).await.map_err(into_remote_auth)?;

        let token = self.upsert_token(&auth_state.user_id, &grant, &user_info).await?;

        info!(
            user_id = %token.user_id,
            remote_user_id = %token.remote_user_id,
            "marketplace authorization completed"
        );

        Ok((token, user_info))
    }

    /// Whether the token is within the configured refresh lead window.
    #[must_use]
    pub fn needs_refresh(&self, token: &MarketplaceToken) -> bool {
        token.needs_refresh(self.refresh_lead())
    }

    /// Refresh a token unconditionally.
    ///
    /// # Errors
    /// Returns `NotFound` if no such token exists. On a rejected refresh
    /// grant, deactivates the token, persists that, and returns
    /// `RefreshFailed`; this is terminal and the caller must not retry the
    /// same token automatically.
    pub async fn refresh(&self, token_id: &str) -> Result<MarketplaceToken> {
        self.refresh_inner(token_id, false).await
    }

    /// Refresh a token only if it still needs it once the per-token lock is
    /// held.
    ///
    /// Collapses the request-time and sweep-time refresh paths racing on the
    /// same token into a single provider call: whichever caller enters
    /// second finds a fresh token and returns it untouched.
    ///
    /// # Errors
    /// Same failure modes as [`Self::refresh`].
    pub async fn refresh_if_stale(&self, token_id: &str) -> Result<MarketplaceToken> {
        self.refresh_inner(token_id, true).await
    }

    /// Return the user's active token, refreshing it first when stale.
    ///
    /// # Errors
    /// Returns `NotConnected` when the user has no active token and
    /// `RefreshFailed` when a required refresh is rejected.
    pub async fn active_token(&self, user_id: &str) -> Result<MarketplaceToken> {
        let token = self.tokens.find_active_for_user(user_id).await?.ok_or_else(|| {
            StocklineError::NotConnected(format!(
                "no active marketplace connection for user {user_id}"
            ))
        })?;

        if !self.needs_refresh(&token) {
            return Ok(token);
        }

        let refreshed = self.refresh_if_stale(&token.id).await?;
        if !refreshed.is_active {
            // A concurrent sweep deactivated the token between lookup and lock
            return Err(StocklineError::NotConnected(format!(
                "marketplace connection for user {user_id} is no longer active"
            )));
        }

        Ok(refreshed)
    }

    /// Deactivate the user's token. Idempotent no-op when none exists.
    ///
    /// # Errors
    /// Returns error only if the token store fails.
    pub async fn disconnect(&self, user_id: &str) -> Result<()> {
        let Some(mut token) = self.tokens.find_active_for_user(user_id).await? else {
            debug!(user_id, "disconnect requested without an active token");
            return Ok(());
        };

        token.is_active = false;
        token.updated_at = Utc::now();
        self.tokens.upsert(&token).await?;

        info!(user_id, token_id = %token.id, "marketplace connection disconnected");
        Ok(())
    }

    fn refresh_lead(&self) -> Duration {
        Duration::seconds(self.config.refresh_lead_seconds)
    }

    async fn refresh_inner(&self, token_id: &str, only_if_stale: bool) -> Result<MarketplaceToken> {
        let lock = {
            let entry = self.refresh_locks.entry(token_id.to_string()).or_default();
            Arc::clone(&entry)
        };
        let _guard = lock.lock().await;

        // Reload under the lock: a racing caller may have rotated the
        // credentials already.
        let mut token = self
            .tokens
            .get(token_id)
            .await?
            .ok_or_else(|| StocklineError::NotFound(format!("token {token_id} does not exist")))?;

        if only_if_stale && !(token.is_active && self.needs_refresh(&token)) {
            debug!(token_id, "token already fresh, skipping refresh");
            return Ok(token);
        }

        match self.marketplace.refresh_grant(&token.refresh_token).await {
            Ok(grant) => {
                let now = Utc::now();
                token.access_token = grant.access_token;
                if let Some(refresh_token) = grant.refresh_token {
                    token.refresh_token = refresh_token;
                }
                token.expires_at = now + Duration::seconds(grant.expires_in);
                token.updated_at = now;
                token.last_refresh_at = Some(now);
                self.tokens.upsert(&token).await?;

                info!(token_id, user_id = %token.user_id, "access token refreshed");
                Ok(token)
            }
            Err(err) => {
                token.is_active = false;
                token.updated_at = Utc::now();
                self.tokens.upsert(&token).await?;

                warn!(
                    token_id,
                    user_id = %token.user_id,
                    error = %err,
                    "refresh grant rejected, token deactivated"
                );
                Err(StocklineError::RefreshFailed(format!(
                    "could not renew marketplace token: {err}"
                )))
            }
        }
    }

    async fn upsert_token(
        &self,
        user_id: &str,
        grant: &RemoteAuthTokens,
        user_info: &RemoteUserInfo,
    ) -> Result<MarketplaceToken> {
        let refresh_token = grant.refresh_token.clone().ok_or_else(|| {
            StocklineError::RemoteAuth(
                "authorization response did not include a refresh token".to_string(),
            )
        })?;

        let now = Utc::now();
        let existing = self.tokens.find_for_user(user_id).await?;
        let (id, created_at) = match &existing {
            Some(previous) => (previous.id.clone(), previous.created_at),
            None => (uuid::Uuid::new_v4().to_string(), now),
        };

        let token = MarketplaceToken {
            id,
            user_id: user_id.to_string(),
            remote_user_id: user_info.id.clone(),
            access_token: grant.access_token.clone(),
            refresh_token,
            expires_at: now + Duration::seconds(grant.expires_in),
            is_active: true,
            scopes: grant.scope_list(),
            created_at,
            updated_at: now,
            last_refresh_at: Some(now),
        };

        self.tokens.upsert(&token).await?;
        Ok(token)
    }
}

fn into_remote_auth(err: StocklineError) -> StocklineError {
    match err {
        StocklineError::RemoteApi(message) => StocklineError::RemoteAuth(message),
        other => other,
    }
}
