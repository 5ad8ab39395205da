//! MercadoLibre API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use stockline_core::MarketplaceApi;
use stockline_domain::constants::ITEMS_BATCH_LIMIT;
use stockline_domain::{
    ItemUpdate, MarketplaceConfig, NewItemPayload, RemoteAuthTokens, RemoteItem, RemoteUserInfo,
    Result, StocklineError,
};
use tracing::debug;

use super::types::{
    CreatedItemResponse, ItemSearchResponse, MultigetEntry, TokenGrantRequest, TokenGrantResponse,
    UserInfoResponse,
};
use crate::http::HttpClient;

/// Stateless client for the MercadoLibre REST API.
///
/// Owns no authentication state; every call takes the access token it needs.
pub struct MercadoLibreClient {
    http: HttpClient,
    api_base: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl MercadoLibreClient {
    /// Create a client from the marketplace configuration.
    ///
    /// # Errors
    /// Returns `Config` when the HTTP client cannot be built.
    pub fn new(config: &MarketplaceConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .max_attempts(3)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        })
    }

    async fn token_grant(&self, request: &TokenGrantRequest<'_>) -> Result<TokenGrantResponse> {
        let url = format!("{}/oauth/token", self.api_base);
        let builder = self.http.request(Method::POST, &url).json(request);
        self.expect_json(builder, "token grant").await
    }

    /// Execute a request and deserialize a 2xx JSON body, mapping any other
    /// outcome to `RemoteApi` with the upstream status and message.
    async fn expect_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T> {
        let response = self.http.send(builder).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StocklineError::RemoteApi(format!(
                "{context} failed with status {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| StocklineError::RemoteApi(format!("{context}: invalid response body: {err}")))
    }

    fn bearer(builder: reqwest::RequestBuilder, access_token: &str) -> reqwest::RequestBuilder {
        builder.header("Authorization", format!("Bearer {access_token}"))
    }
}

#[async_trait]
impl MarketplaceApi for MercadoLibreClient {
    async fn exchange_code(&self, code: &str) -> Result<RemoteAuthTokens> {
        let response = self
            .token_grant(&TokenGrantRequest {
                grant_type: "authorization_code",
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                code: Some(code),
                redirect_uri: Some(&self.redirect_uri),
                refresh_token: None,
            })
            .await?;

        let remote_user_id = response
            .user_id
            .map(|id| id.to_string())
            .ok_or_else(|| {
                StocklineError::RemoteApi(
                    "token grant response did not include the account id".to_string(),
                )
            })?;

        Ok(RemoteAuthTokens {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
            scope: response.scope,
            remote_user_id,
        })
    }

    async fn refresh_grant(&self, refresh_token: &str) -> Result<RemoteAuthTokens> {
        let response = self
            .token_grant(&TokenGrantRequest {
                grant_type: "refresh_token",
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                code: None,
                redirect_uri: None,
                refresh_token: Some(refresh_token),
            })
            .await?;

        Ok(RemoteAuthTokens {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
            scope: response.scope,
            remote_user_id: response.user_id.map(|id| id.to_string()).unwrap_or_default(),
        })
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<RemoteUserInfo> {
        let url = format!("{}/users/me", self.api_base);
        let builder = Self::bearer(self.http.request(Method::GET, &url), access_token);
        let response: UserInfoResponse = self.expect_json(builder, "user info fetch").await?;

        Ok(RemoteUserInfo {
            id: response.id.to_string(),
            nickname: response.nickname,
            email: response.email,
            country_id: response.country_id,
            user_type: response.user_type,
        })
    }

    async fn list_active_item_ids(
        &self,
        access_token: &str,
        remote_user_id: &str,
    ) -> Result<Vec<String>> {
        let url = format!("{}/users/{}/items/search?status=active", self.api_base, remote_user_id);
        let builder = Self::bearer(self.http.request(Method::GET, &url), access_token);
        let response: ItemSearchResponse = self.expect_json(builder, "item search").await?;

        Ok(response.results)
    }

    async fn fetch_items_batch(
        &self,
        access_token: &str,
        ids: &[String],
    ) -> Result<Vec<RemoteItem>> {
        let mut items = Vec::with_capacity(ids.len());

        // The multiget endpoint caps each call at 20 ids
        for chunk in ids.chunks(ITEMS_BATCH_LIMIT) {
            let url = format!("{}/items?ids={}", self.api_base, chunk.join(","));
            let builder = Self::bearer(self.http.request(Method::GET, &url), access_token);
            let entries: Vec<MultigetEntry> = self.expect_json(builder, "items multiget").await?;

            let fetched = entries
                .into_iter()
                .filter(|entry| entry.code == 200)
                .filter_map(|entry| entry.body);
            items.extend(fetched);
        }

        debug!(requested = ids.len(), fetched = items.len(), "fetched item batch");
        Ok(items)
    }

    async fn create_item(&self, access_token: &str, payload: &NewItemPayload) -> Result<String> {
        let url = format!("{}/items", self.api_base);
        let builder = Self::bearer(self.http.request(Method::POST, &url), access_token).json(payload);
        let response: CreatedItemResponse = self.expect_json(builder, "item create").await?;

        Ok(response.id)
    }

    async fn update_item(
        &self,
        access_token: &str,
        item_id: &str,
        update: &ItemUpdate,
    ) -> Result<()> {
        let url = format!("{}/items/{}", self.api_base, item_id);
        let builder = Self::bearer(self.http.request(Method::PUT, &url), access_token).json(update);

        let response = self.http.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StocklineError::RemoteApi(format!(
                "item update failed with status {status}: {body}"
            )));
        }

        Ok(())
    }
}
