//! Remote marketplace exchange types.
//!
//! Shapes passed across the `MarketplaceApi` port. Field names follow the
//! MercadoLibre wire contract so the payload types serialize directly.

use serde::{Deserialize, Serialize};

/// Result of an OAuth token grant (authorization code or refresh).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAuthTokens {
    pub access_token: String,

    /// Absent when the provider keeps the previous refresh token valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds, relative to the response instant.
    pub expires_in: i64,

    /// Space-separated granted scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Marketplace account the grant belongs to.
    pub remote_user_id: String,
}

impl RemoteAuthTokens {
    /// Granted scopes as a list.
    #[must_use]
    pub fn scope_list(&self) -> Vec<String> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Remote account details returned by the user-info endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteUserInfo {
    pub id: String,
    pub nickname: String,
    pub email: String,
    pub country_id: String,
    pub user_type: String,
}

/// A listing on the remote catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub available_quantity: i64,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

/// Payload for creating a new remote listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItemPayload {
    pub title: String,
    pub category_id: String,
    pub price: f64,
    pub currency_id: String,
    pub available_quantity: i64,
    pub buying_mode: String,
    pub listing_type_id: String,
    pub condition: String,
    pub description: ItemDescription,
    pub pictures: Vec<ItemPicture>,
    pub attributes: Vec<ItemAttribute>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDescription {
    pub plain_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemPicture {
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAttribute {
    pub id: String,
    pub value_name: String,
}

/// Fields pushed on an update of an existing remote listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub title: String,
    pub price: f64,
    pub available_quantity: i64,
}
