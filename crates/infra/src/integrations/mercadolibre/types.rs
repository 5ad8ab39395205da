//! Wire types for the MercadoLibre REST API.

use serde::{Deserialize, Serialize};

/// Body of an OAuth token grant request (both grant types share the shape).
#[derive(Debug, Serialize)]
pub(crate) struct TokenGrantRequest<'a> {
    pub grant_type: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<&'a str>,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenGrantResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub user_id: Option<u64>,
}

/// `/users/me` response.
#[derive(Debug, Deserialize)]
pub(crate) struct UserInfoResponse {
    pub id: u64,
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub country_id: String,
    #[serde(default)]
    pub user_type: String,
}

/// User-scoped item search response; only the id list is read.
#[derive(Debug, Deserialize)]
pub(crate) struct ItemSearchResponse {
    pub results: Vec<String>,
}

/// One entry of the `/items?ids=…` multiget envelope. Entries with a
/// non-200 `code` carry no usable body and are dropped by the caller.
#[derive(Debug, Deserialize)]
pub(crate) struct MultigetEntry {
    pub code: u16,
    #[serde(default)]
    pub body: Option<stockline_domain::RemoteItem>,
}

/// Item create response; only the assigned id is read.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedItemResponse {
    pub id: String,
}
