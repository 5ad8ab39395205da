//! Per-product sync outcome types.

use serde::{Deserialize, Serialize};

/// What the sync engine did with one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
    Synced,
    Error,
}

/// Outcome of one attempted product within a sync invocation.
///
/// Ephemeral: returned to the caller and discarded, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    pub message: String,
    pub local_product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_item_id: Option<String>,
    pub action: SyncAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    /// Build an error outcome for a product that could not be synchronized.
    #[must_use]
    pub fn error(
        local_product_id: impl Into<String>,
        message: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            local_product_id: local_product_id.into(),
            remote_item_id: None,
            action: SyncAction::Error,
            error: Some(error.into()),
        }
    }
}
