//! Local product slice read by the sync engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The slice of a local inventory product the integration engine works with.
///
/// The product record is owned by the inventory collaborator; the engine
/// reads these fields and writes back only `remote_item_id`, and only when
/// it was previously unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub user_id: String,
    pub sku: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,

    /// Identifier of the listing on the remote marketplace, once created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_item_id: Option<String>,

    /// Whether the product participates in whole-catalog sync runs.
    pub sync_enabled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
