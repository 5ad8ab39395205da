//! Port interfaces for the inventory collaborator.

use async_trait::async_trait;
use stockline_domain::{Product, Result};

/// Read/write access to the locally stored products.
///
/// The inventory store is owned by an external collaborator; the sync engine
/// only reads product slices and writes back the remote item id.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Look up one product scoped to its owner.
    ///
    /// # Errors
    /// `NotFound` when no such product exists, `Forbidden` when it belongs
    /// to a different user.
    async fn find_one(&self, product_id: &str, user_id: &str) -> Result<Product>;

    /// List all of the user's products.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Product>>;

    /// Record the remote item id assigned on create.
    ///
    /// The write applies only when the field is currently unset, so repeated
    /// or concurrent sync runs cannot clobber an existing linkage.
    async fn attach_remote_id(
        &self,
        product_id: &str,
        user_id: &str,
        remote_item_id: &str,
    ) -> Result<()>;
}
