//! In-memory product store.
//!
//! Stands in for the external inventory collaborator so the binary and the
//! end-to-end tests are self-contained. Only the port surface the sync
//! engine needs is implemented.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use stockline_core::ProductRepository;
use stockline_domain::{Product, Result, StocklineError};

/// Keyed in-memory table of product records.
#[derive(Default)]
pub struct InMemoryProductStore {
    records: DashMap<String, Product>,
}

impl InMemoryProductStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given products.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let store = Self::new();
        for product in products {
            store.insert(product);
        }
        store
    }

    /// Insert or replace a product record.
    pub fn insert(&self, product: Product) {
        self.records.insert(product.id.clone(), product);
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductStore {
    async fn find_one(&self, product_id: &str, user_id: &str) -> Result<Product> {
        let product = self.records.get(product_id).ok_or_else(|| {
            StocklineError::NotFound(format!("product {product_id} does not exist"))
        })?;

        if product.user_id != user_id {
            return Err(StocklineError::Forbidden(format!(
                "product {product_id} belongs to another user"
            )));
        }

        Ok(product.clone())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self
            .records
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();

        // Deterministic listing order regardless of map iteration
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn attach_remote_id(
        &self,
        product_id: &str,
        user_id: &str,
        remote_item_id: &str,
    ) -> Result<()> {
        let mut product = self.records.get_mut(product_id).ok_or_else(|| {
            StocklineError::NotFound(format!("product {product_id} does not exist"))
        })?;

        if product.user_id != user_id {
            return Err(StocklineError::Forbidden(format!(
                "product {product_id} belongs to another user"
            )));
        }

        // Single idempotent field update: only ever set when absent
        if product.remote_item_id.is_none() {
            product.remote_item_id = Some(remote_item_id.to_string());
            product.updated_at = Utc::now();
        }

        Ok(())
    }
}
