//! Product sync engine.
//!
//! Resolves the candidate set of local products, maps each to a
//! create-or-update call against the remote catalog, writes assigned remote
//! ids back onto local records, and aggregates per-item outcomes. A single
//! malformed product must never block synchronization of the remainder of a
//! user's catalog, so every remote failure is captured in that item's result.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use stockline_domain::constants::{DEFAULT_CATEGORY_ID, DEFAULT_CURRENCY_ID};
use stockline_domain::{
    ItemAttribute, ItemDescription, ItemPicture, ItemUpdate, NewItemPayload, Product, Result,
    SyncAction, SyncResult,
};
use tracing::{info, warn};

use super::ports::ProductRepository;
use crate::auth::TokenLifecycleManager;
use crate::marketplace_ports::MarketplaceApi;

/// A product selected for synchronization, or the reason it could not be
/// resolved.
enum Candidate {
    Product(Box<Product>),
    Unresolved { product_id: String, error: String },
}

/// Synchronizes local products with the remote catalog.
pub struct SyncEngine {
    lifecycle: Arc<TokenLifecycleManager>,
    marketplace: Arc<dyn MarketplaceApi>,
    products: Arc<dyn ProductRepository>,
    concurrency: usize,
}

impl SyncEngine {
    /// Create a new sync engine with the default worker pool size.
    pub fn new(
        lifecycle: Arc<TokenLifecycleManager>,
        marketplace: Arc<dyn MarketplaceApi>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            lifecycle,
            marketplace,
            products,
            concurrency: stockline_domain::constants::DEFAULT_SYNC_CONCURRENCY,
        }
    }

    /// Override the number of concurrent remote calls.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Synchronize a user's products with the remote catalog.
    ///
    /// With explicit `product_ids`, each id is resolved scoped to the user; a
    /// failed lookup yields an error result in place rather than aborting the
    /// batch. Without ids, all of the user's sync-enabled products are taken.
    ///
    /// Execution is concurrent over a bounded pool, but the returned results
    /// match candidate order so callers observe deterministic output.
    ///
    /// `force_sync` is accepted for forward compatibility with
    /// change-detection and currently does not alter behavior.
    ///
    /// # Errors
    /// Fails as a whole only when the user has no usable credential
    /// (`NotConnected`, `RefreshFailed`) or the product listing cannot be
    /// read; per-product remote failures are reported in their results.
    pub async fn sync_products(
        &self,
        user_id: &str,
        product_ids: Option<Vec<String>>,
        force_sync: bool,
    ) -> Result<Vec<SyncResult>> {
        let token = self.lifecycle.active_token(user_id).await?;
        let candidates = self.resolve_candidates(user_id, product_ids).await?;

        info!(
            user_id,
            candidates = candidates.len(),
            force_sync,
            "synchronizing products with remote catalog"
        );

        let access_token = token.access_token;
        let results: Vec<SyncResult> = stream::iter(candidates)
            .map(|candidate| {
                let access_token = access_token.clone();
                async move { self.sync_one(&access_token, user_id, candidate).await }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        Ok(results)
    }

    async fn resolve_candidates(
        &self,
        user_id: &str,
        product_ids: Option<Vec<String>>,
    ) -> Result<Vec<Candidate>> {
        match product_ids {
            Some(ids) if !ids.is_empty() => {
                let mut candidates = Vec::with_capacity(ids.len());
                for product_id in ids {
                    match self.products.find_one(&product_id, user_id).await {
                        Ok(product) => candidates.push(Candidate::Product(Box::new(product))),
                        Err(err) => candidates.push(Candidate::Unresolved {
                            product_id,
                            error: err.to_string(),
                        }),
                    }
                }
                Ok(candidates)
            }
            _ => Ok(self
                .products
                .list_for_user(user_id)
                .await?
                .into_iter()
                .filter(|p| p.sync_enabled)
                .map(|p| Candidate::Product(Box::new(p)))
                .collect()),
        }
    }

    async fn sync_one(&self, access_token: &str, user_id: &str, candidate: Candidate) -> SyncResult {
        match candidate {
            Candidate::Unresolved { product_id, error } => {
                warn!(user_id, product_id = %product_id, "skipping unresolvable product");
                SyncResult::error(product_id, "product not found", error)
            }
            Candidate::Product(product) => match product.remote_item_id.clone() {
                Some(remote_id) => self.update_remote_item(access_token, &product, &remote_id).await,
                None => self.create_remote_item(access_token, user_id, &product).await,
            },
        }
    }

    async fn update_remote_item(
        &self,
        access_token: &str,
        product: &Product,
        remote_id: &str,
    ) -> SyncResult {
        let update = ItemUpdate {
            title: product.name.clone(),
            price: product.price,
            available_quantity: product.stock,
        };

        match self.marketplace.update_item(access_token, remote_id, &update).await {
            Ok(()) => SyncResult {
                success: true,
                message: "product updated on remote catalog".to_string(),
                local_product_id: product.id.clone(),
                remote_item_id: Some(remote_id.to_string()),
                action: SyncAction::Updated,
                error: None,
            },
            Err(err) => {
                warn!(product_id = %product.id, error = %err, "remote update failed");
                SyncResult::error(
                    &product.id,
                    "failed to update product on remote catalog",
                    err.to_string(),
                )
            }
        }
    }

    async fn create_remote_item(
        &self,
        access_token: &str,
        user_id: &str,
        product: &Product,
    ) -> SyncResult {
        let payload = build_item_payload(product);

        match self.marketplace.create_item(access_token, &payload).await {
            Ok(remote_id) => {
                if let Err(err) =
                    self.products.attach_remote_id(&product.id, user_id, &remote_id).await
                {
                    warn!(
                        product_id = %product.id,
                        remote_id = %remote_id,
                        error = %err,
                        "created remotely but failed to record remote id"
                    );
                    return SyncResult::error(
                        &product.id,
                        "created remotely but failed to record remote id",
                        err.to_string(),
                    );
                }

                SyncResult {
                    success: true,
                    message: "product created on remote catalog".to_string(),
                    local_product_id: product.id.clone(),
                    remote_item_id: Some(remote_id),
                    action: SyncAction::Created,
                    error: None,
                }
            }
            Err(err) => {
                warn!(product_id = %product.id, error = %err, "remote create failed");
                SyncResult::error(
                    &product.id,
                    "failed to create product on remote catalog",
                    err.to_string(),
                )
            }
        }
    }
}

/// Build the remote listing payload for a product that has never been
/// published.
fn build_item_payload(product: &Product) -> NewItemPayload {
    let description = product
        .description
        .clone()
        .unwrap_or_else(|| format!("{} - available in stock", product.name));

    NewItemPayload {
        title: product.name.clone(),
        category_id: DEFAULT_CATEGORY_ID.to_string(),
        price: product.price,
        currency_id: DEFAULT_CURRENCY_ID.to_string(),
        available_quantity: product.stock,
        buying_mode: "buy_it_now".to_string(),
        listing_type_id: "bronze".to_string(),
        condition: "new".to_string(),
        description: ItemDescription { plain_text: description },
        pictures: vec![ItemPicture {
            source: format!(
                "https://via.placeholder.com/500x500?text={}",
                urlencoding::encode(&product.name)
            ),
        }],
        attributes: vec![
            ItemAttribute { id: "BRAND".to_string(), value_name: "Genérico".to_string() },
            ItemAttribute { id: "MODEL".to_string(), value_name: product.sku.clone() },
        ],
        tags: vec!["immediate_payment".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use stockline_domain::{
        MarketplaceConfig, MarketplaceToken, RemoteAuthTokens, RemoteItem, RemoteUserInfo,
        StocklineError,
    };

    use super::*;
    use crate::auth::ports::TokenStore;

    #[derive(Default)]
    struct MemoryTokenStore {
        records: StdMutex<HashMap<String, MarketplaceToken>>,
    }

    #[async_trait]
    impl TokenStore for MemoryTokenStore {
        async fn get(&self, token_id: &str) -> Result<Option<MarketplaceToken>> {
            Ok(self.records.lock().unwrap().get(token_id).cloned())
        }

        async fn find_for_user(&self, user_id: &str) -> Result<Option<MarketplaceToken>> {
            Ok(self.records.lock().unwrap().values().find(|t| t.user_id == user_id).cloned())
        }

        async fn find_active_for_user(&self, user_id: &str) -> Result<Option<MarketplaceToken>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .find(|t| t.user_id == user_id && t.is_active)
                .cloned())
        }

        async fn list_active(&self) -> Result<Vec<MarketplaceToken>> {
            Ok(self.records.lock().unwrap().values().filter(|t| t.is_active).cloned().collect())
        }

        async fn upsert(&self, token: &MarketplaceToken) -> Result<()> {
            self.records.lock().unwrap().insert(token.id.clone(), token.clone());
            Ok(())
        }
    }

    /// Product store that tracks remote-id write-backs.
    #[derive(Default)]
    struct MemoryProductStore {
        records: StdMutex<HashMap<String, Product>>,
    }

    impl MemoryProductStore {
        fn insert(&self, product: Product) {
            self.records.lock().unwrap().insert(product.id.clone(), product);
        }

        fn remote_id_of(&self, product_id: &str) -> Option<String> {
            self.records
                .lock()
                .unwrap()
                .get(product_id)
                .and_then(|p| p.remote_item_id.clone())
        }
    }

    #[async_trait]
    impl ProductRepository for MemoryProductStore {
        async fn find_one(&self, product_id: &str, user_id: &str) -> Result<Product> {
            let records = self.records.lock().unwrap();
            let product = records.get(product_id).ok_or_else(|| {
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
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect();
            products.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(products)
        }

        async fn attach_remote_id(
            &self,
            product_id: &str,
            user_id: &str,
            remote_item_id: &str,
        ) -> Result<()> {
            let mut records = self.records.lock().unwrap();
            let product = records.get_mut(product_id).ok_or_else(|| {
                StocklineError::NotFound(format!("product {product_id} does not exist"))
            })?;
            if product.user_id != user_id {
                return Err(StocklineError::Forbidden(format!(
                    "product {product_id} belongs to another user"
                )));
            }
            if product.remote_item_id.is_none() {
                product.remote_item_id = Some(remote_item_id.to_string());
                product.updated_at = Utc::now();
            }
            Ok(())
        }
    }

    /// Marketplace stub with per-sku create failures.
    #[derive(Default)]
    struct MockMarketplace {
        create_calls: AtomicUsize,
        update_calls: AtomicUsize,
        fail_create_titles: Vec<String>,
        fail_update: bool,
    }

    #[async_trait]
    impl MarketplaceApi for MockMarketplace {
        async fn exchange_code(&self, _code: &str) -> Result<RemoteAuthTokens> {
            Err(StocklineError::Internal("not exercised".to_string()))
        }

        async fn refresh_grant(&self, _refresh_token: &str) -> Result<RemoteAuthTokens> {
            Err(StocklineError::RemoteApi("refresh rejected".to_string()))
        }

        async fn fetch_user_info(&self, _access_token: &str) -> Result<RemoteUserInfo> {
            Err(StocklineError::Internal("not exercised".to_string()))
        }

        async fn list_active_item_ids(
            &self,
            _access_token: &str,
            _remote_user_id: &str,
        ) -> Result<Vec<String>> {
            Err(StocklineError::Internal("not exercised".to_string()))
        }

        async fn fetch_items_batch(
            &self,
            _access_token: &str,
            _ids: &[String],
        ) -> Result<Vec<RemoteItem>> {
            Err(StocklineError::Internal("not exercised".to_string()))
        }

        async fn create_item(
            &self,
            _access_token: &str,
            payload: &NewItemPayload,
        ) -> Result<String> {
            let call = self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_create_titles.contains(&payload.title) {
                return Err(StocklineError::RemoteApi(
                    "item create failed with status 400: invalid price".to_string(),
                ));
            }
            Ok(format!("MLA{:09}", call + 1))
        }

        async fn update_item(
            &self,
            _access_token: &str,
            _item_id: &str,
            _update: &ItemUpdate,
        ) -> Result<()> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_update {
                return Err(StocklineError::RemoteApi(
                    "item update failed with status 400: item paused".to_string(),
                ));
            }
            Ok(())
        }
    }

    fn product(id: &str, user_id: &str, remote_item_id: Option<&str>, sync_enabled: bool) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            user_id: user_id.to_string(),
            sku: format!("SKU-{id}"),
            name: format!("Product {id}"),
            description: None,
            price: 1500.0,
            stock: 10,
            remote_item_id: remote_item_id.map(str::to_string),
            sync_enabled,
            created_at: now,
            updated_at: now,
        }
    }

    struct Harness {
        engine: SyncEngine,
        products: Arc<MemoryProductStore>,
        marketplace: Arc<MockMarketplace>,
    }

    fn harness(marketplace: MockMarketplace) -> Harness {
        let token_store = Arc::new(MemoryTokenStore::default());
        let now = Utc::now();
        token_store.records.lock().unwrap().insert(
            "tok-1".to_string(),
            MarketplaceToken {
                id: "tok-1".to_string(),
                user_id: "user-1".to_string(),
                remote_user_id: "123456789".to_string(),
                access_token: "APP_USR-access".to_string(),
                refresh_token: "TG-refresh".to_string(),
                expires_at: now + Duration::hours(6),
                is_active: true,
                scopes: vec!["read".to_string(), "write".to_string()],
                created_at: now,
                updated_at: now,
                last_refresh_at: None,
            },
        );

        let marketplace = Arc::new(marketplace);
        let products = Arc::new(MemoryProductStore::default());
        let lifecycle = Arc::new(TokenLifecycleManager::new(
            marketplace.clone(),
            token_store,
            MarketplaceConfig::new(
                "client".to_string(),
                "secret".to_string(),
                "http://localhost/callback".to_string(),
                "state-secret".to_string(),
            ),
        ));
        let engine = SyncEngine::new(lifecycle, marketplace.clone(), products.clone());

        Harness { engine, products, marketplace }
    }

    #[tokio::test]
    async fn fails_whole_operation_without_connection() {
        let h = harness(MockMarketplace::default());

        let err = h.engine.sync_products("user-2", None, false).await.unwrap_err();
        assert!(matches!(err, StocklineError::NotConnected(_)));
    }

    #[tokio::test]
    async fn creates_and_updates_by_remote_id_presence() {
        let h = harness(MockMarketplace::default());
        h.products.insert(product("p1", "user-1", None, true));
        h.products.insert(product("p2", "user-1", Some("MLA000000042"), true));

        let results = h
            .engine
            .sync_products("user-1", Some(vec!["p1".to_string(), "p2".to_string()]), false)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].action, SyncAction::Created);
        assert!(results[0].success);
        assert_eq!(results[1].action, SyncAction::Updated);
        assert_eq!(results[1].remote_item_id.as_deref(), Some("MLA000000042"));

        // The assigned remote id was written back to the local record
        assert_eq!(h.products.remote_id_of("p1"), results[0].remote_item_id);
    }

    #[tokio::test]
    async fn unresolvable_ids_become_error_results_in_place() {
        let h = harness(MockMarketplace::default());
        h.products.insert(product("p1", "user-1", None, true));
        h.products.insert(product("p3", "user-2", None, true));

        let results = h
            .engine
            .sync_products(
                "user-1",
                Some(vec!["missing".to_string(), "p1".to_string(), "p3".to_string()]),
                false,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].action, SyncAction::Error);
        assert_eq!(results[0].local_product_id, "missing");
        assert_eq!(results[1].action, SyncAction::Created);
        // p3 belongs to another user
        assert_eq!(results[2].action, SyncAction::Error);

        let successful = results.iter().filter(|r| r.success).count();
        let errors = results.len() - successful;
        assert_eq!(successful, 1);
        assert_eq!(errors, 2);
    }

    #[tokio::test]
    async fn without_ids_only_sync_enabled_products_are_taken() {
        let h = harness(MockMarketplace::default());
        h.products.insert(product("p1", "user-1", None, true));
        h.products.insert(product("p2", "user-1", None, false));
        h.products.insert(product("p3", "user-1", Some("MLA000000007"), true));

        let results = h.engine.sync_products("user-1", None, false).await.unwrap();

        assert_eq!(results.len(), 2);
        let ids: Vec<&str> = results.iter().map(|r| r.local_product_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[tokio::test]
    async fn create_failure_is_isolated_and_leaves_remote_id_unset() {
        let h = harness(MockMarketplace {
            fail_create_titles: vec!["Product p1".to_string()],
            ..MockMarketplace::default()
        });
        h.products.insert(product("p1", "user-1", None, true));
        h.products.insert(product("p2", "user-1", None, true));

        let results = h
            .engine
            .sync_products("user-1", Some(vec!["p1".to_string(), "p2".to_string()]), false)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert_eq!(results[0].action, SyncAction::Error);
        assert!(results[0].error.as_deref().unwrap_or_default().contains("invalid price"));
        assert_eq!(h.products.remote_id_of("p1"), None);

        // The failure did not block the rest of the batch
        assert!(results[1].success);
        assert_eq!(results[1].action, SyncAction::Created);
    }

    #[tokio::test]
    async fn second_run_only_updates() {
        let h = harness(MockMarketplace::default());
        h.products.insert(product("p1", "user-1", None, true));
        h.products.insert(product("p2", "user-1", None, true));

        let first = h.engine.sync_products("user-1", None, false).await.unwrap();
        assert!(first.iter().all(|r| r.action == SyncAction::Created));

        let second = h.engine.sync_products("user-1", None, false).await.unwrap();
        assert_eq!(second.len(), 2);
        assert!(second.iter().all(|r| r.action == SyncAction::Updated));
        assert_eq!(h.marketplace.create_calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.marketplace.update_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn results_preserve_input_order_under_concurrency() {
        let h = harness(MockMarketplace::default());
        let ids: Vec<String> = (0..16).map(|i| format!("p{i:02}")).collect();
        for id in &ids {
            h.products.insert(product(id, "user-1", None, true));
        }

        let results = h
            .engine
            .sync_products("user-1", Some(ids.clone()), false)
            .await
            .unwrap();

        let out: Vec<&str> = results.iter().map(|r| r.local_product_id.as_str()).collect();
        assert_eq!(out, ids.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn force_sync_flag_changes_no_branching() {
        let h = harness(MockMarketplace::default());
        h.products.insert(product("p1", "user-1", Some("MLA000000042"), true));

        let plain = h.engine.sync_products("user-1", None, false).await.unwrap();
        let forced = h.engine.sync_products("user-1", None, true).await.unwrap();

        assert_eq!(plain.len(), forced.len());
        assert_eq!(plain[0].action, forced[0].action);
    }

    #[test]
    fn item_payload_carries_catalog_defaults() {
        let payload = build_item_payload(&product("p1", "user-1", None, true));

        assert_eq!(payload.category_id, DEFAULT_CATEGORY_ID);
        assert_eq!(payload.currency_id, DEFAULT_CURRENCY_ID);
        assert_eq!(payload.condition, "new");
        assert_eq!(payload.listing_type_id, "bronze");
        assert_eq!(payload.available_quantity, 10);
        assert_eq!(payload.attributes[1].value_name, "SKU-p1");
        assert!(payload.pictures[0].source.contains("Product%20p1"));
        assert_eq!(payload.tags, vec!["immediate_payment"]);
    }

    #[test]
    fn item_payload_falls_back_to_generated_description() {
        let payload = build_item_payload(&product("p1", "user-1", None, true));
        assert_eq!(payload.description.plain_text, "Product p1 - available in stock");
    }
}
