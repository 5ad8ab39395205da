//! In-memory token store.

use async_trait::async_trait;
use dashmap::DashMap;
use stockline_core::TokenStore;
use stockline_domain::{MarketplaceToken, Result};

/// Keyed in-memory table of token records, one per local user.
///
/// Upsert-only; deactivated tokens are kept for audit history.
#[derive(Default)]
pub struct InMemoryTokenStore {
    records: DashMap<String, MarketplaceToken>,
}

impl InMemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, token_id: &str) -> Result<Option<MarketplaceToken>> {
        Ok(self.records.get(token_id).map(|entry| entry.value().clone()))
    }

    async fn find_for_user(&self, user_id: &str) -> Result<Option<MarketplaceToken>> {
        Ok(self
            .records
            .iter()
            .find(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_active_for_user(&self, user_id: &str) -> Result<Option<MarketplaceToken>> {
        Ok(self
            .records
            .iter()
            .find(|entry| entry.user_id == user_id && entry.is_active)
            .map(|entry| entry.value().clone()))
    }

    async fn list_active(&self) -> Result<Vec<MarketplaceToken>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.is_active)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn upsert(&self, token: &MarketplaceToken) -> Result<()> {
        self.records.insert(token.id.clone(), token.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn token(id: &str, user_id: &str, is_active: bool) -> MarketplaceToken {
        let now = Utc::now();
        MarketplaceToken {
            id: id.to_string(),
            user_id: user_id.to_string(),
            remote_user_id: "123456789".to_string(),
            access_token: "APP_USR-access".to_string(),
            refresh_token: "TG-refresh".to_string(),
            expires_at: now + Duration::hours(6),
            is_active,
            scopes: vec!["read".to_string()],
            created_at: now,
            updated_at: now,
            last_refresh_at: None,
        }
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let store = InMemoryTokenStore::new();
        store.upsert(&token("tok-1", "user-1", true)).await.unwrap();

        let found = store.get("tok-1").await.unwrap().unwrap();
        assert_eq!(found.user_id, "user-1");
        assert!(store.get("tok-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_active_ignores_deactivated_records() {
        let store = InMemoryTokenStore::new();
        store.upsert(&token("tok-1", "user-1", false)).await.unwrap();

        assert!(store.find_active_for_user("user-1").await.unwrap().is_none());
        // But the record itself is still reachable
        assert!(store.find_for_user("user-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_active_filters_by_flag() {
        let store = InMemoryTokenStore::new();
        store.upsert(&token("tok-1", "user-1", true)).await.unwrap();
        store.upsert(&token("tok-2", "user-2", false)).await.unwrap();
        store.upsert(&token("tok-3", "user-3", true)).await.unwrap();

        let active = store.list_active().await.unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|t| t.is_active));
    }

    #[tokio::test]
    async fn upsert_overwrites_in_place() {
        let store = InMemoryTokenStore::new();
        store.upsert(&token("tok-1", "user-1", true)).await.unwrap();

        let mut updated = token("tok-1", "user-1", true);
        updated.access_token = "APP_USR-rotated".to_string();
        store.upsert(&updated).await.unwrap();

        assert_eq!(store.len(), 1);
        let found = store.get("tok-1").await.unwrap().unwrap();
        assert_eq!(found.access_token, "APP_USR-rotated");
    }
}
