//! In-memory collaborator stores

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::token::{TokenRecord, TokenStore};
use crate::domain::user::UserStore;
use crate::domain::vendor::{VendorConfig, VendorDirectory};
use crate::domain::DomainError;

/// In-memory vendor directory.
///
/// Listing order is insertion order, which keeps catalog aggregation
/// deterministic.
#[derive(Debug, Default)]
pub struct InMemoryVendorDirectory {
    vendors: RwLock<Vec<VendorConfig>>,
}

impl InMemoryVendorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a vendor by slug
    pub async fn upsert(&self, vendor: VendorConfig) {
        let mut vendors = self.vendors.write().await;
        if let Some(existing) = vendors.iter_mut().find(|v| v.slug() == vendor.slug()) {
            *existing = vendor;
        } else {
            vendors.push(vendor);
        }
    }
}

#[async_trait]
impl VendorDirectory for InMemoryVendorDirectory {
    async fn list_active(&self) -> Result<Vec<VendorConfig>, DomainError> {
        let vendors = self.vendors.read().await;
        Ok(vendors.iter().filter(|v| v.is_active()).cloned().collect())
    }

    async fn get(&self, slug: &str) -> Result<Option<VendorConfig>, DomainError> {
        let vendors = self.vendors.read().await;
        Ok(vendors.iter().find(|v| v.slug() == slug).cloned())
    }
}

/// In-memory token store keyed by content hash
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    records: RwLock<HashMap<String, TokenRecord>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn find_by_hash(&self, hash: &str) -> Result<Option<TokenRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(hash).cloned())
    }

    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(record.content_hash()) {
            return Err(DomainError::storage(format!(
                "Token record with hash '{}' already exists",
                record.content_hash()
            )));
        }

        records.insert(record.content_hash().to_string(), record.clone());
        Ok(record)
    }

    async fn revoke(&self, hash: &str) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        match records.get_mut(hash) {
            Some(record) => {
                record.revoke();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory user activation flags
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, bool>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, user_id: impl Into<String>, active: bool) {
        self.users.write().await.insert(user_id.into(), active);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn is_active(&self, user_id: &str) -> Result<bool, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).copied().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_directory_upsert_replaces_by_slug() {
        let directory = InMemoryVendorDirectory::new();

        directory.upsert(VendorConfig::new("openai", "https://a", "blob-1")).await;
        directory.upsert(VendorConfig::new("openai", "https://b", "blob-2")).await;

        let vendor = directory.get("openai").await.unwrap().unwrap();
        assert_eq!(vendor.base_url(), "https://b");

        let active = directory.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_directory_preserves_insertion_order() {
        let directory = InMemoryVendorDirectory::new();

        directory.upsert(VendorConfig::new("openai", "https://a", "b")).await;
        directory.upsert(VendorConfig::new("anthropic", "https://b", "b")).await;
        directory.upsert(VendorConfig::new("mistral", "https://c", "b")).await;

        let slugs: Vec<String> = directory
            .list_active()
            .await
            .unwrap()
            .iter()
            .map(|v| v.slug().to_string())
            .collect();

        assert_eq!(slugs, vec!["openai", "anthropic", "mistral"]);
    }

    #[tokio::test]
    async fn test_token_store_duplicate_hash_rejected() {
        let store = InMemoryTokenStore::new();

        let record = TokenRecord::new("123abc", "hash-1", "user-1", Utc::now());
        store.create(record.clone()).await.unwrap();

        assert!(store.create(record).await.is_err());
    }

    #[tokio::test]
    async fn test_token_store_revoke() {
        let store = InMemoryTokenStore::new();
        let record = TokenRecord::new("123abc", "hash-1", "user-1", Utc::now());
        store.create(record).await.unwrap();

        assert!(store.revoke("hash-1").await.unwrap());
        let found = store.find_by_hash("hash-1").await.unwrap().unwrap();
        assert!(!found.is_active());
    }

    #[tokio::test]
    async fn test_user_store_unknown_user_is_inactive() {
        let store = InMemoryUserStore::new();
        assert!(!store.is_active("ghost").await.unwrap());

        store.upsert("user-1", true).await;
        assert!(store.is_active("user-1").await.unwrap());
    }
}
