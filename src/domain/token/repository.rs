//! Token store trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::TokenRecord;
use crate::domain::DomainError;

/// Storage of issued token records, keyed by content hash
#[async_trait]
pub trait TokenStore: Send + Sync + Debug {
    /// Look up a record by its content hash
    async fn find_by_hash(&self, hash: &str) -> Result<Option<TokenRecord>, DomainError>;

    /// Persist a freshly issued record
    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, DomainError>;

    /// Revoke a record; returns false when no record matches the hash
    async fn revoke(&self, hash: &str) -> Result<bool, DomainError>;
}
