//! API token record entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted record backing an issued API token.
///
/// Only the content hash is stored, never the token itself. After issuance
/// the record is mutated only to toggle `is_active` (revocation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Opaque subject identifier embedded in the token
    subject_id: String,

    /// SHA-512 hash of the subject identifier (lookup key)
    content_hash: String,

    /// Whether the token is accepted for authentication
    is_active: bool,

    /// Owning user
    owner_user_id: String,

    /// Expiration instant (far future when issued without one)
    expires_at: DateTime<Utc>,

    created_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn new(
        subject_id: impl Into<String>,
        content_hash: impl Into<String>,
        owner_user_id: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            content_hash: content_hash.into(),
            is_active: true,
            owner_user_id: owner_user_id.into(),
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn owner_user_id(&self) -> &str {
        &self.owner_user_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Revoke the token. Revocation is the only mutation after issuance.
    pub fn revoke(&mut self) {
        self.is_active = false;
    }
}
