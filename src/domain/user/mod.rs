//! User domain
//!
//! User management lives outside the gateway. The authentication path only
//! needs to know whether a token's owner is still allowed in.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Lookup of user activation state
#[async_trait]
pub trait UserStore: Send + Sync + Debug {
    /// Whether the given user exists and is active
    async fn is_active(&self, user_id: &str) -> Result<bool, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock user store for testing
    #[derive(Debug, Default)]
    pub struct MockUserStore {
        users: Arc<RwLock<HashMap<String, bool>>>,
    }

    impl MockUserStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn add(&self, user_id: impl Into<String>, active: bool) {
            self.users.write().await.insert(user_id.into(), active);
        }
    }

    #[async_trait]
    impl UserStore for MockUserStore {
        async fn is_active(&self, user_id: &str) -> Result<bool, DomainError> {
            let users = self.users.read().await;
            Ok(users.get(user_id).copied().unwrap_or(false))
        }
    }
}
