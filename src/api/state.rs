//! Application state for shared services
//!
//! Services are explicitly constructed and owned, then shared through the
//! state via dynamic dispatch. Nothing here is a global: several isolated
//! gateways can coexist in one process, which is what hermetic tests do.

use std::sync::Arc;

use reqwest::header::HeaderMap;

use crate::domain::token::TokenStore;
use crate::domain::user::UserStore;
use crate::domain::{AiModel, DomainError};
use crate::infrastructure::auth::TokenService;
use crate::infrastructure::vendor::{CatalogService, CompletionCall, ProxyService, UpstreamReply};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub token_service: Arc<dyn TokenVerifier>,
    pub catalog_service: Arc<dyn ModelCatalog>,
    pub proxy_service: Arc<dyn CompletionProxy>,
}

impl AppState {
    pub fn new(
        token_service: Arc<dyn TokenVerifier>,
        catalog_service: Arc<dyn ModelCatalog>,
        proxy_service: Arc<dyn CompletionProxy>,
    ) -> Self {
        Self {
            token_service,
            catalog_service,
            proxy_service,
        }
    }
}

/// Trait for bearer token verification
#[async_trait::async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a presented token and return its subject id
    async fn verify(&self, token: &str) -> Result<String, DomainError>;
}

/// Trait for the aggregated model catalog
#[async_trait::async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(&self, force_refresh: bool) -> Result<Vec<AiModel>, DomainError>;
}

/// Trait for completion dispatch operations
#[async_trait::async_trait]
pub trait CompletionProxy: Send + Sync {
    async fn dispatch_completion(&self, call: CompletionCall)
        -> Result<UpstreamReply, DomainError>;

    async fn cancel_completion(
        &self,
        completion_id: &str,
        model: &str,
        headers: &HeaderMap,
    ) -> Result<UpstreamReply, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<T: TokenStore + 'static, U: UserStore + 'static> TokenVerifier for TokenService<T, U> {
    async fn verify(&self, token: &str) -> Result<String, DomainError> {
        TokenService::verify(self, token).await
    }
}

#[async_trait::async_trait]
impl ModelCatalog for CatalogService {
    async fn list_models(&self, force_refresh: bool) -> Result<Vec<AiModel>, DomainError> {
        CatalogService::list_models(self, force_refresh).await
    }
}

#[async_trait::async_trait]
impl CompletionProxy for ProxyService {
    async fn dispatch_completion(
        &self,
        call: CompletionCall,
    ) -> Result<UpstreamReply, DomainError> {
        ProxyService::dispatch_completion(self, call).await
    }

    async fn cancel_completion(
        &self,
        completion_id: &str,
        model: &str,
        headers: &HeaderMap,
    ) -> Result<UpstreamReply, DomainError> {
        ProxyService::cancel_completion(self, completion_id, model, headers).await
    }
}
