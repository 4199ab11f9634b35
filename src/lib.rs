//! AI Vendor Gateway
//!
//! One authenticated API surface over several independent AI vendors:
//! - Compact bearer-token authentication
//! - Vendor credentials encrypted at rest (AES-256-GCM)
//! - Per-vendor TTL caching of model catalogs
//! - Buffered and streaming completion dispatch

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use api::state::AppState;
use domain::token::repository::TokenStore;
use domain::token::TokenRecord;
use domain::vendor::VendorConfig;
use infrastructure::auth::{far_future_expiry, TokenConfig, TokenService};
use infrastructure::cache::ModelCatalogCache;
use infrastructure::encryption::CredentialEncryption;
use infrastructure::storage::{InMemoryTokenStore, InMemoryUserStore, InMemoryVendorDirectory};
use infrastructure::vendor::{CatalogService, ProxyService, RetryPolicy, VendorHttpClient};

/// Owner recorded for seeded tokens on a standalone gateway
const STANDALONE_OWNER: &str = "admin";

/// Build the application state for a standalone gateway.
///
/// Every service is constructed and owned here; nothing is global, so
/// multiple isolated gateways can live in one process.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let encryption = Arc::new(CredentialEncryption::new(&config.auth.encryption_key));
    let http = VendorHttpClient::new(RetryPolicy::new(config.vendors.max_attempts));

    let directory = Arc::new(InMemoryVendorDirectory::new());
    if let Some(path) = &config.vendors.config_file {
        seed_vendors(&directory, path).await?;
    }

    let token_store = Arc::new(InMemoryTokenStore::new());
    let user_store = Arc::new(InMemoryUserStore::new());
    user_store.upsert(STANDALONE_OWNER, true).await;

    for hash in &config.auth.seed_token_hashes {
        token_store
            .create(TokenRecord::new(
                "seeded",
                hash,
                STANDALONE_OWNER,
                far_future_expiry(),
            ))
            .await?;
        info!("Seeded token record for hash {}...", &hash[..16.min(hash.len())]);
    }

    let token_service = Arc::new(TokenService::new(
        TokenConfig::new(&config.auth.secret_key),
        token_store,
        user_store,
    ));

    let catalog_service = Arc::new(CatalogService::new(
        directory.clone(),
        encryption.clone(),
        ModelCatalogCache::new(Duration::from_secs(config.vendors.models_cache_ttl_secs)),
        http.clone(),
        Duration::from_secs(config.vendors.timeout_secs),
    ));

    let proxy_service = Arc::new(ProxyService::new(
        directory,
        encryption,
        http,
        Duration::from_secs(config.vendors.timeout_secs),
        Duration::from_secs(config.vendors.stream_timeout_secs),
    ));

    Ok(AppState::new(token_service, catalog_service, proxy_service))
}

/// Load vendor definitions from a JSON file into the directory
async fn seed_vendors(directory: &InMemoryVendorDirectory, path: &str) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path).await?;
    let vendors: Vec<VendorConfig> = serde_json::from_str(&raw)?;

    if vendors.is_empty() {
        warn!("Vendor config file '{}' contains no vendors", path);
    }

    for vendor in vendors {
        info!("Loaded vendor '{}'", vendor.slug());
        directory.upsert(vendor).await;
    }

    Ok(())
}
