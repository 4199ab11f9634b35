//! Per-vendor model catalog cache
//!
//! Thread-safe in-memory cache over moka with one TTL for all entries.
//! Expiry is lazy: a read past the TTL evicts the entry and reports a miss,
//! so a stale capability list is never returned. Keys (vendor slugs) are
//! independent of each other.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::AiModel;

const DEFAULT_MAX_VENDORS: u64 = 1_000;

/// Cached capability list for one vendor
#[derive(Debug, Clone)]
struct CatalogEntry {
    models: Arc<Vec<AiModel>>,
    inserted_at: Instant,
}

/// TTL cache of vendor model catalogs, keyed by vendor slug
#[derive(Debug, Clone)]
pub struct ModelCatalogCache {
    entries: MokaCache<String, CatalogEntry>,
    ttl: Duration,
}

impl ModelCatalogCache {
    pub fn new(ttl: Duration) -> Self {
        // moka's own TTL is a backstop slightly above ours; freshness is
        // decided by the entry timestamp so expiry stays lazy and exact.
        let entries = MokaCache::builder()
            .max_capacity(DEFAULT_MAX_VENDORS)
            .time_to_live(ttl + Duration::from_secs(60))
            .build();

        Self { entries, ttl }
    }

    /// Get the cached models for a vendor, evicting an expired entry
    pub async fn get(&self, vendor: &str) -> Option<Arc<Vec<AiModel>>> {
        let entry = self.entries.get(vendor).await?;

        if entry.inserted_at.elapsed() > self.ttl {
            self.entries.remove(vendor).await;
            debug!(vendor = %vendor, "Cache entry expired");
            return None;
        }

        debug!(vendor = %vendor, "Cache hit");
        Some(entry.models)
    }

    /// Replace a vendor's cached models
    pub async fn set(&self, vendor: &str, models: Vec<AiModel>) {
        let entry = CatalogEntry {
            models: Arc::new(models),
            inserted_at: Instant::now(),
        };

        self.entries.insert(vendor.to_string(), entry).await;
        debug!(vendor = %vendor, "Cache entry replaced");
    }

    /// Invalidate one vendor's entry, or every entry when `vendor` is None
    pub async fn invalidate(&self, vendor: Option<&str>) {
        match vendor {
            Some(vendor) => {
                self.entries.remove(vendor).await;
            }
            None => {
                self.entries.invalidate_all();
                self.entries.run_pending_tasks().await;
            }
        }
    }
}
