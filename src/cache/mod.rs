//! Process-local TTL cache for paginated vendor listings.
//!
//! Keys follow `products:{vendor_id}:{page}:{limit}`; any mutation for a
//! vendor invalidates every page through `delete_prefix`. The cache is local
//! to one process instance and provides no cross-instance coherence.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() > expires_at,
            None => false,
        }
    }
}

#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    /// Remove every entry whose key starts with `prefix`. Used to drop all
    /// cached listing pages for one vendor after a mutation.
    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError>;
    async fn clear(&self) -> Result<(), CacheError>;
}

/// In-memory cache implementation
#[derive(Debug, Clone)]
pub struct InMemoryCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
    capacity: usize,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    fn locked(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned lock means a writer panicked mid-insert; the map itself
        // is still structurally sound for this access pattern.
        self.store.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let expired = {
            let store = self.store.read().unwrap_or_else(|e| e.into_inner());
            match store.get(key) {
                Some(entry) if entry.is_expired() => true,
                Some(entry) => return Ok(Some(entry.value.clone())),
                None => return Ok(None),
            }
        };

        if expired {
            self.locked().remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self.locked();
        if store.len() >= self.capacity && !store.contains_key(key) {
            // Evict expired entries first; if the cache is still full the
            // new entry simply replaces nothing and is dropped.
            store.retain(|_, entry| !entry.is_expired());
            if store.len() >= self.capacity {
                return Ok(());
            }
        }
        store.insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.locked().remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        self.locked().retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.locked().clear();
        Ok(())
    }
}

/// Cache key for one page of a vendor's product listing.
pub fn listing_key(vendor_id: uuid::Uuid, page: u64, limit: u64) -> String {
    format!("products:{}:{}:{}", vendor_id, page, limit)
}

/// Key prefix covering every cached listing page for a vendor.
pub fn listing_prefix(vendor_id: uuid::Uuid) -> String {
    format!("products:{}:", vendor_id)
}
