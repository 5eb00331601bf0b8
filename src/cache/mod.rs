//! Caching of backend responses
//!
//! Quota-limited backends keep recently served pages here so that repeated
//! queries do not spend credentials.

use crate::backends::RequestParams;
use crate::results::SearchResult;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Cache of one backend's result pages
#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<String, Arc<Vec<SearchResult>>>,
}

impl ResponseCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    /// Get a cached page
    pub async fn get(&self, key: &str) -> Option<Arc<Vec<SearchResult>>> {
        self.cache.get(key).await
    }

    /// Store a page
    pub async fn set(&self, key: String, value: Vec<SearchResult>) {
        self.cache.insert(key, Arc::new(value)).await;
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(3600, 1000) // 1 hour TTL, 1k pages
    }
}

/// Generate a cache key for a backend call
pub fn query_cache_key(backend: &str, params: &RequestParams, num: usize) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(backend.as_bytes());
    hasher.update([0]);
    hasher.update(params.query.as_bytes());
    hasher.update([0]);
    hasher.update(params.kind.as_str().as_bytes());
    hasher.update(params.offset.to_le_bytes());
    hasher.update((num as u64).to_le_bytes());

    format!("{:x}", hasher.finalize())
}
