// ABOUTME: In-memory response cache with LRU eviction and TTL support
// ABOUTME: Stores serialized success bodies so repeat lookups skip the provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::body::Bytes;
use http::Method;
use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Cached response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// `Content-Type` of the original response
    pub content_type: String,
    /// Response body
    pub body: Bytes,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: CachedResponse,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Cache key for a JSON request: `"<METHOD> <path>:<canonical body>"`.
///
/// Object keys serialize in sorted order, so bodies that differ only in key
/// order share an entry.
#[must_use]
pub fn cache_key(method: &Method, path: &str, body: &Value) -> String {
    format!("{method} {path}:{body}")
}

/// In-memory response cache with LRU eviction
///
/// Uses `Arc<RwLock<LruCache>>` so clones share one store.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    ttl: Duration,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ResponseCache {
    /// Capacity used when zero is requested
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a cache holding at most `max_entries` responses for `ttl` each
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl,
        }
    }

    /// Entry lifetime
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh response for `key`, if any
    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        let now = Instant::now();
        let mut store = self.store.write().await;

        // LruCache::get is mutable (updates access order for LRU)
        let entry = store.get(key)?;
        if !entry.is_expired(now) {
            return Some(entry.response.clone());
        }
        store.pop(key);
        None
    }

    /// Store a response, evicting the least recently used entry when full
    pub async fn insert(&self, key: String, response: CachedResponse) {
        let entry = CacheEntry {
            response,
            expires_at: Instant::now() + self.ttl,
        };
        self.store.write().await.push(key, entry);
    }

    /// Number of stored entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the cache holds nothing
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Remove all expired entries
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;

        let expired_keys: Vec<String> = store
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired_keys {
            store.pop(key);
        }
        drop(store);

        if !expired_keys.is_empty() {
            tracing::debug!("Cleaned up {} expired cache entries", expired_keys.len());
        }
        expired_keys.len()
    }
}
