//! Search-result caching.
//!
//! Repeat queries within one process hit the external providers once.
//! This is a collaborator-side concern like connection pooling: run
//! state (transcript, usage) is never cached.

use moka::future::Cache;
use std::time::Duration;

use claimcheck_core::Capability;

use super::SearchHit;

/// TTL-bounded cache keyed by `(capability, query)`.
pub struct SearchCache {
    cache: Cache<(Capability, String), Vec<SearchHit>>,
}

impl SearchCache {
    /// Create a cache with the given capacity and time-to-live.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Get cached hits for a query.
    pub async fn get(&self, capability: Capability, query: &str) -> Option<Vec<SearchHit>> {
        self.cache.get(&(capability, query.to_string())).await
    }

    /// Store hits for a query.
    pub async fn insert(&self, capability: Capability, query: &str, hits: Vec<SearchHit>) {
        self.cache.insert((capability, query.to_string()), hits).await;
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Number of cached entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(1_000, Duration::from_secs(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_operations() {
        let cache = SearchCache::default();

        // Cache miss
        assert!(cache.get(Capability::Web, "acme").await.is_none());

        // Insert
        let hits = vec![SearchHit::new("A", "https://example.com/a")];
        cache.insert(Capability::Web, "acme", hits.clone()).await;

        // Cache hit
        let cached = cache.get(Capability::Web, "acme").await;
        assert_eq!(cached, Some(hits));

        // Capabilities key separately
        assert!(cache.get(Capability::News, "acme").await.is_none());
    }
}
