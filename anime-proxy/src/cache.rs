use crate::upstream::Payload;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Upstream response stored under its endpoint key
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub payload: Payload,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            stored_at: Utc::now(),
        }
    }

    /// Fresh while `now - stored_at < ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        Utc::now() - self.stored_at < ttl
    }
}

/// In-memory response cache keyed by endpoint key.
///
/// Staleness is only ever evaluated on read. Stale entries stay in the map
/// until the same key is written again or the cache is cleared.
pub struct CacheStore {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Raw entry regardless of freshness
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Payload if a fresh entry exists for `key`
    pub fn get_fresh(&self, key: &str) -> Option<Payload> {
        match self.entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => {
                log::debug!("Cache hit for key: {}", key);
                Some(entry.payload.clone())
            }
            Some(_) => {
                log::debug!("Cache entry stale for key: {}", key);
                None
            }
            None => {
                log::debug!("Cache miss for key: {}", key);
                None
            }
        }
    }

    /// Overwrite the entry for `key`, stamping the current time
    pub fn put(&self, key: &str, payload: Payload) {
        self.entries.insert(key.to_owned(), CacheEntry::new(payload));
        log::debug!("Stored in cache with key: {}", key);
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        self.entries.clear();
        log::info!("Cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let total_entries = self.entries.len();
        let stale_entries = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_fresh(self.ttl))
            .count();

        CacheStats {
            total_entries,
            fresh_entries: total_entries.saturating_sub(stale_entries),
            stale_entries,
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_entry(&self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_owned(), entry);
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub stale_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_entry_freshness() {
        let entry = CacheEntry::new(Arc::new(json!({ "data": [] })));
        assert!(entry.is_fresh(Duration::minutes(5)));

        let stale = CacheEntry {
            payload: Arc::new(json!({ "data": [] })),
            stored_at: Utc::now() - Duration::minutes(6),
        };
        assert!(!stale.is_fresh(Duration::minutes(5)));
    }

    #[test]
    fn test_stale_entry_is_kept_but_not_served() {
        let cache = CacheStore::new(Duration::minutes(5));
        cache.insert_entry(
            "/anime/1/full",
            CacheEntry {
                payload: Arc::new(json!({ "id": 1 })),
                stored_at: Utc::now() - Duration::minutes(10),
            },
        );

        assert!(cache.get_fresh("/anime/1/full").is_none());
        assert!(cache.get("/anime/1/full").is_some());
        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 1,
                fresh_entries: 0,
                stale_entries: 1,
            }
        );
    }

    #[test]
    fn test_put_overwrites() {
        let cache = CacheStore::new(Duration::minutes(5));
        cache.put("/seasons/now?limit=24", Arc::new(json!({ "v": 1 })));
        cache.put("/seasons/now?limit=24", Arc::new(json!({ "v": 2 })));

        let payload = cache.get_fresh("/seasons/now?limit=24").unwrap();
        assert_eq!(*payload, json!({ "v": 2 }));
        assert_eq!(cache.stats().total_entries, 1);

        cache.clear();
        assert!(cache.get("/seasons/now?limit=24").is_none());
    }
}
