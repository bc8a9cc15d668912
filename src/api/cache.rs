//! Short-TTL response cache
//!
//! Best-effort memoization keyed by normalized operation signature. Entries
//! are tagged with their entity type so a successful mutation can evict every
//! cached read for that entity. Expired entries are dropped lazily on the
//! next lookup; any trouble with the cache degrades to a live fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::debug;
use serde_json::Value;

use super::query::EntityType;

/// Cache tuning supplied at client construction
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    entity: EntityType,
    expires_at: Instant,
}

/// Process-wide query cache shared by all clones of a client
#[derive(Debug, Clone)]
pub struct QueryCache {
    inner: Arc<Mutex<HashMap<String, CacheEntry>>>,
    config: CacheConfig,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Fetch a live entry, evicting it first if its TTL has passed.
    pub fn get(&self, signature: &str) -> Option<Value> {
        if !self.config.enabled {
            return None;
        }

        let mut inner = self.inner.lock().ok()?;
        match inner.get(signature) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.payload.clone()),
            Some(_) => {
                inner.remove(signature);
                None
            }
            None => None,
        }
    }

    /// Store a payload. The entry is built completely before it becomes
    /// visible, so readers can never observe a partial write.
    pub fn put(&self, signature: String, entity: EntityType, payload: Value) {
        if !self.config.enabled {
            return;
        }

        let entry = CacheEntry {
            payload,
            entity,
            expires_at: Instant::now() + self.config.ttl,
        };

        if let Ok(mut inner) = self.inner.lock() {
            inner.insert(signature, entry);
        }
    }

    /// Drop every entry tagged with the given entity type.
    pub fn invalidate(&self, entity: EntityType) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        let before = inner.len();
        inner.retain(|_, entry| entry.entity != entity);
        let evicted = before - inner.len();
        if evicted > 0 {
            debug!("Cache: invalidated {} entries for {:?}", evicted, entity);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache(ttl: Duration) -> QueryCache {
        QueryCache::new(CacheConfig { enabled: true, ttl })
    }

    #[test]
    fn test_put_then_get() {
        let cache = cache(Duration::from_secs(60));
        cache.put("sig".to_string(), EntityType::Ticket, json!({"a": 1}));

        assert_eq!(cache.get("sig"), Some(json!({"a": 1})));
        assert_eq!(cache.get("other"), None);
    }

    #[test]
    fn test_expired_entries_are_evicted_on_lookup() {
        let cache = cache(Duration::ZERO);
        cache.put("sig".to_string(), EntityType::Ticket, json!(1));

        assert_eq!(cache.get("sig"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_is_scoped_to_entity() {
        let cache = cache(Duration::from_secs(60));
        cache.put("t1".to_string(), EntityType::Ticket, json!(1));
        cache.put("t2".to_string(), EntityType::Ticket, json!(2));
        cache.put("c1".to_string(), EntityType::Client, json!(3));

        cache.invalidate(EntityType::Ticket);

        assert_eq!(cache.get("t1"), None);
        assert_eq!(cache.get("t2"), None);
        assert_eq!(cache.get("c1"), Some(json!(3)));
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = QueryCache::new(CacheConfig {
            enabled: false,
            ttl: Duration::from_secs(60),
        });
        cache.put("sig".to_string(), EntityType::Asset, json!(1));
        assert_eq!(cache.get("sig"), None);
        assert!(cache.is_empty());
    }
}
