//! Key-value cache seam used for best-effort mirroring of derived values.
//!
//! Backends report failures as [`CacheError`]; callers treat every error as a
//! miss and carry on.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::error::CacheError;

/// A shared key-value cache with per-entry time-to-live.
pub trait KvCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Cache that never holds anything. Used when no backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl KvCache for NullCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

/// In-process cache with lazy expiry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CacheError::Backend(format!("lock poisoned: {e}")))?;
        Ok(entries
            .get(key)
            .filter(|(_, expires)| Instant::now() < *expires)
            .map(|(value, _)| value.clone()))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Backend(format!("lock poisoned: {e}")))?;
        let now = Instant::now();
        entries.retain(|_, (_, expires)| now < *expires);
        entries.insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_cache_always_misses() {
        let cache = NullCache;
        cache.set("k", "v", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get("k").unwrap(), None);
    }

    #[test]
    fn memory_cache_stores_until_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(cache.get("other").unwrap(), None);
    }

    #[test]
    fn memory_cache_expires_entries() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::ZERO).unwrap();
        assert_eq!(cache.get("k").unwrap(), None);
        cache.set("k2", "v", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.len(), 1);
    }
}
