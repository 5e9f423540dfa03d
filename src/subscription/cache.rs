//! Key-value cache collaborator.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::error::ServiceResult;

/// String-keyed cache with optional per-entry expiry.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> ServiceResult<Option<String>>;

    /// Store `value`; `ttl = None` keeps it until deleted.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> ServiceResult<()>;

    /// Returns whether a live entry was removed.
    async fn del(&self, key: &str) -> ServiceResult<bool>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process cache. Expired entries are dropped lazily on access.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// No entries stored, counting expired ones not yet evicted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> ServiceResult<Option<String>> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        self.entries.remove_if(key, |_, e| !e.is_live(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> ServiceResult<()> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries.insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn del(&self, key: &str) -> ServiceResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires() {
        let cache = MemoryCache::new();
        cache
            .set("subscription:1", "{}".into(), Some(Duration::from_secs(3600)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert_eq!(cache.get("subscription:1").await.unwrap().as_deref(), Some("{}"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("subscription:1").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_set_without_ttl_and_delete() {
        let cache = MemoryCache::new();
        cache.set("user:abc", "ann".into(), None).await.unwrap();
        assert_eq!(cache.get("user:abc").await.unwrap().as_deref(), Some("ann"));

        assert!(cache.del("user:abc").await.unwrap());
        assert!(!cache.del("user:abc").await.unwrap());
        assert_eq!(cache.get("user:abc").await.unwrap(), None);
    }
}
