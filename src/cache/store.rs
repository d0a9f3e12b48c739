//! Cache storage port and the in-process backend.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use thiserror::Error;
use tokio::time::Instant;
use tracing::warn;

pub const CACHE_EVICT_TOTAL: &str = "parlance_cache_evict_total";

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache `{op}` timed out after {timeout:?}")]
    Timeout { op: &'static str, timeout: Duration },
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Live keys seen by a backend, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySample {
    pub total: u64,
    /// At most the requested number of keys, without any backend prefix.
    pub keys: Vec<String>,
}

impl KeySample {
    pub fn record(&mut self, key: &str, limit: usize) {
        self.total += 1;
        if self.keys.len() < limit {
            self.keys.push(key.to_string());
        }
    }
}

/// Key-value store with per-key TTL. Every call may fail.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Backend label reported by cache-info.
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;

    /// Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Count live keys and collect up to `limit` of them.
    async fn sample_keys(&self, limit: usize) -> Result<KeySample, CacheError>;
}

struct MemoryEntry {
    value: Bytes,
    expires_at: Instant,
}

/// LRU-bounded in-process cache. Expiry uses the tokio clock.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, MemoryEntry>>,
}

impl MemoryCacheStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self, op: &'static str) -> MutexGuard<'_, LruCache<String, MemoryEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    op,
                    target_module = SOURCE,
                    lock_kind = "mutex.lock",
                    result = "poisoned_recovered",
                    "Recovered from poisoned cache lock"
                );
                poisoned.into_inner()
            }
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut entries = self.lock("get");
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let entry = MemoryEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let evicted = self.lock("set").push(key.to_string(), entry);
        if let Some((evicted_key, _)) = evicted
            && evicted_key != key
        {
            counter!(CACHE_EVICT_TOTAL).increment(1);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.lock("delete").pop(key);
        Ok(())
    }

    async fn sample_keys(&self, limit: usize) -> Result<KeySample, CacheError> {
        let entries = self.lock("sample_keys");
        let now = Instant::now();
        let mut sample = KeySample::default();
        for (key, _) in entries.iter().filter(|(_, entry)| entry.expires_at > now) {
            sample.record(key, limit);
        }
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(capacity: usize) -> MemoryCacheStore {
        MemoryCacheStore::new(NonZeroUsize::new(capacity).expect("non-zero"))
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let store = store(4);
        store
            .set("note:1", Bytes::from_static(b"{}"), Duration::from_secs(300))
            .await
            .expect("set");

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(store.get("note:1").await.expect("get").is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get("note:1").await.expect("get").is_none());
        assert_eq!(store.sample_keys(10).await.expect("keys").total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn key_sample_skips_expired_entries_and_respects_limit() {
        let store = store(8);
        store
            .set("list", Bytes::from_static(b"[]"), Duration::from_secs(300))
            .await
            .expect("set");
        store
            .set("note:1", Bytes::from_static(b"{}"), Duration::from_secs(300))
            .await
            .expect("set");
        store
            .set("translation:1:de", Bytes::from_static(b"{}"), Duration::from_secs(3600))
            .await
            .expect("set");

        let sample = store.sample_keys(2).await.expect("keys");
        assert_eq!(sample.total, 3);
        assert_eq!(sample.keys.len(), 2);

        tokio::time::advance(Duration::from_secs(301)).await;
        let sample = store.sample_keys(10).await.expect("keys");
        assert_eq!(sample.total, 1);
        assert_eq!(sample.keys, vec!["translation:1:de".to_string()]);
    }

    #[tokio::test]
    async fn least_recently_used_entry_is_evicted() {
        let store = store(2);
        let ttl = Duration::from_secs(60);
        store.set("a", Bytes::from_static(b"1"), ttl).await.expect("set");
        store.set("b", Bytes::from_static(b"2"), ttl).await.expect("set");
        assert!(store.get("a").await.expect("get").is_some());

        store.set("c", Bytes::from_static(b"3"), ttl).await.expect("set");

        assert!(store.get("b").await.expect("get").is_none());
        assert!(store.get("a").await.expect("get").is_some());
        assert!(store.get("c").await.expect("get").is_some());
    }

    #[tokio::test]
    async fn overwrite_replaces_value_and_delete_is_idempotent() {
        let store = store(2);
        let ttl = Duration::from_secs(60);
        store.set("list", Bytes::from_static(b"[]"), ttl).await.expect("set");
        store
            .set("list", Bytes::from_static(b"[1]"), ttl)
            .await
            .expect("set");
        assert_eq!(
            store.get("list").await.expect("get"),
            Some(Bytes::from_static(b"[1]"))
        );

        store.delete("list").await.expect("delete");
        store.delete("list").await.expect("second delete");
        assert!(store.get("list").await.expect("get").is_none());
    }
}
