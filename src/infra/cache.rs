//! Cache store backends selected from configuration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::{Client, aio::ConnectionManager};
use tokio::sync::OnceCell;
use tracing::info;

use crate::cache::{CacheError, CacheStore, KeySample, MemoryCacheStore};
use crate::config::{CacheBackend, CacheSettings};

use super::error::InfraError;

const SCAN_BATCH: usize = 100;

/// Redis-backed store. The connection is opened on first use so startup never
/// blocks on an unreachable server.
pub struct RedisCacheStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    key_prefix: String,
    operation_timeout: Duration,
}

impl RedisCacheStore {
    pub fn new(
        url: &str,
        key_prefix: impl Into<String>,
        operation_timeout: Duration,
    ) -> Result<Self, InfraError> {
        let client = Client::open(url)
            .map_err(|err| InfraError::cache(format!("invalid redis url: {err}")))?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            key_prefix: key_prefix.into(),
            operation_timeout,
        })
    }

    fn prefixed(&self, key: &str) -> String {
        prefixed_key(&self.key_prefix, key)
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .with_timeout("connect", async {
                self.connection
                    .get_or_try_init(|| self.client.get_connection_manager())
                    .await
                    .cloned()
                    .map_err(|err| CacheError::Unavailable(err.to_string()))
            })
            .await?;
        Ok(manager)
    }

    async fn with_timeout<T, F>(&self, op: &'static str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        tokio::time::timeout(self.operation_timeout, fut)
            .await
            .map_err(|_| CacheError::Timeout {
                op,
                timeout: self.operation_timeout,
            })?
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut conn = self.connection().await?;
        let key = self.prefixed(key);
        self.with_timeout("get", async move {
            redis::cmd("GET")
                .arg(&key)
                .query_async::<Option<Vec<u8>>>(&mut conn)
                .await
                .map(|value| value.map(Bytes::from))
                .map_err(|err| CacheError::Backend(err.to_string()))
        })
        .await
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let key = self.prefixed(key);
        let seconds = ttl.as_secs().max(1);
        self.with_timeout("set", async move {
            redis::cmd("SET")
                .arg(&key)
                .arg(value.as_ref())
                .arg("EX")
                .arg(seconds)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|err| CacheError::Backend(err.to_string()))
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let key = self.prefixed(key);
        self.with_timeout("delete", async move {
            redis::cmd("DEL")
                .arg(&key)
                .query_async::<i64>(&mut conn)
                .await
                .map(|_| ())
                .map_err(|err| CacheError::Backend(err.to_string()))
        })
        .await
    }

    async fn sample_keys(&self, limit: usize) -> Result<KeySample, CacheError> {
        let mut conn = self.connection().await?;
        let pattern = prefixed_key(&self.key_prefix, "*");
        let namespace = prefixed_key(&self.key_prefix, "");
        self.with_timeout("sample_keys", async move {
            let mut sample = KeySample::default();
            let mut cursor: u64 = 0;
            loop {
                let (next, keys) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async::<(u64, Vec<String>)>(&mut conn)
                    .await
                    .map_err(|err| CacheError::Backend(err.to_string()))?;
                for key in &keys {
                    sample.record(key.strip_prefix(namespace.as_str()).unwrap_or(key), limit);
                }
                if next == 0 {
                    return Ok(sample);
                }
                cursor = next;
            }
        })
        .await
    }
}

fn prefixed_key(prefix: &str, key: &str) -> String {
    format!("{prefix}:{key}")
}

/// Build the configured store. `None` means caching is disabled.
pub fn build_cache_store(
    settings: &CacheSettings,
) -> Result<Option<Arc<dyn CacheStore>>, InfraError> {
    match settings.backend {
        CacheBackend::Memory => {
            info!(
                target: "parlance::cache",
                capacity = settings.memory_capacity.get(),
                "using in-memory cache"
            );
            Ok(Some(Arc::new(MemoryCacheStore::new(
                settings.memory_capacity,
            ))))
        }
        CacheBackend::Redis => {
            let url = settings.redis_url.as_deref().ok_or_else(|| {
                InfraError::configuration("cache.redis_url is required for the redis backend")
            })?;
            info!(
                target: "parlance::cache",
                prefix = %settings.key_prefix,
                "using redis cache"
            );
            let store = RedisCacheStore::new(
                url,
                settings.key_prefix.clone(),
                settings.operation_timeout,
            )?;
            Ok(Some(Arc::new(store)))
        }
        CacheBackend::Disabled => {
            info!(target: "parlance::cache", "cache disabled");
            Ok(None)
        }
    }
}
