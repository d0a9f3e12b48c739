//! Typed access to the note cache.
//!
//! Every method degrades to a miss or a no-op when the backend fails, so the
//! record store stays the source of truth. Failures are logged at `warn` and
//! counted under `parlance_cache_error_total{op}`.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::domain::entities::{NoteId, NoteRecord, TranslationRecord};
use crate::domain::language::LanguageCode;

use super::config::CacheConfig;
use super::keys::{NoteCacheKey, PROBE_KEY};
use super::store::{CacheError, CacheStore, KeySample};

pub const CACHE_HIT_TOTAL: &str = "parlance_cache_hit_total";
pub const CACHE_MISS_TOTAL: &str = "parlance_cache_miss_total";
pub const CACHE_ERROR_TOTAL: &str = "parlance_cache_error_total";

const SOURCE: &str = "cache::access";
const PROBE_TTL: Duration = Duration::from_secs(60);
const PROBE_VALUE: &[u8] = b"ok";

/// Result of a set/get/delete round trip on [`PROBE_KEY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheProbe {
    pub backend: &'static str,
    pub reachable: bool,
    pub probe_passed: bool,
    pub detail: Option<String>,
}

#[derive(Clone)]
pub struct NoteCache {
    store: Option<Arc<dyn CacheStore>>,
    config: CacheConfig,
}

impl NoteCache {
    pub fn new(store: Option<Arc<dyn CacheStore>>, config: CacheConfig) -> Self {
        Self { store, config }
    }

    /// A cache that always misses.
    pub fn disabled(config: CacheConfig) -> Self {
        Self::new(None, config)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn backend(&self) -> &'static str {
        self.store
            .as_ref()
            .map(|store| store.backend())
            .unwrap_or("none")
    }

    pub async fn load_list(&self) -> Option<Vec<NoteRecord>> {
        self.load(&NoteCacheKey::List).await
    }

    pub async fn store_list(&self, notes: &[NoteRecord]) {
        self.save(&NoteCacheKey::List, notes).await;
    }

    pub async fn load_note(&self, id: NoteId) -> Option<NoteRecord> {
        self.load(&NoteCacheKey::Note(id)).await
    }

    pub async fn store_note(&self, note: &NoteRecord) {
        self.save(&NoteCacheKey::Note(note.id), note).await;
    }

    pub async fn load_translation(
        &self,
        note_id: NoteId,
        language: &LanguageCode,
    ) -> Option<TranslationRecord> {
        self.load(&NoteCacheKey::translation(note_id, language))
            .await
    }

    pub async fn store_translation(&self, note_id: NoteId, translation: &TranslationRecord) {
        let key = NoteCacheKey::Translation {
            note_id,
            language: translation.translated_language.clone(),
        };
        self.save(&key, translation).await;
    }

    pub async fn invalidate_list(&self) {
        self.remove(&NoteCacheKey::List).await;
    }

    pub async fn invalidate_note(&self, id: NoteId) {
        self.remove(&NoteCacheKey::Note(id)).await;
    }

    /// Write, read back and delete a reserved key. Never fails.
    pub async fn probe(&self) -> CacheProbe {
        let backend = self.backend();
        let Some(store) = self.store.as_ref() else {
            return CacheProbe {
                backend,
                reachable: false,
                probe_passed: false,
                detail: Some("cache backend is disabled".to_string()),
            };
        };

        let round_trip = async {
            store
                .set(PROBE_KEY, Bytes::from_static(PROBE_VALUE), PROBE_TTL)
                .await?;
            let value = store.get(PROBE_KEY).await?;
            store.delete(PROBE_KEY).await?;
            Ok::<_, CacheError>(value)
        };

        match round_trip.await {
            Ok(Some(value)) if value.as_ref() == PROBE_VALUE => CacheProbe {
                backend,
                reachable: true,
                probe_passed: true,
                detail: None,
            },
            Ok(_) => CacheProbe {
                backend,
                reachable: true,
                probe_passed: false,
                detail: Some("probe value was not read back".to_string()),
            },
            Err(err) => {
                self.record_failure("probe", PROBE_KEY, &err);
                CacheProbe {
                    backend,
                    reachable: false,
                    probe_passed: false,
                    detail: Some(err.to_string()),
                }
            }
        }
    }

    /// Live keys in the backend, or `None` when the cache is disabled or failing.
    pub async fn sample_keys(&self, limit: usize) -> Option<KeySample> {
        let store = self.store.as_ref()?;
        match store.sample_keys(limit).await {
            Ok(sample) => Some(sample),
            Err(err) => {
                self.record_failure("sample_keys", "*", &err);
                None
            }
        }
    }

    async fn load<T: DeserializeOwned>(&self, key: &NoteCacheKey) -> Option<T> {
        let store = self.store.as_ref()?;
        let rendered = key.to_string();

        let bytes = match store.get(&rendered).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                counter!(CACHE_MISS_TOTAL, "kind" => key.kind()).increment(1);
                debug!(target: "parlance::cache", key = %rendered, "cache miss");
                return None;
            }
            Err(err) => {
                self.record_failure("get", &rendered, &err);
                counter!(CACHE_MISS_TOTAL, "kind" => key.kind()).increment(1);
                return None;
            }
        };

        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => {
                counter!(CACHE_HIT_TOTAL, "kind" => key.kind()).increment(1);
                debug!(target: "parlance::cache", key = %rendered, "cache hit");
                Some(value)
            }
            Err(err) => {
                counter!(CACHE_ERROR_TOTAL, "op" => "decode").increment(1);
                counter!(CACHE_MISS_TOTAL, "kind" => key.kind()).increment(1);
                warn!(
                    target: "parlance::cache",
                    source_module = SOURCE,
                    key = %rendered,
                    error = %err,
                    "Discarding undecodable cache entry"
                );
                self.remove(key).await;
                None
            }
        }
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &NoteCacheKey, value: &T) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let rendered = key.to_string();

        let payload = match serde_json::to_vec(value) {
            Ok(payload) => Bytes::from(payload),
            Err(err) => {
                counter!(CACHE_ERROR_TOTAL, "op" => "encode").increment(1);
                warn!(
                    target: "parlance::cache",
                    source_module = SOURCE,
                    key = %rendered,
                    error = %err,
                    "Skipping cache write for unencodable value"
                );
                return;
            }
        };

        if let Err(err) = store
            .set(&rendered, payload, self.config.ttl_for(key))
            .await
        {
            self.record_failure("set", &rendered, &err);
        }
    }

    async fn remove(&self, key: &NoteCacheKey) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let rendered = key.to_string();
        match store.delete(&rendered).await {
            Ok(()) => debug!(target: "parlance::cache", key = %rendered, "cache invalidated"),
            Err(err) => self.record_failure("delete", &rendered, &err),
        }
    }

    fn record_failure(&self, op: &'static str, key: &str, err: &CacheError) {
        counter!(CACHE_ERROR_TOTAL, "op" => op).increment(1);
        warn!(
            target: "parlance::cache",
            source_module = SOURCE,
            op,
            key,
            backend = self.backend(),
            error = %err,
            "Cache operation failed; continuing without cache"
        );
    }
}
