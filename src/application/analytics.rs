//! Read-only statistics and cache diagnostics.

use std::sync::Arc;
use std::time::Duration;

use crate::application::repos::{NotesRepo, RepoError};
use crate::cache::{CacheProbe, KeySample, NoteCache};
use crate::domain::entities::NoteStats;

const KEY_SAMPLE_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheReport {
    pub probe: CacheProbe,
    /// Present when the backend answered the key listing.
    pub keys: Option<KeySample>,
    pub list_ttl: Duration,
    pub note_ttl: Duration,
    pub translation_ttl: Duration,
}

impl CacheReport {
    pub fn is_healthy(&self) -> bool {
        self.probe.reachable && self.probe.probe_passed
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    reader: Arc<dyn NotesRepo>,
    cache: NoteCache,
}

impl AnalyticsService {
    pub fn new(reader: Arc<dyn NotesRepo>, cache: NoteCache) -> Self {
        Self { reader, cache }
    }

    /// Counts straight from the store; never cached.
    pub async fn stats(&self) -> Result<NoteStats, RepoError> {
        self.reader.note_stats().await
    }

    pub async fn cache_info(&self) -> CacheReport {
        let config = self.cache.config();
        let probe = self.cache.probe().await;
        let keys = if probe.reachable {
            self.cache.sample_keys(KEY_SAMPLE_LIMIT).await
        } else {
            None
        };
        CacheReport {
            probe,
            keys,
            list_ttl: config.list_ttl,
            note_ttl: config.note_ttl,
            translation_ttl: config.translation_ttl,
        }
    }
}
