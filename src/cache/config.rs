//! Cache configuration.
//!
//! TTLs per key family and sizing for the in-process backend, resolved from
//! the `[cache]` section of `parlance.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

use super::keys::NoteCacheKey;

const DEFAULT_LIST_TTL_SECS: u64 = 300;
const DEFAULT_NOTE_TTL_SECS: u64 = 300;
const DEFAULT_TRANSLATION_TTL_SECS: u64 = 3600;
const DEFAULT_MEMORY_CAPACITY: usize = 1024;
const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL of the `list` entry.
    pub list_ttl: Duration,
    /// TTL of `note:{id}` entries.
    pub note_ttl: Duration,
    /// TTL of `translation:{id}:{lang}` entries.
    pub translation_ttl: Duration,
    /// Maximum entries held by the in-memory backend.
    pub memory_capacity: usize,
    /// Upper bound for a single remote cache call.
    pub operation_timeout: Duration,
    /// Also drop `list` after a translation is stored.
    pub invalidate_list_on_translate: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_ttl: Duration::from_secs(DEFAULT_LIST_TTL_SECS),
            note_ttl: Duration::from_secs(DEFAULT_NOTE_TTL_SECS),
            translation_ttl: Duration::from_secs(DEFAULT_TRANSLATION_TTL_SECS),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
            invalidate_list_on_translate: false,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            list_ttl: settings.list_ttl,
            note_ttl: settings.note_ttl,
            translation_ttl: settings.translation_ttl,
            memory_capacity: settings.memory_capacity.get(),
            operation_timeout: settings.operation_timeout,
            invalidate_list_on_translate: settings.invalidate_list_on_translate,
        }
    }
}

impl CacheConfig {
    pub fn ttl_for(&self, key: &NoteCacheKey) -> Duration {
        match key {
            NoteCacheKey::List => self.list_ttl,
            NoteCacheKey::Note(_) => self.note_ttl,
            NoteCacheKey::Translation { .. } => self.translation_ttl,
        }
    }

    /// Returns the memory capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
