//! Parlance Cache System
//!
//! A key-value cache in front of the note store and the translation
//! provider:
//!
//! - **Keys**: `list`, `note:{id}` and `translation:{id}:{lang}`
//! - **Backends**: in-process LRU ([`MemoryCacheStore`]) or Redis
//!   (`infra::cache::RedisCacheStore`), both behind [`CacheStore`]
//! - **Access**: [`NoteCache`] encodes payloads as JSON and turns backend
//!   failures into misses
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! backend = "memory"          # memory | redis | none
//! list_ttl_seconds = 300
//! note_ttl_seconds = 300
//! translation_ttl_seconds = 3600
//! invalidate_list_on_translate = false
//! ```

mod access;
mod config;
mod keys;
mod store;

pub use access::{CACHE_ERROR_TOTAL, CACHE_HIT_TOTAL, CACHE_MISS_TOTAL, CacheProbe, NoteCache};
pub use config::CacheConfig;
pub use keys::{NoteCacheKey, PROBE_KEY};
pub use store::{CACHE_EVICT_TOTAL, CacheError, CacheStore, KeySample, MemoryCacheStore};
