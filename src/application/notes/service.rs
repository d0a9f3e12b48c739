use std::sync::Arc;
use std::time::Duration;

use crate::application::repos::{NotesRepo, NotesWriteRepo, RepoError};
use crate::application::translator::TranslatorCapability;
use crate::cache::NoteCache;

const DEFAULT_TRANSLATION_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct NoteServiceOptions {
    pub translation_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for NoteServiceOptions {
    fn default() -> Self {
        Self {
            translation_timeout: DEFAULT_TRANSLATION_TIMEOUT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Coordinates the note store, the cache and the translation provider.
///
/// Store writes always complete before the matching cache invalidation. The
/// service keeps no mutable state of its own, so instances sharing a cache
/// backend stay consistent with each other.
#[derive(Clone)]
pub struct NoteService {
    pub(crate) reader: Arc<dyn NotesRepo>,
    pub(crate) writer: Arc<dyn NotesWriteRepo>,
    pub(crate) cache: NoteCache,
    pub(crate) translator: TranslatorCapability,
    pub(crate) options: NoteServiceOptions,
}

impl NoteService {
    pub fn new(
        reader: Arc<dyn NotesRepo>,
        writer: Arc<dyn NotesWriteRepo>,
        cache: NoteCache,
        translator: TranslatorCapability,
        options: NoteServiceOptions,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
            translator,
            options,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.options.max_upload_bytes
    }

    /// Ping the record store.
    pub async fn health(&self) -> Result<(), RepoError> {
        self.reader.health_check().await
    }
}
