//! In-memory fakes shared by the integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use time::{OffsetDateTime, macros::datetime};
use tokio::sync::Notify;

use parlance::application::analytics::AnalyticsService;
use parlance::application::notes::{CreateNoteCommand, NoteService, NoteServiceOptions};
use parlance::application::repos::{
    CreateNoteParams, NotesRepo, NotesWriteRepo, RepoError, UpdateNoteParams,
    UpdateTranslationParams,
};
use parlance::application::translator::{
    TranslationProvider, TranslatorCapability, TranslatorError,
};
use parlance::cache::{
    CacheConfig, CacheError, CacheStore, KeySample, MemoryCacheStore, NoteCache,
};
use parlance::domain::entities::{LanguageCount, NoteId, NoteRecord, NoteStats};

const EPOCH: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

/// Record store double that counts reads and writes.
#[derive(Default)]
pub struct InMemoryNotes {
    notes: Mutex<BTreeMap<NoteId, NoteRecord>>,
    next_id: AtomicI64,
    clock: AtomicI64,
    list_calls: AtomicUsize,
    find_calls: AtomicUsize,
    writes: AtomicUsize,
    translation_writes: AtomicUsize,
}

impl InMemoryNotes {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn translation_writes(&self) -> usize {
        self.translation_writes.load(Ordering::SeqCst)
    }

    /// Read a stored note without touching the counters.
    pub fn stored(&self, id: NoteId) -> Option<NoteRecord> {
        self.guard().get(&id).cloned()
    }

    /// Store a record as-is, bypassing the write counters.
    pub fn insert_raw(&self, note: NoteRecord) {
        self.next_id.fetch_max(note.id, Ordering::SeqCst);
        self.guard().insert(note.id, note);
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, BTreeMap<NoteId, NoteRecord>> {
        self.notes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn tick(&self) -> OffsetDateTime {
        let seconds = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        EPOCH + time::Duration::seconds(seconds)
    }
}

#[async_trait]
impl NotesRepo for InMemoryNotes {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut notes: Vec<_> = self.guard().values().cloned().collect();
        notes.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(notes)
    }

    async fn find_by_id(&self, id: NoteId) -> Result<Option<NoteRecord>, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.guard().get(&id).cloned())
    }

    async fn note_stats(&self) -> Result<NoteStats, RepoError> {
        let notes = self.guard();
        let mut counts: HashMap<String, u64> = HashMap::new();
        for note in notes.values() {
            *counts.entry(note.original_language.clone()).or_default() += 1;
        }
        let mut by_language: Vec<_> = counts
            .into_iter()
            .map(|(language, count)| LanguageCount { language, count })
            .collect();
        by_language.sort_by(|a, b| b.count.cmp(&a.count).then(a.language.cmp(&b.language)));

        Ok(NoteStats {
            total_notes: notes.len() as u64,
            translations_count: notes
                .values()
                .filter(|note| note.translated_text.as_deref().is_some_and(|t| !t.is_empty()))
                .count() as u64,
            by_language,
        })
    }
}

#[async_trait]
impl NotesWriteRepo for InMemoryNotes {
    async fn create_note(&self, params: CreateNoteParams) -> Result<NoteRecord, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.tick();
        let note = NoteRecord {
            id,
            title: params.title,
            text: params.text,
            original_language: params.original_language,
            translated_text: None,
            translated_language: None,
            created_at: now,
            updated_at: now,
        };
        self.guard().insert(id, note.clone());
        Ok(note)
    }

    async fn update_note(&self, params: UpdateNoteParams) -> Result<NoteRecord, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let now = self.tick();
        let mut notes = self.guard();
        let note = notes.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        if let Some(title) = params.title {
            note.title = title;
        }
        if let Some(text) = params.text {
            note.text = text;
        }
        if let Some(language) = params.original_language {
            note.original_language = language;
        }
        note.updated_at = now;
        Ok(note.clone())
    }

    async fn update_translation(
        &self,
        params: UpdateTranslationParams,
    ) -> Result<NoteRecord, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.translation_writes.fetch_add(1, Ordering::SeqCst);
        let now = self.tick();
        let mut notes = self.guard();
        let note = notes.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        note.translated_text = Some(params.translated_text);
        note.translated_language = Some(params.translated_language);
        note.updated_at = now;
        Ok(note.clone())
    }

    async fn delete_note(&self, id: NoteId) -> Result<bool, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.guard().remove(&id).is_some())
    }
}

/// Reader that can hold one `find_by_id` after the row was loaded.
pub struct GatedReads {
    inner: Arc<InMemoryNotes>,
    armed: AtomicBool,
    /// Signalled once the held read has its row.
    pub loaded: Notify,
    /// Lets the held read return.
    pub release: Notify,
}

impl GatedReads {
    pub fn new(inner: Arc<InMemoryNotes>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            armed: AtomicBool::new(false),
            loaded: Notify::new(),
            release: Notify::new(),
        })
    }

    /// Hold the next `find_by_id`.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotesRepo for GatedReads {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>, RepoError> {
        self.inner.list_notes().await
    }

    async fn find_by_id(&self, id: NoteId) -> Result<Option<NoteRecord>, RepoError> {
        let row = self.inner.find_by_id(id).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.loaded.notify_one();
            self.release.notified().await;
        }
        Ok(row)
    }

    async fn note_stats(&self) -> Result<NoteStats, RepoError> {
        self.inner.note_stats().await
    }
}

/// Provider that prefixes the text with the target language.
#[derive(Default)]
pub struct CountingTranslator {
    calls: AtomicUsize,
}

impl CountingTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for CountingTranslator {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{target_language}] {text}"))
    }
}

#[derive(Default)]
pub struct FailingTranslator {
    calls: AtomicUsize,
}

impl FailingTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for FailingTranslator {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn translate(
        &self,
        _text: &str,
        _source_language: &str,
        _target_language: &str,
    ) -> Result<String, TranslatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TranslatorError::Rejected {
            status: 502,
            message: "upstream unavailable".to_string(),
        })
    }
}

/// Provider that answers only after `delay`.
pub struct SlowTranslator {
    pub delay: Duration,
}

#[async_trait]
impl TranslationProvider for SlowTranslator {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        _target_language: &str,
    ) -> Result<String, TranslatorError> {
        tokio::time::sleep(self.delay).await;
        Ok(text.to_string())
    }
}

/// Cache backend where every call fails.
#[derive(Default)]
pub struct FailingCacheStore {
    calls: AtomicUsize,
}

impl FailingCacheStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> CacheError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CacheError::Unavailable("connection refused".to_string())
    }
}

#[async_trait]
impl CacheStore for FailingCacheStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Err(self.fail())
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        Err(self.fail())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(self.fail())
    }

    async fn sample_keys(&self, _limit: usize) -> Result<KeySample, CacheError> {
        Err(self.fail())
    }
}

pub fn memory_store() -> Arc<MemoryCacheStore> {
    Arc::new(MemoryCacheStore::new(
        CacheConfig::default().memory_capacity_non_zero(),
    ))
}

pub fn available(provider: Arc<dyn TranslationProvider>) -> TranslatorCapability {
    TranslatorCapability::available(provider)
}

pub fn unavailable() -> TranslatorCapability {
    TranslatorCapability::unavailable("translation endpoint is not configured")
}

/// Wiring for one coordinator over in-memory collaborators.
pub struct Harness {
    pub repo: Arc<InMemoryNotes>,
    pub cache: NoteCache,
    pub service: NoteService,
    pub analytics: AnalyticsService,
}

impl Harness {
    pub fn new(translator: TranslatorCapability) -> Self {
        let store: Arc<dyn CacheStore> = memory_store();
        Self::with_store(Some(store), translator, CacheConfig::default())
    }

    pub fn with_store(
        store: Option<Arc<dyn CacheStore>>,
        translator: TranslatorCapability,
        config: CacheConfig,
    ) -> Self {
        Self::build(
            InMemoryNotes::new(),
            store,
            translator,
            config,
            NoteServiceOptions::default(),
        )
    }

    pub fn build(
        repo: Arc<InMemoryNotes>,
        store: Option<Arc<dyn CacheStore>>,
        translator: TranslatorCapability,
        config: CacheConfig,
        options: NoteServiceOptions,
    ) -> Self {
        let cache = NoteCache::new(store, config);
        let reader: Arc<dyn NotesRepo> = repo.clone();
        let writer: Arc<dyn NotesWriteRepo> = repo.clone();
        let service = NoteService::new(reader.clone(), writer, cache.clone(), translator, options);
        let analytics = AnalyticsService::new(reader, cache.clone());
        Self {
            repo,
            cache,
            service,
            analytics,
        }
    }

    pub async fn create(&self, title: &str, text: &str, language: Option<&str>) -> NoteRecord {
        self.service
            .create(CreateNoteCommand {
                title: title.to_string(),
                text: text.to_string(),
                original_language: language.map(str::to_string),
            })
            .await
            .expect("note should be created")
    }
}
