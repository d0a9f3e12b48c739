use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use crate::application::repos::UpdateTranslationParams;
use crate::application::translator::{
    TranslationProvider, TranslatorCapability, TranslatorError,
};
use crate::domain::entities::{NoteId, NoteRecord, TranslationRecord};
use crate::domain::language::LanguageCode;

use super::service::NoteService;
use super::types::{NoteError, TranslatedNote, TranslationOutcome};

pub const TRANSLATION_CALLS_TOTAL: &str = "parlance_translation_calls_total";
pub const TRANSLATION_MS: &str = "parlance_translation_ms";

impl NoteService {
    /// Translate a note, reusing a cached translation when one exists.
    ///
    /// Validation, a missing note and store failures are errors; every other
    /// result is a [`TranslationOutcome`]. The provider is called at most
    /// once, and only after the cache missed.
    pub async fn translate(
        &self,
        id: NoteId,
        target_language: &str,
    ) -> Result<TranslationOutcome, NoteError> {
        let target = LanguageCode::parse("target_language", target_language)?;
        let note = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(NoteError::NotFound(id))?;
        note.ensure_translation_pair()?;

        if target.matches(&note.original_language) {
            debug!(
                target: "parlance::translate",
                note_id = id,
                language = %target,
                "target matches original language"
            );
            return Ok(TranslationOutcome::NoOp {
                language: target.into_inner(),
            });
        }

        if let Some(cached) = self.cache.load_translation(id, &target).await {
            let note = self.persist_translation(id, cached).await?;
            self.after_translation(id).await;
            info!(
                target: "parlance::translate",
                note_id = id,
                language = %target,
                cached = true,
                "translation applied"
            );
            return Ok(TranslationOutcome::Translated(TranslatedNote {
                note,
                cached: true,
            }));
        }

        let provider = match &self.translator {
            TranslatorCapability::Available(provider) => provider.clone(),
            TranslatorCapability::Unavailable { reason } => {
                return Ok(TranslationOutcome::Unavailable {
                    reason: reason.clone(),
                });
            }
        };

        let translated_text = match self
            .call_provider(provider.as_ref(), &note, &target)
            .await
        {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    target: "parlance::translate",
                    note_id = id,
                    language = %target,
                    provider = provider.name(),
                    error = %err,
                    "translation failed"
                );
                return Ok(TranslationOutcome::Failed(err));
            }
        };

        let translation = TranslationRecord {
            translated_text,
            translated_language: target.into_inner(),
        };
        let note = self.persist_translation(id, translation.clone()).await?;
        self.cache.store_translation(id, &translation).await;
        self.after_translation(id).await;

        info!(
            target: "parlance::translate",
            note_id = id,
            language = %translation.translated_language,
            cached = false,
            "translation applied"
        );
        Ok(TranslationOutcome::Translated(TranslatedNote {
            note,
            cached: false,
        }))
    }

    async fn call_provider(
        &self,
        provider: &dyn TranslationProvider,
        note: &NoteRecord,
        target: &LanguageCode,
    ) -> Result<String, TranslatorError> {
        let timeout = self.options.translation_timeout;
        let started = Instant::now();
        let result = tokio::time::timeout(
            timeout,
            provider.translate(&note.text, &note.original_language, target.as_str()),
        )
        .await;
        histogram!(TRANSLATION_MS).record(started.elapsed().as_secs_f64() * 1000.0);

        let (label, result) = match result {
            Ok(Ok(text)) => ("ok", Ok(text)),
            Ok(Err(err)) => ("error", Err(err)),
            Err(_) => ("timeout", Err(TranslatorError::Timeout(timeout))),
        };
        counter!(TRANSLATION_CALLS_TOTAL, "result" => label).increment(1);
        result
    }

    async fn persist_translation(
        &self,
        id: NoteId,
        translation: TranslationRecord,
    ) -> Result<NoteRecord, NoteError> {
        let note = self
            .writer
            .update_translation(UpdateTranslationParams {
                id,
                translated_text: translation.translated_text,
                translated_language: translation.translated_language,
            })
            .await
            .map_err(|err| NoteError::from_repo(id, err))?;
        note.ensure_translation_pair()?;
        Ok(note)
    }

    async fn after_translation(&self, id: NoteId) {
        self.cache.invalidate_note(id).await;
        if self.cache.config().invalidate_list_on_translate {
            self.cache.invalidate_list().await;
        }
    }
}
