//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::error::DomainError;

/// Store-assigned note identifier.
pub type NoteId = i64;

/// A stored note. Cached payloads are this record serialized as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: NoteId,
    pub title: String,
    pub text: String,
    pub original_language: String,
    pub translated_text: Option<String>,
    pub translated_language: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl NoteRecord {
    /// Translated fields are either both present or both absent.
    pub fn ensure_translation_pair(&self) -> Result<(), DomainError> {
        if self.translated_text.is_some() != self.translated_language.is_some() {
            return Err(DomainError::invariant(format!(
                "note {} has a partial translation pair",
                self.id
            )));
        }
        Ok(())
    }
}

/// Payload stored under a translation cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub translated_text: String,
    pub translated_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteStats {
    pub total_notes: u64,
    pub translations_count: u64,
    /// Most common original language first.
    pub by_language: Vec<LanguageCount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCount {
    pub language: String,
    pub count: u64,
}
