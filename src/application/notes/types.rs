use bytes::Bytes;
use thiserror::Error;

use crate::application::repos::RepoError;
use crate::application::translator::TranslatorError;
use crate::domain::entities::{NoteId, NoteRecord};
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("note {0} not found")]
    NotFound(NoteId),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl NoteError {
    pub(crate) fn from_repo(id: NoteId, err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateNoteCommand {
    pub title: String,
    pub text: String,
    pub original_language: Option<String>,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteCommand {
    pub title: Option<String>,
    pub text: Option<String>,
    pub original_language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadNoteCommand {
    pub filename: String,
    pub content: Bytes,
    pub title: Option<String>,
    pub original_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedNote {
    pub note: NoteRecord,
    /// The pair came from the translation cache, not the provider.
    pub cached: bool,
}

/// Result of a translate request that passed validation and found its note.
#[derive(Debug)]
pub enum TranslationOutcome {
    Translated(TranslatedNote),
    /// Target equals the note's original language.
    NoOp { language: String },
    /// No provider is configured.
    Unavailable { reason: String },
    /// The provider failed or timed out; nothing was written.
    Failed(TranslatorError),
}
