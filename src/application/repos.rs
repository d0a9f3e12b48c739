//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{NoteId, NoteRecord, NoteStats};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateNoteParams {
    pub title: String,
    pub text: String,
    pub original_language: String,
}

/// Field update; `None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct UpdateNoteParams {
    pub id: NoteId,
    pub title: Option<String>,
    pub text: Option<String>,
    pub original_language: Option<String>,
}

/// Writes only the translated pair and `updated_at`.
#[derive(Debug, Clone)]
pub struct UpdateTranslationParams {
    pub id: NoteId,
    pub translated_text: String,
    pub translated_language: String,
}

#[async_trait]
pub trait NotesRepo: Send + Sync {
    /// All notes, newest `created_at` first.
    async fn list_notes(&self) -> Result<Vec<NoteRecord>, RepoError>;

    async fn find_by_id(&self, id: NoteId) -> Result<Option<NoteRecord>, RepoError>;

    async fn note_stats(&self) -> Result<NoteStats, RepoError>;

    async fn health_check(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

#[async_trait]
pub trait NotesWriteRepo: Send + Sync {
    async fn create_note(&self, params: CreateNoteParams) -> Result<NoteRecord, RepoError>;

    /// Fails with [`RepoError::NotFound`] when the note does not exist.
    async fn update_note(&self, params: UpdateNoteParams) -> Result<NoteRecord, RepoError>;

    /// Fails with [`RepoError::NotFound`] when the note does not exist.
    async fn update_translation(
        &self,
        params: UpdateTranslationParams,
    ) -> Result<NoteRecord, RepoError>;

    /// Returns `false` when nothing was deleted.
    async fn delete_note(&self, id: NoteId) -> Result<bool, RepoError>;
}
