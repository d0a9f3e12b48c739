use crate::domain::entities::{NoteId, NoteRecord};

use super::service::NoteService;
use super::types::NoteError;

impl NoteService {
    /// All notes, newest first. A cached list is returned without consulting the store.
    pub async fn read_list(&self) -> Result<Vec<NoteRecord>, NoteError> {
        if let Some(notes) = self.cache.load_list().await {
            return Ok(notes);
        }

        let notes = self.reader.list_notes().await?;
        for note in &notes {
            note.ensure_translation_pair()?;
        }
        self.cache.store_list(&notes).await;
        Ok(notes)
    }

    /// One note. Missing notes are never cached.
    ///
    /// Store rows with half a translation pair fail with
    /// [`DomainError::Invariant`](crate::domain::error::DomainError::Invariant)
    /// and are kept out of the cache.
    pub async fn read_one(&self, id: NoteId) -> Result<NoteRecord, NoteError> {
        if let Some(note) = self.cache.load_note(id).await {
            return Ok(note);
        }

        let note = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(NoteError::NotFound(id))?;
        note.ensure_translation_pair()?;
        self.cache.store_note(&note).await;
        Ok(note)
    }
}
