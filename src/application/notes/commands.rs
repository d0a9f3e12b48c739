use tracing::info;

use crate::application::repos::{CreateNoteParams, UpdateNoteParams};
use crate::domain::entities::{NoteId, NoteRecord};
use crate::domain::language::LanguageCode;
use crate::domain::notes::{validate_text, validate_title};
use crate::domain::uploads::parse_text_upload;

use super::service::NoteService;
use super::types::{CreateNoteCommand, NoteError, UpdateNoteCommand, UploadNoteCommand};

impl NoteService {
    pub async fn create(&self, command: CreateNoteCommand) -> Result<NoteRecord, NoteError> {
        let params = CreateNoteParams {
            title: validate_title(&command.title)?,
            text: validate_text(&command.text)?,
            original_language: LanguageCode::parse_or_default(
                "original_language",
                command.original_language.as_deref(),
            )?
            .into_inner(),
        };

        self.insert(params).await
    }

    pub async fn update(
        &self,
        id: NoteId,
        command: UpdateNoteCommand,
    ) -> Result<NoteRecord, NoteError> {
        let params = UpdateNoteParams {
            id,
            title: command.title.as_deref().map(validate_title).transpose()?,
            text: command.text.as_deref().map(validate_text).transpose()?,
            original_language: command
                .original_language
                .as_deref()
                .map(|raw| LanguageCode::parse("original_language", raw))
                .transpose()?
                .map(LanguageCode::into_inner),
        };

        let note = self
            .writer
            .update_note(params)
            .await
            .map_err(|err| NoteError::from_repo(id, err))?;

        self.cache.invalidate_note(id).await;
        self.cache.invalidate_list().await;

        info!(target: "parlance::notes", note_id = id, "note updated");
        Ok(note)
    }

    pub async fn delete(&self, id: NoteId) -> Result<(), NoteError> {
        let deleted = self
            .writer
            .delete_note(id)
            .await
            .map_err(|err| NoteError::from_repo(id, err))?;
        if !deleted {
            return Err(NoteError::NotFound(id));
        }

        self.cache.invalidate_note(id).await;
        self.cache.invalidate_list().await;

        info!(target: "parlance::notes", note_id = id, "note deleted");
        Ok(())
    }

    /// Create a note from an uploaded `.txt` file.
    pub async fn upload(&self, command: UploadNoteCommand) -> Result<NoteRecord, NoteError> {
        let upload = parse_text_upload(
            &command.filename,
            &command.content,
            self.options.max_upload_bytes,
            command.title.as_deref(),
            command.original_language.as_deref(),
        )?;

        let params = CreateNoteParams {
            title: upload.title,
            text: upload.text,
            original_language: upload.original_language.into_inner(),
        };

        self.insert(params).await
    }

    async fn insert(&self, params: CreateNoteParams) -> Result<NoteRecord, NoteError> {
        let note = self.writer.create_note(params).await?;
        self.cache.invalidate_list().await;

        info!(target: "parlance::notes", note_id = note.id, "note created");
        Ok(note)
    }
}
