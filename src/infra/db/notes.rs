use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{
        CreateNoteParams, NotesRepo, NotesWriteRepo, RepoError, UpdateNoteParams,
        UpdateTranslationParams,
    },
    domain::entities::{LanguageCount, NoteId, NoteRecord, NoteStats},
};

use super::{PostgresRepositories, map_sqlx_error};

const NOTE_COLUMNS: &str = "id, title, text, original_language, translated_text, \
    translated_language, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct NoteRow {
    id: i64,
    title: String,
    text: String,
    original_language: String,
    translated_text: Option<String>,
    translated_language: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<NoteRow> for NoteRecord {
    fn from(row: NoteRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            text: row.text,
            original_language: row.original_language,
            translated_text: row.translated_text,
            translated_language: row.translated_language,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TotalsRow {
    total_notes: i64,
    translations_count: i64,
}

#[derive(sqlx::FromRow)]
struct LanguageRow {
    language: String,
    count: i64,
}

#[async_trait]
impl NotesRepo for PostgresRepositories {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>, RepoError> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, NoteRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(NoteRecord::from).collect())
    }

    async fn find_by_id(&self, id: NoteId) -> Result<Option<NoteRecord>, RepoError> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1");
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(NoteRecord::from))
    }

    async fn note_stats(&self) -> Result<NoteStats, RepoError> {
        let totals = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT
                COUNT(*) AS total_notes,
                COUNT(*) FILTER (
                    WHERE translated_text IS NOT NULL AND translated_text <> ''
                ) AS translations_count
            FROM notes
            "#,
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let languages = sqlx::query_as::<_, LanguageRow>(
            r#"
            SELECT original_language AS language, COUNT(*) AS count
            FROM notes
            GROUP BY original_language
            ORDER BY count DESC, original_language
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let by_language = languages
            .into_iter()
            .map(|row| {
                Ok(LanguageCount {
                    language: row.language,
                    count: Self::convert_count(row.count)?,
                })
            })
            .collect::<Result<Vec<_>, RepoError>>()?;

        Ok(NoteStats {
            total_notes: Self::convert_count(totals.total_notes)?,
            translations_count: Self::convert_count(totals.translations_count)?,
            by_language,
        })
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.ping().await
    }
}

#[async_trait]
impl NotesWriteRepo for PostgresRepositories {
    async fn create_note(&self, params: CreateNoteParams) -> Result<NoteRecord, RepoError> {
        let sql = format!(
            "INSERT INTO notes (title, text, original_language) VALUES ($1, $2, $3) \
             RETURNING {NOTE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(params.title)
            .bind(params.text)
            .bind(params.original_language)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_note(&self, params: UpdateNoteParams) -> Result<NoteRecord, RepoError> {
        let sql = format!(
            "UPDATE notes SET \
                title = COALESCE($2, title), \
                text = COALESCE($3, text), \
                original_language = COALESCE($4, original_language), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {NOTE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(params.id)
            .bind(params.title)
            .bind(params.text)
            .bind(params.original_language)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(NoteRecord::from).ok_or(RepoError::NotFound)
    }

    async fn update_translation(
        &self,
        params: UpdateTranslationParams,
    ) -> Result<NoteRecord, RepoError> {
        let sql = format!(
            "UPDATE notes SET \
                translated_text = $2, \
                translated_language = $3, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {NOTE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(params.id)
            .bind(params.translated_text)
            .bind(params.translated_language)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(NoteRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_note(&self, id: NoteId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
