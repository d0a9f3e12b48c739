//! Note handlers

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use parlance_api_types::{
    NoteCreateRequest, NotePatchRequest, NoteReplaceRequest, TranslateRequest,
};

use crate::application::notes::{
    CreateNoteCommand, TranslationOutcome, UpdateNoteCommand, UploadNoteCommand,
};
use crate::domain::entities::NoteId;

use super::note_to_api;
use crate::infra::http::api::error::{ApiError, codes};
use crate::infra::http::api::models::{note_response, translation_response};
use crate::infra::http::api::state::ApiState;

pub async fn list_notes(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let notes = state.notes.read_list().await.map_err(note_to_api)?;
    let body: Vec<_> = notes.into_iter().map(note_response).collect();
    Ok(Json(body))
}

pub async fn create_note(
    State(state): State<ApiState>,
    Json(payload): Json<NoteCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateNoteCommand {
        title: payload.title,
        text: payload.text,
        original_language: payload.original_language,
    };

    let note = state.notes.create(command).await.map_err(note_to_api)?;
    Ok((StatusCode::CREATED, Json(note_response(note))))
}

pub async fn get_note(
    State(state): State<ApiState>,
    Path(id): Path<NoteId>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.read_one(id).await.map_err(note_to_api)?;
    Ok(Json(note_response(note)))
}

pub async fn replace_note(
    State(state): State<ApiState>,
    Path(id): Path<NoteId>,
    Json(payload): Json<NoteReplaceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateNoteCommand {
        title: Some(payload.title),
        text: Some(payload.text),
        original_language: payload.original_language,
    };

    let note = state.notes.update(id, command).await.map_err(note_to_api)?;
    Ok(Json(note_response(note)))
}

pub async fn patch_note(
    State(state): State<ApiState>,
    Path(id): Path<NoteId>,
    Json(payload): Json<NotePatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateNoteCommand {
        title: payload.title,
        text: payload.text,
        original_language: payload.original_language,
    };

    let note = state.notes.update(id, command).await.map_err(note_to_api)?;
    Ok(Json(note_response(note)))
}

pub async fn delete_note(
    State(state): State<ApiState>,
    Path(id): Path<NoteId>,
) -> Result<impl IntoResponse, ApiError> {
    state.notes.delete(id).await.map_err(note_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn translate_note(
    State(state): State<ApiState>,
    Path(id): Path<NoteId>,
    Json(payload): Json<TranslateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .notes
        .translate(id, &payload.target_language)
        .await
        .map_err(note_to_api)?;

    match outcome {
        TranslationOutcome::Translated(translated) => Ok(Json(translation_response(translated))),
        TranslationOutcome::NoOp { language } => Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::SAME_LANGUAGE,
            "Target language matches the original language",
            Some(format!("note is already written in `{language}`")),
        )),
        TranslationOutcome::Unavailable { reason } => Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::TRANSLATION_UNAVAILABLE,
            "Translation service unavailable",
            Some(reason),
        )),
        TranslationOutcome::Failed(err) => Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::TRANSLATION_FAILED,
            "Translation failed",
            Some(err.to_string()),
        )),
    }
}

pub async fn upload_note(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut title = None;
    let mut original_language = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request("invalid multipart payload", Some(err.to_string())))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|err| {
                    ApiError::bad_request("failed to read upload", Some(err.to_string()))
                })?;
                file = Some((filename, data));
            }
            Some("title") => {
                title = Some(read_text_field(field).await?);
            }
            Some("original_language") => {
                original_language = Some(read_text_field(field).await?);
            }
            _ => {}
        }
    }

    let (filename, content) = file.ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::VALIDATION,
            "Validation failed",
            Some("invalid `file`: a .txt file is required".to_string()),
        )
    })?;

    let command = UploadNoteCommand {
        filename,
        content,
        title: title.filter(|value: &String| !value.trim().is_empty()),
        original_language: original_language.filter(|value: &String| !value.trim().is_empty()),
    };

    let note = state.notes.upload(command).await.map_err(note_to_api)?;
    Ok((StatusCode::CREATED, Json(note_response(note))))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|err| ApiError::bad_request("invalid multipart field", Some(err.to_string())))
}
