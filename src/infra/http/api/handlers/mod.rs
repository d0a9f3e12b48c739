//! API handlers organized by resource.
//!
//! Error conversions shared by the handlers live here.

mod analytics;
mod notes;

pub use analytics::*;
pub use notes::*;

use axum::http::StatusCode;

use crate::application::notes::NoteError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("resource not found", None),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

pub(crate) fn domain_to_api(err: DomainError) -> ApiError {
    match err {
        DomainError::Validation { .. } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::VALIDATION,
            "Validation failed",
            Some(err.to_string()),
        ),
        DomainError::Invariant { .. } => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Stored record is inconsistent",
            Some(err.to_string()),
        ),
    }
}

pub(crate) fn note_to_api(err: NoteError) -> ApiError {
    match err {
        NoteError::Domain(domain) => domain_to_api(domain),
        NoteError::NotFound(id) => {
            ApiError::not_found("note not found", Some(format!("no note with id {id}")))
        }
        NoteError::Repo(repo) => repo_to_api(repo),
    }
}
