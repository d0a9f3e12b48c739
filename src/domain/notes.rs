//! Field rules for notes.

use crate::domain::error::DomainError;

pub const TITLE_MAX_CHARS: usize = 200;

/// Trims the title and enforces `1..=TITLE_MAX_CHARS` characters.
pub fn validate_title(raw: &str) -> Result<String, DomainError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(DomainError::validation("title", "title must not be empty"));
    }
    let length = title.chars().count();
    if length > TITLE_MAX_CHARS {
        return Err(DomainError::validation(
            "title",
            format!("title is {length} characters; the limit is {TITLE_MAX_CHARS}"),
        ));
    }
    Ok(title.to_string())
}

/// Trims the body and rejects empty text.
pub fn validate_text(raw: &str) -> Result<String, DomainError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DomainError::validation("text", "text must not be empty"));
    }
    Ok(text.to_string())
}
