//! Plain-text upload parsing.
//!
//! An upload becomes a note: the body is the decoded file content and the
//! title is taken from the form or, failing that, derived from the filename.

use crate::domain::error::DomainError;
use crate::domain::language::LanguageCode;
use crate::domain::notes::{validate_text, validate_title};

pub const TEXT_UPLOAD_EXTENSION: &str = ".txt";

/// Fields of a note derived from an uploaded text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUpload {
    pub title: String,
    pub text: String,
    pub original_language: LanguageCode,
}

/// Validate and decode an uploaded `.txt` file.
pub fn parse_text_upload(
    filename: &str,
    content: &[u8],
    max_bytes: usize,
    title: Option<&str>,
    language: Option<&str>,
) -> Result<TextUpload, DomainError> {
    if !has_text_extension(filename) {
        return Err(DomainError::validation(
            "file",
            format!("`{filename}` is not a {TEXT_UPLOAD_EXTENSION} file"),
        ));
    }
    if content.len() > max_bytes {
        return Err(DomainError::validation(
            "file",
            format!(
                "file is {} bytes; the limit is {max_bytes} bytes",
                content.len()
            ),
        ));
    }

    let text = validate_text(&decode_text(content))
        .map_err(|_| DomainError::validation("file", "file contains no text"))?;

    let title = match title.map(str::trim).filter(|value| !value.is_empty()) {
        Some(explicit) => validate_title(explicit)?,
        None => validate_title(&title_from_filename(filename))?,
    };

    let original_language = LanguageCode::parse_or_default(
        "original_language",
        language.map(str::trim).filter(|value| !value.is_empty()),
    )?;

    Ok(TextUpload {
        title,
        text,
        original_language,
    })
}

fn has_text_extension(filename: &str) -> bool {
    filename
        .to_ascii_lowercase()
        .ends_with(TEXT_UPLOAD_EXTENSION)
}

/// Decode UTF-8, dropping byte sequences that are not valid UTF-8.
pub fn decode_text(content: &[u8]) -> String {
    let mut decoded = String::with_capacity(content.len());
    for chunk in content.utf8_chunks() {
        decoded.push_str(chunk.valid());
    }
    decoded
}

/// `weekly_team_notes.txt` becomes `Weekly Team Notes`.
pub fn title_from_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = if has_text_extension(base) {
        &base[..base.len() - TEXT_UPLOAD_EXTENSION.len()]
    } else {
        base
    };
    title_case(&stem.replace('_', " "))
}

// Uppercase the first letter of every run of letters, lowercase the rest.
fn title_case(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut inside_word = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if inside_word {
                output.extend(ch.to_lowercase());
            } else {
                output.extend(ch.to_uppercase());
            }
            inside_word = true;
        } else {
            output.push(ch);
            inside_word = false;
        }
    }
    output
}
