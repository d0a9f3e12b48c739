//! Two-letter language codes.

use std::fmt;

use crate::domain::error::DomainError;

/// Language assumed for notes created without one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A validated, lowercased two-letter language code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Accepts exactly two ASCII letters in any case.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, DomainError> {
        let mut chars = raw.chars();
        let valid = matches!(
            (chars.next(), chars.next(), chars.next()),
            (Some(a), Some(b), None) if a.is_ascii_alphabetic() && b.is_ascii_alphabetic()
        );
        if !valid {
            return Err(DomainError::validation(
                field,
                format!("`{raw}` is not a two-letter language code"),
            ));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Parses `raw` when present, otherwise falls back to [`DEFAULT_LANGUAGE`].
    pub fn parse_or_default(field: &'static str, raw: Option<&str>) -> Result<Self, DomainError> {
        match raw {
            Some(value) => Self::parse(field, value),
            None => Ok(Self(DEFAULT_LANGUAGE.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
