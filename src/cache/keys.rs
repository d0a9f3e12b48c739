//! Cache key definitions.
//!
//! Keys render to the logical strings shared by every instance of the
//! service: `list`, `note:{id}` and `translation:{id}:{lang}`.

use std::fmt;

use crate::domain::entities::NoteId;
use crate::domain::language::LanguageCode;

/// Reserved key written by the cache-info probe.
pub const PROBE_KEY: &str = "probe:cache-info";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NoteCacheKey {
    /// Every note, newest first.
    List,
    /// A single note by id.
    Note(NoteId),
    /// A translated pair for one note and target language.
    Translation { note_id: NoteId, language: String },
}

impl NoteCacheKey {
    pub fn translation(note_id: NoteId, language: &LanguageCode) -> Self {
        Self::Translation {
            note_id,
            language: language.as_str().to_string(),
        }
    }

    /// Metric label for the key family.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Note(_) => "note",
            Self::Translation { .. } => "translation",
        }
    }
}

impl fmt::Display for NoteCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Note(id) => write!(f, "note:{id}"),
            Self::Translation { note_id, language } => {
                write!(f, "translation:{note_id}:{language}")
            }
        }
    }
}
