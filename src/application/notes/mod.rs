mod commands;
mod queries;
mod service;
mod translate;
pub mod types;

pub use service::*;
pub use translate::{TRANSLATION_CALLS_TOTAL, TRANSLATION_MS};
pub use types::{
    CreateNoteCommand, NoteError, TranslatedNote, TranslationOutcome, UpdateNoteCommand,
    UploadNoteCommand,
};
