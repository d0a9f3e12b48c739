//! Conversions from application records to wire types.

use parlance_api_types::{
    CacheInfoResponse, LanguageBreakdown, LanguageCountResponse, NoteResponse, StatsResponse,
    TranslationResponse,
};

use crate::application::analytics::CacheReport;
use crate::application::notes::TranslatedNote;
use crate::domain::entities::{NoteRecord, NoteStats};

pub fn note_response(note: NoteRecord) -> NoteResponse {
    NoteResponse {
        id: note.id,
        title: note.title,
        text: note.text,
        original_language: note.original_language,
        translated_text: note.translated_text,
        translated_language: note.translated_language,
        created_at: note.created_at,
        updated_at: note.updated_at,
    }
}

pub fn translation_response(translated: TranslatedNote) -> TranslationResponse {
    let TranslatedNote { note, cached } = translated;
    TranslationResponse {
        id: note.id,
        title: note.title,
        original_text: note.text,
        original_language: note.original_language,
        translated_text: note.translated_text,
        translated_language: note.translated_language,
        cached,
    }
}

pub fn stats_response(stats: NoteStats) -> StatsResponse {
    StatsResponse {
        total_notes: stats.total_notes,
        translations_count: stats.translations_count,
        breakdown_by_language: LanguageBreakdown(
            stats
                .by_language
                .into_iter()
                .map(|entry| LanguageCountResponse {
                    language: entry.language,
                    count: entry.count,
                })
                .collect(),
        ),
    }
}

pub fn cache_info_response(report: CacheReport) -> CacheInfoResponse {
    let (total_cache_keys, sample_cache_keys) = match report.keys {
        Some(sample) => (Some(sample.total), sample.keys),
        None => (None, Vec::new()),
    };
    CacheInfoResponse {
        backend: report.probe.backend.to_string(),
        reachable: report.probe.reachable,
        probe_passed: report.probe.probe_passed,
        list_ttl_seconds: report.list_ttl.as_secs(),
        note_ttl_seconds: report.note_ttl.as_secs(),
        translation_ttl_seconds: report.translation_ttl.as_secs(),
        total_cache_keys,
        sample_cache_keys,
        detail: report.probe.detail,
    }
}
