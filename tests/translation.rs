//! Translation flow: provider reuse, no-op detection, failures and staleness.

mod support;

use std::sync::Arc;
use std::time::Duration;

use parlance::application::notes::{NoteError, NoteServiceOptions, TranslationOutcome};
use parlance::application::translator::TranslatorError;
use parlance::cache::{CacheConfig, CacheStore};
use parlance::domain::error::DomainError;
use parlance::domain::language::LanguageCode;

use support::{
    CountingTranslator, FailingTranslator, Harness, InMemoryNotes, SlowTranslator, available,
    memory_store, unavailable,
};

#[tokio::test]
async fn second_translation_reuses_cached_result() {
    let provider = CountingTranslator::new();
    let harness = Harness::new(available(provider.clone()));
    let note = harness.create("Greeting", "hello", None).await;

    let first = harness.service.translate(note.id, "de").await.expect("translate");
    let TranslationOutcome::Translated(first) = first else {
        panic!("expected a translation, got {first:?}");
    };
    assert!(!first.cached);
    assert_eq!(first.note.translated_text.as_deref(), Some("[de] hello"));
    assert_eq!(first.note.translated_language.as_deref(), Some("de"));

    let second = harness.service.translate(note.id, "DE").await.expect("translate");
    let TranslationOutcome::Translated(second) = second else {
        panic!("expected a translation, got {second:?}");
    };
    assert!(second.cached);
    assert_eq!(second.note.translated_text.as_deref(), Some("[de] hello"));

    assert_eq!(provider.calls(), 1);
    assert_eq!(harness.repo.translation_writes(), 2);
}

#[tokio::test]
async fn translating_into_original_language_is_a_no_op() {
    let provider = CountingTranslator::new();
    let harness = Harness::new(available(provider.clone()));
    let note = harness.create("Bonjour", "salut", Some("fr")).await;
    let writes_before = harness.repo.writes();

    let outcome = harness.service.translate(note.id, "FR").await.expect("translate");

    assert!(matches!(outcome, TranslationOutcome::NoOp { ref language } if language == "fr"));
    assert_eq!(provider.calls(), 0);
    assert_eq!(harness.repo.writes(), writes_before);
    let french = LanguageCode::parse("language", "fr").expect("valid code");
    assert!(harness.cache.load_translation(note.id, &french).await.is_none());
}

#[tokio::test]
async fn missing_provider_reports_unavailable_without_writes() {
    let harness = Harness::new(unavailable());
    let note = harness.create("Plain", "text", None).await;
    let writes_before = harness.repo.writes();

    let outcome = harness.service.translate(note.id, "es").await.expect("translate");

    assert!(matches!(outcome, TranslationOutcome::Unavailable { .. }));
    assert_eq!(harness.repo.writes(), writes_before);
}

#[tokio::test]
async fn provider_failure_leaves_note_untouched() {
    let provider = FailingTranslator::new();
    let harness = Harness::new(available(provider.clone()));
    let note = harness.create("Fragile", "text", None).await;
    let writes_before = harness.repo.writes();

    let outcome = harness.service.translate(note.id, "it").await.expect("translate");

    assert!(matches!(
        outcome,
        TranslationOutcome::Failed(TranslatorError::Rejected { status: 502, .. })
    ));
    assert_eq!(provider.calls(), 1);
    assert_eq!(harness.repo.writes(), writes_before);
    let stored = harness.repo.stored(note.id).expect("stored");
    assert!(stored.translated_text.is_none());
    assert!(stored.translated_language.is_none());
}

#[tokio::test(start_paused = true)]
async fn slow_provider_times_out() {
    let store: Arc<dyn CacheStore> = memory_store();
    let harness = Harness::build(
        InMemoryNotes::new(),
        Some(store),
        available(Arc::new(SlowTranslator {
            delay: Duration::from_secs(30),
        })),
        CacheConfig::default(),
        NoteServiceOptions {
            translation_timeout: Duration::from_secs(2),
            ..Default::default()
        },
    );
    let note = harness.create("Patience", "text", None).await;
    let writes_before = harness.repo.writes();

    let outcome = harness.service.translate(note.id, "ja").await.expect("translate");

    assert!(matches!(
        outcome,
        TranslationOutcome::Failed(TranslatorError::Timeout(timeout))
            if timeout == Duration::from_secs(2)
    ));
    assert_eq!(harness.repo.writes(), writes_before);
}

#[tokio::test]
async fn invalid_target_and_missing_note_are_errors() {
    let provider = CountingTranslator::new();
    let harness = Harness::new(available(provider.clone()));
    let note = harness.create("Any", "text", None).await;

    for target in ["", "deu", "d3", " de"] {
        let err = harness
            .service
            .translate(note.id, target)
            .await
            .expect_err("invalid target");
        assert!(matches!(
            err,
            NoteError::Domain(DomainError::Validation {
                field: "target_language",
                ..
            })
        ));
    }

    let err = harness.service.translate(999, "de").await.expect_err("missing");
    assert!(matches!(err, NoteError::NotFound(999)));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn translation_evicts_cached_note() {
    let harness = Harness::new(available(CountingTranslator::new()));
    let note = harness.create("Evict", "text", None).await;
    harness.service.read_one(note.id).await.expect("prime");

    harness.service.translate(note.id, "pt").await.expect("translate");

    let fetched = harness.service.read_one(note.id).await.expect("refetch");
    assert_eq!(fetched.translated_text.as_deref(), Some("[pt] text"));
}

#[tokio::test]
async fn list_stays_stale_after_translation_by_default() {
    let harness = Harness::new(available(CountingTranslator::new()));
    let note = harness.create("Listed", "text", None).await;
    harness.service.read_list().await.expect("prime list");

    harness.service.translate(note.id, "nl").await.expect("translate");

    let listed = harness.service.read_list().await.expect("list");
    assert!(listed[0].translated_text.is_none());
}

#[tokio::test]
async fn list_can_be_invalidated_on_translation() {
    let store: Arc<dyn CacheStore> = memory_store();
    let harness = Harness::with_store(
        Some(store),
        available(CountingTranslator::new()),
        CacheConfig {
            invalidate_list_on_translate: true,
            ..Default::default()
        },
    );
    let note = harness.create("Listed", "text", None).await;
    harness.service.read_list().await.expect("prime list");

    harness.service.translate(note.id, "nl").await.expect("translate");

    let listed = harness.service.read_list().await.expect("list");
    assert_eq!(listed[0].translated_text.as_deref(), Some("[nl] text"));
}

#[tokio::test]
async fn switching_target_language_calls_provider_again() {
    let provider = CountingTranslator::new();
    let harness = Harness::new(available(provider.clone()));
    let note = harness.create("Multi", "text", None).await;

    harness.service.translate(note.id, "de").await.expect("de");
    harness.service.translate(note.id, "fr").await.expect("fr");
    let back = harness.service.translate(note.id, "de").await.expect("de again");

    assert_eq!(provider.calls(), 2);
    let TranslationOutcome::Translated(back) = back else {
        panic!("expected a translation");
    };
    assert!(back.cached);
    assert_eq!(back.note.translated_language.as_deref(), Some("de"));
}
