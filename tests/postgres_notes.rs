//! Postgres repository behaviour. Needs `DATABASE_URL` pointing at a server
//! where `sqlx::test` may create scratch databases.

use std::collections::HashSet;

use sqlx::PgPool;

use parlance::application::repos::{
    CreateNoteParams, NotesRepo, NotesWriteRepo, RepoError, UpdateNoteParams,
    UpdateTranslationParams,
};
use parlance::infra::db::PostgresRepositories;

fn params(title: &str, text: &str, language: &str) -> CreateNoteParams {
    CreateNoteParams {
        title: title.to_string(),
        text: text.to_string(),
        original_language: language.to_string(),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn notes_indexes_exist(pool: PgPool) {
    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT indexname FROM pg_indexes WHERE schemaname = 'public' AND tablename = 'notes'",
    )
    .fetch_all(&pool)
    .await
    .expect("fetch note indexes");

    let indexes: HashSet<String> = rows.into_iter().collect();
    assert!(indexes.contains("notes_created_at_idx"));
    assert!(indexes.contains("notes_original_language_idx"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn create_find_update_delete(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);

    let created = repos
        .create_note(params("Groceries", "milk", "en"))
        .await
        .expect("create");
    assert!(created.translated_text.is_none());

    let found = repos
        .find_by_id(created.id)
        .await
        .expect("find")
        .expect("note exists");
    assert_eq!(found, created);

    let updated = repos
        .update_note(UpdateNoteParams {
            id: created.id,
            title: None,
            text: Some("oat milk".to_string()),
            original_language: None,
        })
        .await
        .expect("update");
    assert_eq!(updated.title, "Groceries");
    assert_eq!(updated.text, "oat milk");
    assert!(updated.updated_at >= created.updated_at);

    assert!(repos.delete_note(created.id).await.expect("delete"));
    assert!(!repos.delete_note(created.id).await.expect("second delete"));
    assert!(repos.find_by_id(created.id).await.expect("find").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn missing_note_updates_report_not_found(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);

    let err = repos
        .update_note(UpdateNoteParams {
            id: 404,
            title: Some("x".to_string()),
            text: None,
            original_language: None,
        })
        .await
        .expect_err("missing note");
    assert!(matches!(err, RepoError::NotFound));

    let err = repos
        .update_translation(UpdateTranslationParams {
            id: 404,
            translated_text: "hola".to_string(),
            translated_language: "es".to_string(),
        })
        .await
        .expect_err("missing note");
    assert!(matches!(err, RepoError::NotFound));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn translation_pair_is_written_together(pool: PgPool) {
    let repos = PostgresRepositories::new(pool.clone());
    let note = repos
        .create_note(params("Hello", "hello", "en"))
        .await
        .expect("create");

    let translated = repos
        .update_translation(UpdateTranslationParams {
            id: note.id,
            translated_text: "hola".to_string(),
            translated_language: "es".to_string(),
        })
        .await
        .expect("translate");
    assert_eq!(translated.text, "hello");
    assert_eq!(translated.translated_text.as_deref(), Some("hola"));
    assert_eq!(translated.translated_language.as_deref(), Some("es"));

    let err = sqlx::query("UPDATE notes SET translated_language = NULL WHERE id = $1")
        .bind(note.id)
        .execute(&pool)
        .await
        .expect_err("half a translation pair");
    assert!(matches!(
        parlance::infra::db::map_sqlx_error(err),
        RepoError::Integrity { .. }
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn list_and_stats(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let first = repos
        .create_note(params("A", "a", "fr"))
        .await
        .expect("create");
    repos
        .create_note(params("B", "b", "fr"))
        .await
        .expect("create");
    let last = repos
        .create_note(params("C", "c", "en"))
        .await
        .expect("create");
    repos
        .update_translation(UpdateTranslationParams {
            id: first.id,
            translated_text: "a".to_string(),
            translated_language: "de".to_string(),
        })
        .await
        .expect("translate");

    let listed = repos.list_notes().await.expect("list");
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].id, last.id);

    let stats = repos.note_stats().await.expect("stats");
    assert_eq!(stats.total_notes, 3);
    assert_eq!(stats.translations_count, 1);
    assert_eq!(stats.by_language[0].language, "fr");
    assert_eq!(stats.by_language[0].count, 2);
    assert_eq!(stats.by_language[1].language, "en");

    repos.health_check().await.expect("healthy");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn oversized_title_is_invalid_input(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let err = repos
        .create_note(params(&"t".repeat(201), "x", "en"))
        .await
        .expect_err("title too long");
    assert!(matches!(err, RepoError::InvalidInput { .. }));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn empty_translation_is_not_counted(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let note = repos
        .create_note(params("Blank", "...", "en"))
        .await
        .expect("create");
    repos
        .update_translation(UpdateTranslationParams {
            id: note.id,
            translated_text: String::new(),
            translated_language: "fr".to_string(),
        })
        .await
        .expect("translate");

    let stats = repos.note_stats().await.expect("stats");
    assert_eq!(stats.total_notes, 1);
    assert_eq!(stats.translations_count, 0);
}
