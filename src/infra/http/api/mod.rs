pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Multipart framing around the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_api_router(state: ApiState) -> Router {
    let upload_limit = state
        .notes
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/api/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route(
            "/api/notes/upload",
            post(handlers::upload_note).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/notes/{id}",
            get(handlers::get_note)
                .put(handlers::replace_note)
                .patch(handlers::patch_note)
                .delete(handlers::delete_note),
        )
        .route("/api/notes/{id}/translate", post(handlers::translate_note))
        .route("/api/analytics/stats", get(handlers::note_stats))
        .route("/api/analytics/cache-info", get(handlers::cache_info))
        .with_state(state)
}
