//! Analytics handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::repo_to_api;
use crate::application::error::ErrorReport;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{cache_info_response, stats_response};
use crate::infra::http::api::state::ApiState;

pub async fn note_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.analytics.stats().await.map_err(repo_to_api)?;
    Ok(Json(stats_response(stats)))
}

/// Probe the cache backend. An unhealthy backend answers 503 with the same body.
pub async fn cache_info(State(state): State<ApiState>) -> Response {
    let report = state.analytics.cache_info().await;
    let healthy = report.is_healthy();
    let detail = report.probe.detail.clone();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let mut response = (status, Json(cache_info_response(report))).into_response();
    if !healthy {
        ErrorReport::from_message(
            "infra::http::api::cache_info",
            status,
            detail.unwrap_or_else(|| "cache probe failed".to_string()),
        )
        .attach(&mut response);
    }
    response
}
