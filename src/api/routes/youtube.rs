//! YouTube handlers

use crate::api::AppState;
use axum::{Json, extract::State, response::IntoResponse};

/// GET /youtube/uploads - Featured episodes and shorts
///
/// Always 200; `liveAvailable` is false when nothing live or cached exists.
#[utoipa::path(
    get,
    path = "/youtube/uploads",
    tag = "youtube",
    responses(
        (status = 200, description = "Featured episodes and shorts", body = crate::types::UploadsResult)
    )
)]
pub async fn get_uploads(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.feeds.get_youtube_uploads_safe().await)
}
