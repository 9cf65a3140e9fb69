//! Whole-page handlers

use crate::api::AppState;
use axum::{Json, extract::State, response::IntoResponse};

/// GET /page - Podcast and YouTube data resolved together
#[utoipa::path(
    get,
    path = "/page",
    tag = "pages",
    responses(
        (status = 200, description = "Podcast episodes and YouTube uploads", body = crate::PageSnapshot)
    )
)]
pub async fn get_page_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.feeds.page_snapshot().await)
}
