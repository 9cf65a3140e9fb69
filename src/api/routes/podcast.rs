//! Podcast handlers

use crate::api::AppState;
use crate::error::Error;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

/// GET /podcast/episodes - Normalized podcast episodes
///
/// Always 200; a feed failure shows up as an empty list plus `error`.
#[utoipa::path(
    get,
    path = "/podcast/episodes",
    tag = "podcast",
    responses(
        (status = 200, description = "Episodes in feed order", body = crate::types::PodcastEpisodesResult)
    )
)]
pub async fn list_episodes(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.feeds.get_podcast_episodes_safe().await)
}

/// GET /podcast/episodes/:slug - Single episode
#[utoipa::path(
    get,
    path = "/podcast/episodes/{slug}",
    tag = "podcast",
    params(
        ("slug" = String, Path, description = "Episode slug, e.g. 2024-01-01-pilot-episode")
    ),
    responses(
        (status = 200, description = "The episode", body = crate::types::PodcastEpisode),
        (status = 404, description = "No episode with this slug", body = crate::error::ApiError)
    )
)]
pub async fn get_episode(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, Error> {
    match state.feeds.find_episode(&slug).await {
        Some(episode) => Ok(Json(episode)),
        None => Err(Error::NotFound(format!("episode '{}'", slug))),
    }
}
