//! OpenAPI documentation and schema generation

use utoipa::OpenApi;

/// OpenAPI documentation for the site-feeds JSON API
///
/// Served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "site-feeds API",
        version = "0.1.0",
        description = "Normalized podcast episodes and YouTube uploads for the podcast website",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8787", description = "Local development server")
    ),
    paths(
        // Podcast
        crate::api::routes::list_episodes,
        crate::api::routes::get_episode,

        // YouTube
        crate::api::routes::get_uploads,

        // Pages
        crate::api::routes::get_page_snapshot,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::Video,
        crate::types::PodcastEpisode,
        crate::types::PodcastEpisodesResult,
        crate::types::UploadsResult,
        crate::PageSnapshot,
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "podcast", description = "Podcast episodes normalized from the RSS feed"),
        (name = "youtube", description = "YouTube featured episodes and shorts"),
        (name = "pages", description = "Aggregates for whole pages"),
        (name = "system", description = "Health check and OpenAPI spec"),
    )
)]
pub struct ApiDoc;
