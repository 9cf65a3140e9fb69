//! JSON API server module
//!
//! Exposes the page-facing aggregates of [`SiteFeeds`] over HTTP with an
//! OpenAPI 3.1 description.

use crate::{Config, Result, SiteFeeds};
use axum::{Router, http::HeaderValue, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Podcast
/// - `GET /podcast/episodes` - Normalized episodes, or the unavailable message
/// - `GET /podcast/episodes/:slug` - Single episode by slug
///
/// ## YouTube
/// - `GET /youtube/uploads` - Featured episodes and shorts
///
/// ## Pages
/// - `GET /page` - Podcast and YouTube data in one response
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
pub fn create_router(feeds: Arc<SiteFeeds>, config: Arc<Config>) -> Router {
    let state = AppState::new(feeds);

    let router = Router::new()
        // Podcast
        .route("/podcast/episodes", get(routes::list_episodes))
        .route("/podcast/episodes/:slug", get(routes::get_episode))
        // YouTube
        .route("/youtube/uploads", get(routes::get_uploads))
        // Pages
        .route("/page", get(routes::get_page_snapshot))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.server.cors_enabled {
        let cors = build_cors_layer(&config.server.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin. Only `GET` is exposed.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    if allow_any || origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until [`shutdown_signal`](crate::shutdown_signal) resolves.
///
/// # Example
///
/// ```no_run
/// use site_feeds::{Config, SiteFeeds};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::from_env()?);
/// let feeds = Arc::new(SiteFeeds::new((*config).clone())?);
///
/// // Start API server (blocks until shutdown)
/// site_feeds::api::start_api_server(feeds, config).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// Returns error if the address cannot be bound or the server fails.
pub async fn start_api_server(feeds: Arc<SiteFeeds>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(feeds, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::shutdown_signal())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
