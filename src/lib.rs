//! # site-feeds
//!
//! Content aggregation backend for a podcast website: podcast episodes from
//! an RSS feed and YouTube uploads from either the Data API or the public
//! channel feed, normalized into typed records the site's pages render.
//!
//! ## Design Philosophy
//!
//! site-feeds is designed to be:
//! - **Page-safe** - the `*_safe` entry points never fail; they degrade to a
//!   last-known-good snapshot or an explicit "unavailable" state
//! - **Cache-aside** - upstream responses are kept for 30 minutes by default
//! - **Library-first** - the JSON API in [`api`] is a thin layer over [`SiteFeeds`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use site_feeds::{Config, SiteFeeds};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let feeds = SiteFeeds::new(config)?;
//!
//!     let uploads = feeds.get_youtube_uploads_safe().await;
//!     for video in &uploads.featured {
//!         println!("{} {}", video.title, video.url);
//!     }
//!
//!     let podcast = feeds.get_podcast_episodes_safe().await;
//!     if let Some(message) = podcast.error {
//!         println!("{message}");
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// JSON API module
pub mod api;
/// TTL cache and last-known-good snapshot storage
pub mod cache;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Podcast RSS normalization
pub mod podcast;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;
/// YouTube channel resolution, upload strategies and shorts matching
pub mod youtube;

// Re-export commonly used types
pub use cache::{InMemorySnapshotStore, SnapshotStore, TtlCache};
pub use config::{ApiConfig, Config, HttpConfig, PodcastConfig, RetryConfig, YouTubeConfig};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use podcast::PodcastService;
pub use types::{
    LastKnownGoodEntry, PodcastEpisode, PodcastEpisodesResult, UploadSource, UploadsResult, Video,
};
pub use youtube::{UploadsSource, YouTubeService};

use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Everything a page needs in one response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageSnapshot {
    /// Podcast episodes, or the unavailable message
    pub podcast: PodcastEpisodesResult,

    /// YouTube featured episodes and shorts
    pub youtube: UploadsResult,
}

/// Entry point tying the podcast and YouTube services to one configuration
///
/// Both services share a single HTTP client built from [`HttpConfig`], so the
/// request and connect timeouts apply to every upstream call.
pub struct SiteFeeds {
    config: Arc<Config>,
    podcast: PodcastService,
    youtube: YouTubeService,
}

impl SiteFeeds {
    /// Create the services with an in-process snapshot store
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_snapshot_store(config, Arc::new(InMemorySnapshotStore::new()))
    }

    /// Create the services with a caller-provided snapshot store
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_snapshot_store(config: Config, snapshots: Arc<dyn SnapshotStore>) -> Result<Self> {
        let client = utils::build_http_client(&config.http)?;

        let podcast = PodcastService::new(client.clone(), &config.podcast);
        let youtube = YouTubeService::new(&config, client, snapshots);

        tracing::info!(
            podcast_feed = %config.podcast.rss_url,
            youtube_source = %youtube.source(),
            "site-feeds initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            podcast,
            youtube,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The podcast service
    pub fn podcast(&self) -> &PodcastService {
        &self.podcast
    }

    /// The YouTube service
    pub fn youtube(&self) -> &YouTubeService {
        &self.youtube
    }

    /// Podcast episodes for the podcast page; never fails
    pub async fn get_podcast_episodes_safe(&self) -> PodcastEpisodesResult {
        self.podcast.get_podcast_episodes_safe().await
    }

    /// A single podcast episode by slug
    pub async fn find_episode(&self, slug: &str) -> Option<PodcastEpisode> {
        self.podcast.find_episode(slug).await
    }

    /// YouTube featured episodes and shorts; never fails
    pub async fn get_youtube_uploads_safe(&self) -> UploadsResult {
        self.youtube.get_uploads_safe().await
    }

    /// Podcast and YouTube data resolved concurrently
    pub async fn page_snapshot(&self) -> PageSnapshot {
        let (podcast, youtube) = futures::join!(
            self.get_podcast_episodes_safe(),
            self.get_youtube_uploads_safe()
        );
        PageSnapshot { podcast, youtube }
    }
}

/// Resolves when the process receives a termination signal
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Used by [`api::start_api_server`] for graceful shutdown.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

/// Resolves when the process receives Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
