//! YouTube uploads resolution
//!
//! [`YouTubeService::get_uploads_safe`] drives the whole pipeline:
//!
//! 1. resolve the channel ID ([`channel`])
//! 2. fetch uploads through the Data API when an API key is configured
//!    ([`data_api`]), otherwise through the public feed ([`feed`])
//! 3. split them into featured episodes and shorts ([`matcher`])
//! 4. store the result as the channel's last-known-good snapshot
//!
//! Any failure in steps 2-3 falls back to that snapshot, or to an empty
//! result when there is none. The method never returns an error.

pub mod channel;
pub mod data_api;
pub mod feed;
pub mod matcher;
pub mod normalize;

use crate::cache::{SnapshotStore, TtlCache};
use crate::config::{Config, YouTubeConfig};
use crate::error::Result;
use crate::types::{UploadSource, UploadsResult, Video};
use async_trait::async_trait;
use channel::{ChannelIdResolver, HandlePageScraper};
use chrono::Utc;
use data_api::DataApiUploads;
use feed::FeedUploads;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// A strategy that lists a channel's uploads
#[async_trait]
pub trait UploadsSource: Send + Sync {
    /// Fetch the channel's uploads
    ///
    /// # Errors
    /// Fails on network errors, non-2xx responses and undecodable bodies.
    async fn fetch_uploads(&self, channel_id: &str) -> Result<Vec<Video>>;

    /// The log tag for results produced by this strategy
    fn source(&self) -> UploadSource;
}

/// Orchestrates channel resolution, fetching, classification and fallback
pub struct YouTubeService {
    resolver: ChannelIdResolver,
    uploads: Arc<dyn UploadsSource>,
    cache: TtlCache<String, Vec<Video>>,
    snapshots: Arc<dyn SnapshotStore>,
}

impl YouTubeService {
    /// Wire the service from configuration
    ///
    /// The Data API strategy is used when `youtube.api_key` is non-empty,
    /// the public feed otherwise.
    pub fn new(config: &Config, client: reqwest::Client, snapshots: Arc<dyn SnapshotStore>) -> Self {
        let youtube = &config.youtube;
        let scraper = Arc::new(HandlePageScraper::new(client.clone(), youtube, &config.http));
        let resolver = ChannelIdResolver::new(youtube, scraper);

        Self::from_parts(
            resolver,
            select_strategy(youtube, client),
            youtube.cache_ttl,
            snapshots,
        )
    }

    /// Assemble the service from explicit parts
    pub fn from_parts(
        resolver: ChannelIdResolver,
        uploads: Arc<dyn UploadsSource>,
        cache_ttl: Duration,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            resolver,
            uploads,
            cache: TtlCache::new(cache_ttl),
            snapshots,
        }
    }

    /// Which live strategy this service uses
    pub fn source(&self) -> UploadSource {
        self.uploads.source()
    }

    /// Featured episodes and shorts for the configured channel
    ///
    /// Never fails: live data when it can be fetched, the last-known-good
    /// snapshot when it cannot (still reported as live), and an empty result
    /// with `live_available: false` otherwise.
    pub async fn get_uploads_safe(&self) -> UploadsResult {
        let Some(channel_id) = self.resolver.resolve().await else {
            warn!(
                source = %UploadSource::StaticFallback,
                reason = "missing-channel-id",
                "No YouTube channel ID could be resolved"
            );
            return UploadsResult::unavailable();
        };

        match self.get_uploads(&channel_id).await {
            Ok(result) => {
                info!(
                    source = %self.source(),
                    status = "ok",
                    channel_id = %channel_id,
                    featured = result.featured.len(),
                    shorts = result.shorts.len(),
                    "Resolved YouTube uploads"
                );
                self.snapshots
                    .set(&channel_id, result.clone(), Utc::now())
                    .await;
                result
            }
            Err(e) => {
                error!(
                    source = %self.source(),
                    channel_id = %channel_id,
                    error = %e,
                    "Live YouTube uploads resolution failed"
                );
                self.fallback(&channel_id).await
            }
        }
    }

    /// Live resolution for `channel_id`, without any fallback
    ///
    /// # Errors
    /// Propagates the strategy's fetch error.
    pub async fn get_uploads(&self, channel_id: &str) -> Result<UploadsResult> {
        let uploads = self
            .cache
            .get_or_try_insert_with(channel_id.to_string(), || {
                self.uploads.fetch_uploads(channel_id)
            })
            .await?;

        let featured = matcher::select_featured(&uploads);
        let shorts = match self.source() {
            UploadSource::LiveApi => matcher::select_best_shorts_per_episode(&uploads),
            _ => matcher::select_feed_shorts(&uploads),
        };

        Ok(UploadsResult {
            featured,
            shorts,
            live_available: true,
        })
    }

    async fn fallback(&self, channel_id: &str) -> UploadsResult {
        match self.snapshots.get(channel_id).await {
            Some(entry) => {
                let age_ms = (Utc::now() - entry.updated_at).num_milliseconds();
                warn!(
                    source = %UploadSource::LastKnownGood,
                    channel_id = %channel_id,
                    age_ms,
                    "Serving last-known-good YouTube uploads"
                );
                UploadsResult {
                    live_available: true,
                    ..entry.data
                }
            }
            None => {
                warn!(
                    source = %UploadSource::StaticFallback,
                    channel_id = %channel_id,
                    reason = "live-failed-no-last-known-good",
                    "No YouTube uploads available"
                );
                UploadsResult::unavailable()
            }
        }
    }
}

fn select_strategy(youtube: &YouTubeConfig, client: reqwest::Client) -> Arc<dyn UploadsSource> {
    match youtube.api_key() {
        Some(key) => Arc::new(DataApiUploads::new(client, youtube, key)),
        None => Arc::new(FeedUploads::new(client, youtube)),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
