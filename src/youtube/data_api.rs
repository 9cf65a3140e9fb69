//! YouTube Data API v3 strategy
//!
//! The channel's uploads playlist is the enumeration source:
//! `channels` gives the playlist ID, `playlistItems` is walked page by page
//! for video IDs, and `videos` returns snippet, duration and statistics for
//! up to 50 IDs per call.

use super::UploadsSource;
use super::normalize::{extract_episode_key, is_short_duration, parse_duration_to_seconds, watch_url};
use crate::config::YouTubeConfig;
use crate::error::Result;
use crate::types::{UploadSource, Video};
use crate::utils::{ensure_success, parse_feed_date};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Maximum page size for `playlistItems` and ID count for `videos`
pub const API_BATCH_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(rename = "nextPageToken", default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: Option<String>,
    snippet: Option<VideoSnippet>,
    content_details: Option<VideoContentDetails>,
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
}

/// Uploads from the Data API, with durations and view counts
pub struct DataApiUploads {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_pages: u32,
}

impl DataApiUploads {
    /// Create an API strategy using `api_key` against `youtube.api_base_url`
    pub fn new(client: reqwest::Client, config: &YouTubeConfig, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_pages: config.effective_max_pages(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<T> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, resource))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("key", &self.api_key);

        // The URL carries the API key; keep it out of transport errors
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let response = ensure_success(response, context)?;
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn uploads_playlist_id(&self, channel_id: &str) -> Result<Option<String>> {
        let channels: ListResponse<ChannelItem> = self
            .get_json(
                "channels",
                &[("part", "contentDetails"), ("id", channel_id)],
                "YouTube channels API",
            )
            .await?;

        Ok(channels
            .items
            .into_iter()
            .next()
            .and_then(|item| item.content_details)
            .and_then(|details| details.related_playlists)
            .and_then(|playlists| playlists.uploads)
            .filter(|id| !id.is_empty()))
    }

    /// Walk the uploads playlist, returning unique video IDs in first-seen order
    async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        let page_size = API_BATCH_SIZE.to_string();
        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        let mut page_token: Option<String> = None;

        for page in 0..self.max_pages {
            let mut params = vec![
                ("part", "contentDetails"),
                ("playlistId", playlist_id),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response: ListResponse<PlaylistItem> = self
                .get_json("playlistItems", &params, "YouTube playlistItems API")
                .await?;

            for id in response
                .items
                .into_iter()
                .filter_map(|item| item.content_details.and_then(|d| d.video_id))
                .filter(|id| !id.is_empty())
            {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }

            debug!(page = page + 1, collected = ids.len(), "Fetched uploads playlist page");

            page_token = response.next_page_token.filter(|token| !token.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        Ok(ids)
    }

    async fn video_details(&self, ids: &[String]) -> Result<Vec<Video>> {
        let joined = ids.join(",");
        let response: ListResponse<VideoItem> = self
            .get_json(
                "videos",
                &[("part", "snippet,contentDetails,statistics"), ("id", joined.as_str())],
                "YouTube videos API",
            )
            .await?;

        Ok(response.items.into_iter().filter_map(to_video).collect())
    }
}

#[async_trait]
impl UploadsSource for DataApiUploads {
    async fn fetch_uploads(&self, channel_id: &str) -> Result<Vec<Video>> {
        let Some(playlist_id) = self.uploads_playlist_id(channel_id).await? else {
            debug!(channel_id = %channel_id, "Channel has no uploads playlist");
            return Ok(Vec::new());
        };

        let ids = self.playlist_video_ids(&playlist_id).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut videos = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(API_BATCH_SIZE) {
            videos.extend(self.video_details(chunk).await?);
        }

        videos.sort_by_key(|video| std::cmp::Reverse(video.timestamp_millis()));
        Ok(videos)
    }

    fn source(&self) -> UploadSource {
        UploadSource::LiveApi
    }
}

fn to_video(item: VideoItem) -> Option<Video> {
    let id = item.id.filter(|id| !id.is_empty())?;
    let snippet = item.snippet;
    let title = snippet
        .as_ref()
        .and_then(|s| s.title.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string();
    if title.is_empty() {
        return None;
    }

    let description = snippet
        .as_ref()
        .and_then(|s| s.description.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string();
    let published_at = snippet
        .as_ref()
        .and_then(|s| s.published_at.as_deref())
        .and_then(parse_feed_date);

    let seconds = parse_duration_to_seconds(
        item.content_details
            .as_ref()
            .and_then(|details| details.duration.as_deref()),
    );
    let view_count = item
        .statistics
        .and_then(|stats| stats.view_count)
        .and_then(|views| views.trim().parse::<u64>().ok())
        .unwrap_or(0);

    Some(Video {
        episode_key: extract_episode_key(&title, &description),
        url: watch_url(&id),
        title,
        description: (!description.is_empty()).then_some(description),
        published_at,
        is_short: is_short_duration(seconds),
        duration_seconds: (seconds > 0).then_some(seconds),
        view_count: Some(view_count),
    })
}
