//! Core types for site-feeds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A YouTube upload normalized from either the public feed or the Data API
///
/// `url` is canonical (`/watch?v=<id>` or `/shorts/<id>`) and doubles as the
/// identity of the video.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Trimmed title (never empty)
    pub title: String,

    /// Canonical watch or shorts URL (never empty)
    pub url: String,

    /// Description with whitespace collapsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Publication time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    /// Short-form upload (duration ≤ 180s, or a `#shorts`/`/shorts/` marker on the feed path)
    pub is_short: bool,

    /// Duration in seconds; only known on the Data API path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,

    /// View count; only known on the Data API path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,

    /// Episode marker such as `ep-12` found in the title or description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_key: Option<String>,
}

impl Video {
    /// Publication time in milliseconds since the epoch, 0 when unknown
    pub fn timestamp_millis(&self) -> i64 {
        self.published_at
            .map(|published| published.timestamp_millis())
            .unwrap_or(0)
    }

    /// View count, 0 when unknown
    pub fn views(&self) -> u64 {
        self.view_count.unwrap_or(0)
    }
}

/// A podcast episode normalized from an RSS item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodcastEpisode {
    /// `slugify("<YYYY-MM-DD|undated>-<title>")`
    pub slug: String,

    /// Trimmed title (never empty)
    pub title: String,

    /// ISO-8601 date when parseable, otherwise the raw feed value
    pub date: String,

    /// Plain-text description, at most 280 characters
    pub description: String,

    /// `itunes:duration` as published (e.g. `"01:02:03"` or `"3723"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Enclosure URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,

    /// Episode web page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_url: Option<String>,

    /// `https://open.spotify.com/embed/<type>/<id>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_embed: Option<String>,

    /// `https://www.youtube.com/embed/<id>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_embed: Option<String>,
}

/// Aggregate consumed by the podcast page
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PodcastEpisodesResult {
    /// Episodes in feed order
    pub episodes: Vec<PodcastEpisode>,

    /// User-facing message when the feed could not be loaded
    pub error: Option<String>,
}

/// Aggregate consumed by pages showing YouTube uploads
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadsResult {
    /// Full episodes, newest first
    pub featured: Vec<Video>,

    /// Shorts selected for display
    pub shorts: Vec<Video>,

    /// `false` only when nothing live or cached could be produced
    pub live_available: bool,
}

impl UploadsResult {
    /// The empty, not-live result
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Last successful uploads resolution for one channel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastKnownGoodEntry {
    /// When the snapshot was stored
    pub updated_at: DateTime<Utc>,

    /// The stored result
    pub data: UploadsResult,
}

/// Where an uploads result came from; rendered as the `source` log tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadSource {
    /// Fresh data from the Data API
    LiveApi,
    /// Fresh data from the public feed
    LiveRss,
    /// Served from the last-known-good snapshot
    LastKnownGood,
    /// Nothing available; empty result
    StaticFallback,
}

impl UploadSource {
    /// The log tag for this source
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadSource::LiveApi => "live-api",
            UploadSource::LiveRss => "live-rss",
            UploadSource::LastKnownGood => "last-known-good",
            UploadSource::StaticFallback => "static-fallback",
        }
    }
}

impl std::fmt::Display for UploadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
