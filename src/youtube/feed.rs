//! Public channel feed strategy (`/feeds/videos.xml`)
//!
//! YouTube serves Atom here; RSS 2.0 is accepted as a fallback so mirrors
//! and test fixtures in either format work.

use super::UploadsSource;
use super::normalize::{extract_episode_key, is_short_item, normalize_watch_url};
use crate::config::YouTubeConfig;
use crate::error::{Error, Result};
use crate::types::{UploadSource, Video};
use crate::utils::{collapse_whitespace, ensure_success, parse_feed_date};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Uploads from the channel's public feed
///
/// Feed entries carry no duration or view counts; shorts are recognized by
/// the `#shorts` / `/shorts/` heuristic.
pub struct FeedUploads {
    client: reqwest::Client,
    base_url: String,
}

impl FeedUploads {
    /// Create a feed strategy reading from `youtube.feed_base_url`
    pub fn new(client: reqwest::Client, config: &YouTubeConfig) -> Self {
        Self {
            client,
            base_url: config.feed_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Feed URL for `channel_id`
    pub fn feed_url(&self, channel_id: &str) -> String {
        format!("{}/feeds/videos.xml?channel_id={}", self.base_url, channel_id)
    }

    /// Parse a feed body, trying Atom first and RSS second
    ///
    /// # Errors
    /// Returns [`Error::FeedParse`] when the body is neither format.
    pub fn parse_feed(content: &str) -> Result<Vec<Video>> {
        match parse_as_atom(content) {
            Ok(videos) => {
                debug!(count = videos.len(), "Parsed channel feed as Atom");
                Ok(videos)
            }
            Err(atom_err) => {
                debug!(error = %atom_err, "Channel feed is not Atom, trying RSS");
                parse_as_rss(content).map_err(|rss_err| {
                    Error::FeedParse(format!(
                        "channel feed is neither Atom nor RSS. Atom error: {}. RSS error: {}",
                        atom_err, rss_err
                    ))
                })
            }
        }
    }
}

#[async_trait]
impl UploadsSource for FeedUploads {
    async fn fetch_uploads(&self, channel_id: &str) -> Result<Vec<Video>> {
        let url = self.feed_url(channel_id);
        debug!(url = %url, "Fetching YouTube channel feed");

        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response, "YouTube channel feed")?;
        let content = response.text().await?;

        Self::parse_feed(&content)
    }

    fn source(&self) -> UploadSource {
        UploadSource::LiveRss
    }
}

fn parse_as_atom(content: &str) -> std::result::Result<Vec<Video>, atom_syndication::Error> {
    let feed = atom_syndication::Feed::read_from(content.as_bytes())?;

    let videos = feed
        .entries()
        .iter()
        .filter_map(|entry| {
            let link = entry
                .links()
                .iter()
                .find(|link| link.rel() == "alternate")
                .or_else(|| entry.links().first())
                .map(|link| link.href())
                .unwrap_or("");

            // media:group/media:description, then summary, then content
            let description = media_description(entry)
                .or_else(|| entry.summary().map(|s| s.as_str().to_string()))
                .or_else(|| {
                    entry
                        .content()
                        .and_then(|c| c.value().map(|v| v.to_string()))
                })
                .unwrap_or_default();

            let published = entry
                .published()
                .unwrap_or_else(|| entry.updated())
                .to_rfc3339();

            build_video(
                entry.title().as_str(),
                &description,
                link,
                parse_feed_date(&published),
            )
        })
        .collect();

    Ok(videos)
}

fn media_description(entry: &atom_syndication::Entry) -> Option<String> {
    entry
        .extensions()
        .get("media")?
        .get("group")?
        .iter()
        .flat_map(|group| group.children().get("description").into_iter().flatten())
        .find_map(|description| description.value().map(str::to_string))
}

fn parse_as_rss(content: &str) -> std::result::Result<Vec<Video>, rss::Error> {
    let channel = content.parse::<rss::Channel>()?;

    let videos = channel
        .items()
        .iter()
        .filter_map(|item| {
            let description = item
                .content()
                .or_else(|| item.description())
                .unwrap_or_default();

            build_video(
                item.title().unwrap_or_default(),
                description,
                item.link().unwrap_or_default(),
                item.pub_date().and_then(parse_feed_date),
            )
        })
        .collect();

    Ok(videos)
}

/// Normalize one feed entry; `None` when the title or URL ends up empty
fn build_video(
    title: &str,
    description: &str,
    link: &str,
    published_at: Option<DateTime<Utc>>,
) -> Option<Video> {
    let title = title.trim();
    let description = collapse_whitespace(description);
    let url = normalize_watch_url(link);

    if title.is_empty() || url.is_empty() {
        return None;
    }

    Some(Video {
        title: title.to_string(),
        is_short: is_short_item(title, &description, &url),
        episode_key: extract_episode_key(title, &description),
        description: (!description.is_empty()).then_some(description),
        url,
        published_at,
        duration_seconds: None,
        view_count: None,
    })
}
