//! Podcast RSS feed normalization
//!
//! The feed is fetched over HTTP, parsed as RSS 2.0 (falling back to Atom),
//! and every item with a title becomes a [`PodcastEpisode`]. Failures surface
//! through [`PodcastService::get_podcast_episodes`]; the page-facing
//! [`PodcastService::get_podcast_episodes_safe`] turns them into an error
//! message and an empty list. There is no stale fallback for podcasts.

pub mod embeds;

use crate::cache::TtlCache;
use crate::config::PodcastConfig;
use crate::error::{Error, Result};
use crate::types::{PodcastEpisode, PodcastEpisodesResult, UploadSource};
use crate::utils::{
    DESCRIPTION_MAX_CHARS, ensure_success, parse_feed_date, slugify, strip_html, to_iso_string,
    truncate_text,
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Message shown on the podcast page when the feed cannot be loaded
pub const EPISODES_UNAVAILABLE: &str =
    "Episodes are currently unavailable. Please use direct platform links below.";

/// A feed item reduced to the fields episodes are built from
#[derive(Debug, Default)]
struct FeedItem {
    title: Option<String>,
    link: Option<String>,
    raw_description: String,
    date: Option<String>,
    duration: Option<String>,
    audio_url: Option<String>,
}

/// Fetches and normalizes the podcast feed
pub struct PodcastService {
    client: reqwest::Client,
    rss_url: String,
    cache: TtlCache<String, Vec<PodcastEpisode>>,
}

impl PodcastService {
    /// Create a service for `config.rss_url`
    pub fn new(client: reqwest::Client, config: &PodcastConfig) -> Self {
        Self {
            client,
            rss_url: config.rss_url.clone(),
            cache: TtlCache::new(config.cache_ttl),
        }
    }

    /// Fetch and normalize the feed, bypassing the cache
    ///
    /// # Errors
    /// Returns error on network failure, non-2xx status, or an unparseable feed.
    pub async fn get_podcast_episodes(&self) -> Result<Vec<PodcastEpisode>> {
        debug!(url = %self.rss_url, "Fetching podcast feed");

        let response = self.client.get(&self.rss_url).send().await?;
        let response = ensure_success(response, "Podcast feed")?;
        let content = response.text().await?;

        let episodes = Self::parse_feed(&content, Utc::now())?;
        debug!(count = episodes.len(), "Parsed podcast feed");
        Ok(episodes)
    }

    /// [`get_podcast_episodes`](Self::get_podcast_episodes) behind the feed cache
    ///
    /// # Errors
    /// Returns the fetch error on a cache miss; failures are not cached.
    pub async fn get_podcast_episodes_cached(&self) -> Result<Vec<PodcastEpisode>> {
        self.cache
            .get_or_try_insert_with(self.rss_url.clone(), || self.get_podcast_episodes())
            .await
    }

    /// Episodes for the podcast page; never fails
    pub async fn get_podcast_episodes_safe(&self) -> PodcastEpisodesResult {
        match self.get_podcast_episodes_cached().await {
            Ok(episodes) => PodcastEpisodesResult {
                episodes,
                error: None,
            },
            Err(e) => {
                warn!(
                    source = %UploadSource::StaticFallback,
                    url = %self.rss_url,
                    error = %e,
                    "Podcast feed unavailable"
                );
                PodcastEpisodesResult {
                    episodes: Vec::new(),
                    error: Some(EPISODES_UNAVAILABLE.to_string()),
                }
            }
        }
    }

    /// Look an episode up by slug in the page-facing result
    pub async fn find_episode(&self, slug: &str) -> Option<PodcastEpisode> {
        self.get_podcast_episodes_safe()
            .await
            .episodes
            .into_iter()
            .find(|episode| episode.slug == slug)
    }

    /// Parse a feed body into episodes, RSS first and Atom second
    ///
    /// `now` stands in for items without any date.
    ///
    /// # Errors
    /// Returns [`Error::FeedParse`] when the body is neither RSS nor Atom.
    pub fn parse_feed(content: &str, now: DateTime<Utc>) -> Result<Vec<PodcastEpisode>> {
        let items = match parse_as_rss(content) {
            Ok(items) => items,
            Err(rss_err) => {
                debug!(error = %rss_err, "Podcast feed is not RSS, trying Atom");
                parse_as_atom(content).map_err(|atom_err| {
                    Error::FeedParse(format!(
                        "podcast feed is neither RSS nor Atom. RSS error: {}. Atom error: {}",
                        rss_err, atom_err
                    ))
                })?
            }
        };

        Ok(items
            .into_iter()
            .filter_map(|item| to_episode(item, now))
            .collect())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_as_rss(content: &str) -> std::result::Result<Vec<FeedItem>, rss::Error> {
    let channel = content.parse::<rss::Channel>()?;

    let items = channel
        .items()
        .iter()
        .map(|item| {
            let itunes = item.itunes_ext();

            // content:encoded, then description, then itunes:summary
            let raw_description = non_empty(item.content())
                .or_else(|| non_empty(item.description()))
                .or_else(|| non_empty(itunes.and_then(|ext| ext.summary())))
                .unwrap_or_default()
                .to_string();

            let date = non_empty(item.pub_date())
                .map(str::to_string)
                .or_else(|| {
                    item.dublin_core_ext()
                        .and_then(|dc| dc.dates().first().cloned())
                });

            FeedItem {
                title: item.title().map(str::to_string),
                link: item.link().map(str::to_string),
                raw_description,
                date,
                duration: itunes
                    .and_then(|ext| ext.duration())
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                audio_url: item.enclosure().map(|enc| enc.url().to_string()),
            }
        })
        .collect();

    Ok(items)
}

fn parse_as_atom(content: &str) -> std::result::Result<Vec<FeedItem>, atom_syndication::Error> {
    let feed = atom_syndication::Feed::read_from(content.as_bytes())?;

    let items = feed
        .entries()
        .iter()
        .map(|entry| {
            let raw_description = entry
                .content()
                .and_then(|c| c.value())
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
                .or_else(|| entry.summary().map(|s| s.as_str().to_string()))
                .unwrap_or_default();

            let link = entry
                .links()
                .iter()
                .find(|link| link.rel() == "alternate")
                .map(|link| link.href().to_string());

            let audio_url = entry
                .links()
                .iter()
                .find(|link| link.rel() == "enclosure")
                .map(|link| link.href().to_string());

            let date = entry
                .published()
                .unwrap_or_else(|| entry.updated())
                .to_rfc3339();

            FeedItem {
                title: Some(entry.title().as_str().to_string()),
                link,
                raw_description,
                date: Some(date),
                duration: None,
                audio_url,
            }
        })
        .collect();

    Ok(items)
}

/// Normalize one item; `None` when it has no title
fn to_episode(item: FeedItem, now: DateTime<Utc>) -> Option<PodcastEpisode> {
    let title = item.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return None;
    }

    let (date, parsed_date) = match item.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => match parse_feed_date(raw) {
            Some(parsed) => (to_iso_string(&parsed), Some(parsed)),
            None => (raw.to_string(), None),
        },
        None => (to_iso_string(&now), Some(now)),
    };
    let date_part = parsed_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "undated".to_string());

    let description = truncate_text(&strip_html(&item.raw_description), DESCRIPTION_MAX_CHARS);
    let searchable = format!(
        "{} {}",
        item.raw_description,
        item.link.as_deref().unwrap_or_default()
    );

    Some(PodcastEpisode {
        slug: slugify(&format!("{date_part}-{title}")),
        title: title.to_string(),
        date,
        description,
        duration: item.duration,
        audio_url: item.audio_url,
        spotify_embed: embeds::find_spotify_embed(&searchable),
        youtube_embed: embeds::find_youtube_embed(&searchable),
        episode_url: item.link,
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
