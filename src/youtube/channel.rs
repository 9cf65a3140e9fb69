//! Channel ID resolution
//!
//! A configured ID wins. Otherwise the public channel URL is inspected: a
//! `/channel/UC…` path carries the ID directly, and a `/@handle` path is
//! resolved by scraping the handle page through a [`ChannelIdScraper`].

use crate::cache::TtlCache;
use crate::config::{HttpConfig, RetryConfig, YouTubeConfig};
use crate::error::Result;
use crate::retry::with_retry;
use crate::utils::ensure_success;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};
use url::Url;

#[allow(clippy::expect_used)]
static CHANNEL_ID_IN_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""channelId":"(UC[\w-]{20,})""#).expect("channel ID pattern is valid")
});

/// Extract `UC…` from a `/channel/UC…` URL
///
/// ```
/// use site_feeds::youtube::channel::extract_channel_id_from_url;
///
/// assert_eq!(
///     extract_channel_id_from_url("https://www.youtube.com/channel/UCabc/videos").as_deref(),
///     Some("UCabc")
/// );
/// assert_eq!(extract_channel_id_from_url("https://www.youtube.com/@someone"), None);
/// ```
#[must_use]
pub fn extract_channel_id_from_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    match (segments.next(), segments.next()) {
        (Some("channel"), Some(id)) if id.starts_with("UC") => Some(id.to_string()),
        _ => None,
    }
}

/// The `/@handle` path of a channel URL, as written in the URL
#[must_use]
pub fn handle_path(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    let path = parsed.path();
    path.starts_with("/@").then(|| path.to_string())
}

/// Looks up a channel ID from a handle path such as `/@name`
///
/// The only implementation scrapes HTML; an official lookup can replace it
/// without touching the resolver.
#[async_trait]
pub trait ChannelIdScraper: Send + Sync {
    /// Resolve `handle_path` to a channel ID, `Ok(None)` when the page has none
    async fn scrape_channel_id(&self, handle_path: &str) -> Result<Option<String>>;
}

/// Fetches the public handle page and reads `"channelId":"UC…"` out of it
pub struct HandlePageScraper {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    retry: RetryConfig,
}

impl HandlePageScraper {
    /// Create a scraper fetching pages from `youtube.site_base_url`
    pub fn new(client: reqwest::Client, youtube: &YouTubeConfig, http: &HttpConfig) -> Self {
        Self {
            client,
            base_url: youtube.site_base_url.trim_end_matches('/').to_string(),
            user_agent: http.scrape_user_agent.clone(),
            retry: youtube.scrape_retry.clone(),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;
        let response = ensure_success(response, "YouTube handle page")?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ChannelIdScraper for HandlePageScraper {
    async fn scrape_channel_id(&self, handle_path: &str) -> Result<Option<String>> {
        let url = format!("{}{}", self.base_url, handle_path);
        let html = with_retry(&self.retry, || self.fetch_page(&url)).await?;

        Ok(CHANNEL_ID_IN_PAGE
            .captures(&html)
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_string()))
    }
}

/// Resolves the channel ID used by the uploads pipeline
///
/// Successful handle lookups are cached for `youtube.channel_id_ttl` (24h by
/// default). A lookup that comes back empty is tried once more without the
/// cache before giving up.
pub struct ChannelIdResolver {
    configured: Option<String>,
    channel_url: String,
    scraper: Arc<dyn ChannelIdScraper>,
    cache: TtlCache<String, String>,
}

impl ChannelIdResolver {
    /// Create a resolver for `config`
    pub fn new(config: &YouTubeConfig, scraper: Arc<dyn ChannelIdScraper>) -> Self {
        Self {
            configured: config.channel_id().map(str::to_string),
            channel_url: config.channel_url.clone(),
            scraper,
            cache: TtlCache::new(config.channel_id_ttl),
        }
    }

    /// The channel ID, or `None` when nothing resolves
    pub async fn resolve(&self) -> Option<String> {
        if let Some(id) = &self.configured {
            return Some(id.clone());
        }

        let cached = self
            .cache
            .get_or_try_insert_with(self.channel_url.clone(), || async {
                let id = self.lookup().await;
                if id.is_empty() { Err(()) } else { Ok(id) }
            })
            .await;
        if let Ok(id) = cached {
            return Some(id);
        }

        debug!(url = %self.channel_url, "Cached channel ID lookup empty, retrying uncached");
        let id = self.lookup().await;
        if id.is_empty() {
            return None;
        }
        self.cache.insert(self.channel_url.clone(), id.clone()).await;
        Some(id)
    }

    /// One uncached lookup; empty string when unresolved
    async fn lookup(&self) -> String {
        if let Some(id) = extract_channel_id_from_url(&self.channel_url) {
            return id;
        }

        let Some(path) = handle_path(&self.channel_url) else {
            debug!(url = %self.channel_url, "Channel URL is neither /channel/ nor a handle");
            return String::new();
        };

        match self.scraper.scrape_channel_id(&path).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!(handle = %path, "Handle page did not contain a channel ID");
                String::new()
            }
            Err(e) => {
                warn!(handle = %path, error = %e, "Failed to scrape channel ID from handle page");
                String::new()
            }
        }
    }
}
