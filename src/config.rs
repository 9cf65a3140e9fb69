//! Configuration types for site-feeds

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};

/// Default number of playlist pages fetched from the Data API
pub const DEFAULT_MAX_PAGES: u32 = 4;

/// Lower bound for the playlist page cap
pub const MIN_MAX_PAGES: u32 = 1;

/// Upper bound for the playlist page cap
pub const MAX_MAX_PAGES: u32 = 12;

/// Main configuration for [`SiteFeeds`](crate::SiteFeeds)
///
/// Fields are organized into sub-configs:
/// - [`podcast`](PodcastConfig) - podcast RSS feed source and cache lifetime
/// - [`youtube`](YouTubeConfig) - channel identity, API key, pagination, upstream base URLs
/// - [`http`](HttpConfig) - outbound request timeouts and user agents
/// - [`server`](ApiConfig) - the JSON API bind address and CORS
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Podcast feed settings
    #[serde(default)]
    pub podcast: PodcastConfig,

    /// YouTube uploads settings
    #[serde(default)]
    pub youtube: YouTubeConfig,

    /// Outbound HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// JSON API server settings
    #[serde(default)]
    pub server: ApiConfig,
}

impl Config {
    /// Build a configuration from defaults overridden by environment variables
    ///
    /// Recognized variables:
    /// - `PODCAST_RSS_URL` - podcast feed endpoint
    /// - `YOUTUBE_CHANNEL_ID` - explicit channel ID (skips handle resolution)
    /// - `YOUTUBE_URL` - public channel or handle URL
    /// - `YOUTUBE_API_KEY` - Data API key; presence switches to the API strategy
    /// - `YOUTUBE_MAX_PAGES` - playlist page cap, clamped to 1..=12
    /// - `SITE_FEEDS_BIND` - API server bind address
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `SITE_FEEDS_BIND` is not a socket address.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Some(url) = env_non_empty("PODCAST_RSS_URL") {
            config.podcast.rss_url = url;
        }
        if let Some(channel_id) = env_non_empty("YOUTUBE_CHANNEL_ID") {
            config.youtube.channel_id = Some(channel_id);
        }
        if let Some(url) = env_non_empty("YOUTUBE_URL") {
            config.youtube.channel_url = url;
        }
        config.youtube.api_key = env_non_empty("YOUTUBE_API_KEY");
        config.youtube.max_pages =
            parse_max_pages(std::env::var("YOUTUBE_MAX_PAGES").ok().as_deref());

        if let Some(bind) = env_non_empty("SITE_FEEDS_BIND") {
            config.server.bind_address = bind.parse().map_err(|e| Error::Config {
                message: format!("invalid bind address '{}': {}", bind, e),
                key: Some("SITE_FEEDS_BIND".to_string()),
            })?;
        }

        Ok(config)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the effective playlist page cap from a raw setting
///
/// Unset means the default of 4. Anything set is parsed as an integer and
/// clamped to `1..=12`; values that do not parse clamp to the minimum.
///
/// ```
/// use site_feeds::config::parse_max_pages;
///
/// assert_eq!(parse_max_pages(None), 4);
/// assert_eq!(parse_max_pages(Some("0")), 1);
/// assert_eq!(parse_max_pages(Some("99")), 12);
/// assert_eq!(parse_max_pages(Some("abc")), 1);
/// ```
#[must_use]
pub fn parse_max_pages(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return DEFAULT_MAX_PAGES;
    };

    match raw.trim().parse::<i64>() {
        Ok(n) => n.clamp(i64::from(MIN_MAX_PAGES), i64::from(MAX_MAX_PAGES)) as u32,
        Err(_) => MIN_MAX_PAGES,
    }
}

/// Podcast RSS configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PodcastConfig {
    /// Feed endpoint
    #[serde(default = "default_podcast_rss_url")]
    pub rss_url: String,

    /// How long a fetched episode list is served before refetching (default: 30 minutes)
    #[serde(default = "default_revalidate", with = "duration_serde")]
    pub cache_ttl: Duration,
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            rss_url: default_podcast_rss_url(),
            cache_ttl: default_revalidate(),
        }
    }
}

/// YouTube uploads configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// Explicit channel ID (`UC…`); when set, no URL resolution happens
    #[serde(default)]
    pub channel_id: Option<String>,

    /// Public channel URL, either `/channel/UC…` or a handle (`/@name`)
    #[serde(default = "default_channel_url")]
    pub channel_url: String,

    /// Data API key; when present the API strategy is used instead of the public feed
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum playlistItems pages (50 items each) to walk (default: 4, clamped to 1..=12)
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Lifetime of a fetched uploads list per strategy (default: 30 minutes)
    #[serde(default = "default_revalidate", with = "duration_serde")]
    pub cache_ttl: Duration,

    /// Lifetime of a resolved handle → channel ID mapping (default: 24 hours)
    #[serde(default = "default_channel_id_ttl", with = "duration_serde")]
    pub channel_id_ttl: Duration,

    /// Data API base URL (default: https://www.googleapis.com/youtube/v3)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL serving `/feeds/videos.xml` (default: https://www.youtube.com)
    #[serde(default = "default_site_base_url")]
    pub feed_base_url: String,

    /// Base URL serving handle pages (default: https://www.youtube.com)
    #[serde(default = "default_site_base_url")]
    pub site_base_url: String,

    /// Retry policy for the handle page scrape (default: one retry)
    #[serde(default = "default_scrape_retry")]
    pub scrape_retry: RetryConfig,
}

impl YouTubeConfig {
    /// Configured channel ID, trimmed, if non-empty
    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Configured API key, trimmed, if non-empty
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Page cap clamped to `1..=12`
    pub fn effective_max_pages(&self) -> u32 {
        self.max_pages.clamp(MIN_MAX_PAGES, MAX_MAX_PAGES)
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            channel_id: None,
            channel_url: default_channel_url(),
            api_key: None,
            max_pages: DEFAULT_MAX_PAGES,
            cache_ttl: default_revalidate(),
            channel_id_ttl: default_channel_id_ttl(),
            api_base_url: default_api_base_url(),
            feed_base_url: default_site_base_url(),
            site_base_url: default_site_base_url(),
            scrape_retry: default_scrape_retry(),
        }
    }
}

/// Outbound HTTP client configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout for every outbound call (default: 10 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// TCP connect timeout (default: 5 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// User agent for feed and API requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// User agent sent when fetching channel handle pages
    #[serde(default = "default_scrape_user_agent")]
    pub scrape_user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
            scrape_user_agent: default_scrape_user_agent(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try (default: 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 5 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// JSON API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8787)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
        }
    }
}

// Default value functions
fn default_podcast_rss_url() -> String {
    "https://feeds.simplecast.com/54nAGcIl".to_string()
}

fn default_channel_url() -> String {
    "https://www.youtube.com/@RozmowyzKoz%C5%82em".to_string()
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_site_base_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_revalidate() -> Duration {
    Duration::from_secs(1800)
}

fn default_channel_id_ttl() -> Duration {
    Duration::from_secs(86400)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_user_agent() -> String {
    concat!("site-feeds/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_scrape_user_agent() -> String {
    "Mozilla/5.0 (compatible; personal-page-bot/1.0)".to_string()
}

fn default_scrape_retry() -> RetryConfig {
    RetryConfig::default()
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8787))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
