//! Normalization helpers shared by both upload strategies

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Uploads at or under this many seconds are shorts on the Data API path
pub const SHORT_MAX_SECONDS: u64 = 180;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";
const SHORTS_URL_PREFIX: &str = "https://www.youtube.com/shorts/";

#[allow(clippy::expect_used)]
static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration pattern is valid")
});

#[allow(clippy::expect_used)]
static EPISODE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:#|odcinek\s*|episode\s*)(\d{1,3})").expect("episode key pattern is valid")
});

/// Canonicalize a YouTube link to a watch or shorts URL
///
/// - `youtu.be/<id>` becomes `https://www.youtube.com/watch?v=<id>`
/// - any `youtube.com` path containing `/shorts/` becomes `https://www.youtube.com/shorts/<id>`
/// - other `youtube.com` links use the `v` query parameter, else the last path segment
///
/// Anything unparseable or off-site yields an empty string.
///
/// ```
/// use site_feeds::youtube::normalize::normalize_watch_url;
///
/// assert_eq!(normalize_watch_url("https://youtu.be/abc123"), "https://www.youtube.com/watch?v=abc123");
/// assert_eq!(normalize_watch_url("not a url"), "");
/// ```
#[must_use]
pub fn normalize_watch_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw.trim()) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    if host.contains("youtu.be") {
        let id = parsed.path().trim_start_matches('/');
        return if id.is_empty() {
            String::new()
        } else {
            format!("{WATCH_URL_PREFIX}{id}")
        };
    }

    if !host.contains("youtube.com") {
        return String::new();
    }

    let last_segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string);

    if parsed.path().contains("/shorts/") {
        return last_segment
            .map(|id| format!("{SHORTS_URL_PREFIX}{id}"))
            .unwrap_or_default();
    }

    parsed
        .query_pairs()
        .find(|(key, value)| key == "v" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .or(last_segment)
        .map(|id| format!("{WATCH_URL_PREFIX}{id}"))
        .unwrap_or_default()
}

/// Watch URL for a bare video ID
#[must_use]
pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{video_id}")
}

/// Feed-path shorts heuristic: `#shorts` or `/shorts/` anywhere in the item
#[must_use]
pub fn is_short_item(title: &str, description: &str, url: &str) -> bool {
    let haystack = format!("{title} {description} {url}").to_lowercase();
    haystack.contains("#shorts") || haystack.contains("/shorts/")
}

/// Parse an ISO-8601 `PT#H#M#S` duration into seconds
///
/// Absent or malformed durations are 0.
///
/// ```
/// use site_feeds::youtube::normalize::parse_duration_to_seconds;
///
/// assert_eq!(parse_duration_to_seconds(Some("PT1H2M3S")), 3723);
/// assert_eq!(parse_duration_to_seconds(Some("PT45S")), 45);
/// assert_eq!(parse_duration_to_seconds(None), 0);
/// ```
#[must_use]
pub fn parse_duration_to_seconds(iso: Option<&str>) -> u64 {
    let Some(captures) = iso.and_then(|value| ISO_DURATION.captures(value)) else {
        return 0;
    };

    let part = |index: usize| {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    part(1)
        .saturating_mul(3600)
        .saturating_add(part(2).saturating_mul(60))
        .saturating_add(part(3))
}

/// Episode marker (`#12`, `odcinek 12`, `episode 12`) as `ep-12`
#[must_use]
pub fn extract_episode_key(title: &str, description: &str) -> Option<String> {
    let haystack = format!("{title} {description}");
    EPISODE_KEY
        .captures(&haystack)
        .and_then(|captures| captures.get(1))
        .map(|number| format!("ep-{}", number.as_str()))
}

/// Data API classification: known duration in `(0, 180]`
#[must_use]
pub fn is_short_duration(seconds: u64) -> bool {
    seconds > 0 && seconds <= SHORT_MAX_SECONDS
}
