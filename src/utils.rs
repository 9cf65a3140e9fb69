//! Utility functions for HTTP plumbing and text normalization

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Maximum description length shown on episode cards
pub const DESCRIPTION_MAX_CHARS: usize = 280;

/// Placeholder used when a feed item has no description at all
pub const NO_DESCRIPTION: &str = "No description available.";

#[allow(clippy::expect_used)]
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("HTML tag pattern is valid"));

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Build the shared outbound HTTP client
///
/// Every request made through it is bounded by `config.timeout`, so a stalled
/// upstream cannot hold a page render indefinitely.
///
/// # Errors
/// Returns error if the TLS backend cannot be initialized
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-success response into [`Error::HttpStatus`]
///
/// # Errors
/// Returns error if the response status is not 2xx
pub fn ensure_success(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::http_status(
            context,
            status.as_u16(),
            response.url().as_str(),
        ));
    }
    Ok(response)
}

/// Collapse runs of whitespace to a single space and trim
///
/// ```
/// use site_feeds::utils::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
/// ```
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Replace HTML tags with spaces, then collapse whitespace
///
/// Empty input yields [`NO_DESCRIPTION`].
#[must_use]
pub fn strip_html(html: &str) -> String {
    if html.is_empty() {
        return NO_DESCRIPTION.to_string();
    }
    collapse_whitespace(&HTML_TAG.replace_all(html, " "))
}

/// Truncate to `max_chars` characters, ending in `…` when shortened
///
/// The result never exceeds `max_chars` characters: the kept prefix is
/// `max_chars - 1` characters, right-trimmed, plus the ellipsis.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let prefix: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", prefix.trim_end())
}

/// Build a URL-safe slug
///
/// Lowercases, folds common Latin diacritics to ASCII, turns every other
/// non-alphanumeric run into a single `-`, and trims leading/trailing dashes.
///
/// ```
/// use site_feeds::utils::slugify;
///
/// assert_eq!(slugify("2024-03-01-Rozmowa z Kozłem: Odcinek #12!"), "2024-03-01-rozmowa-z-kozlem-odcinek-12");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        let folded = fold_diacritic(ch);
        let mut emitted = false;
        for c in folded.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
                emitted = true;
            }
        }
        if !emitted {
            pending_dash = true;
        }
    }

    slug
}

fn fold_diacritic(ch: char) -> String {
    let folded = match ch {
        'ą' | 'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'ć' | 'ç' | 'č' => "c",
        'ď' => "d",
        'ę' | 'è' | 'é' | 'ê' | 'ë' | 'ě' | 'ē' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ł' => "l",
        'ń' | 'ñ' | 'ň' => "n",
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'ř' => "r",
        'ś' | 'š' => "s",
        'ß' => "ss",
        'ť' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ů' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return ch.to_string(),
    };
    folded.to_string()
}

/// Parse a feed date in RFC 2822 (RSS `pubDate`) or RFC 3339 (Atom, Data API) form
#[must_use]
pub fn parse_feed_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a timestamp as ISO-8601 UTC with millisecond precision (`2024-01-01T12:00:00.000Z`)
#[must_use]
pub fn to_iso_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
