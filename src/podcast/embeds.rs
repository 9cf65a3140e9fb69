//! Embeddable player URLs found in episode descriptions

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

#[allow(clippy::expect_used)]
static SPOTIFY_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(open\.)?spotify\.com/[A-Za-z0-9_\-/?.=&%]+")
        .expect("Spotify link pattern is valid")
});

#[allow(clippy::expect_used)]
static YOUTUBE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(www\.)?(youtube\.com|youtu\.be)/[A-Za-z0-9_\-/?.=&%]+")
        .expect("YouTube link pattern is valid")
});

/// First Spotify link in `text`, as an `open.spotify.com/embed/<type>/<id>` URL
#[must_use]
pub fn find_spotify_embed(text: &str) -> Option<String> {
    SPOTIFY_LINK
        .find(text)
        .and_then(|m| spotify_embed_url(m.as_str()))
}

/// First YouTube link in `text`, as a `youtube.com/embed/<id>` URL
#[must_use]
pub fn find_youtube_embed(text: &str) -> Option<String> {
    YOUTUBE_LINK
        .find(text)
        .and_then(|m| youtube_embed_url(m.as_str()))
}

/// `…spotify.com/<type>/<id>` to its embed form; `None` when malformed
#[must_use]
pub fn spotify_embed_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    if !parsed.host_str()?.contains("spotify.com") {
        return None;
    }

    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let kind = segments.next()?;
    let id = segments.next()?;
    Some(format!("https://open.spotify.com/embed/{kind}/{id}"))
}

/// `youtu.be/<id>` or `youtube.com/…?v=<id>` to its embed form; `None` when malformed
#[must_use]
pub fn youtube_embed_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?;

    let id = if host.contains("youtu.be") {
        parsed.path().trim_start_matches('/').to_string()
    } else if host.contains("youtube.com") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?
    } else {
        return None;
    };

    (!id.is_empty()).then(|| format!("https://www.youtube.com/embed/{id}"))
}
