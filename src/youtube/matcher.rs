//! Featured selection and shorts-to-episode matching

use super::normalize::SHORT_MAX_SECONDS;
use crate::types::Video;
use std::cmp::Ordering;

/// Number of shorts shown when windowed matching finds nothing
pub const FALLBACK_SHORTS_LIMIT: usize = 8;

/// Number of shorts shown on the public feed path
pub const FEED_SHORTS_LIMIT: usize = 6;

/// Full episodes for the featured list
///
/// Drops `/shorts/` URLs and keeps items whose duration is unknown (feed
/// path) or longer than [`SHORT_MAX_SECONDS`]. Input order is preserved.
#[must_use]
pub fn select_featured(uploads: &[Video]) -> Vec<Video> {
    uploads
        .iter()
        .filter(|video| !video.url.contains("/shorts/"))
        .filter(|video| {
            let duration = video.duration_seconds.unwrap_or(0);
            duration == 0 || duration > SHORT_MAX_SECONDS
        })
        .cloned()
        .collect()
}

/// Shorts for the public feed path: flagged items, first six, in feed order
#[must_use]
pub fn select_feed_shorts(uploads: &[Video]) -> Vec<Video> {
    uploads
        .iter()
        .filter(|video| video.is_short)
        .take(FEED_SHORTS_LIMIT)
        .cloned()
        .collect()
}

/// Pick the best short for each full episode
///
/// Episodes (not short, duration over 180s) and shorts are both ordered newest
/// first. Episode `i` owns the window `[episode_i, episode_{i-1})`, with the
/// newest episode's window open-ended. Within a window the short with the most
/// views wins and ties go to the later short. The result follows episode
/// recency and skips episodes whose window is empty.
///
/// When no episode gets a short, the eight most viewed shorts (ties by
/// recency) are returned instead.
#[must_use]
pub fn select_best_shorts_per_episode(videos: &[Video]) -> Vec<Video> {
    let mut episodes: Vec<&Video> = videos
        .iter()
        .filter(|video| !video.is_short && video.duration_seconds.unwrap_or(0) > SHORT_MAX_SECONDS)
        .collect();
    episodes.sort_by_key(|video| std::cmp::Reverse(video.timestamp_millis()));

    let mut shorts: Vec<&Video> = videos.iter().filter(|video| video.is_short).collect();
    shorts.sort_by_key(|video| std::cmp::Reverse(video.timestamp_millis()));

    let mut window_end: Option<i64> = None;
    let mut mapped = Vec::new();

    for episode in &episodes {
        let window_start = episode.timestamp_millis();

        let best = shorts
            .iter()
            .filter(|short| {
                let ts = short.timestamp_millis();
                ts >= window_start && window_end.is_none_or(|end| ts < end)
            })
            .copied()
            .reduce(|best, candidate| match compare_popularity(candidate, best) {
                Ordering::Greater => candidate,
                _ => best,
            });

        if let Some(best) = best {
            mapped.push(best.clone());
        }
        window_end = Some(window_start);
    }

    if !mapped.is_empty() {
        return mapped;
    }

    shorts.sort_by(|a, b| compare_popularity(b, a));
    shorts
        .into_iter()
        .take(FALLBACK_SHORTS_LIMIT)
        .cloned()
        .collect()
}

/// Views first, then publish time
fn compare_popularity(a: &Video, b: &Video) -> Ordering {
    a.views()
        .cmp(&b.views())
        .then_with(|| a.timestamp_millis().cmp(&b.timestamp_millis()))
}
