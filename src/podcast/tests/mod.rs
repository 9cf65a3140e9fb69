use super::*;
use crate::utils::NO_DESCRIPTION;
use chrono::TimeZone;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PODCAST_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"
     xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Rozmowy z Kozłem</title>
    <link>https://example.com</link>
    <description>Podcast</description>
    <item>
      <title>  Pilot Episode  </title>
      <link>https://example.com/episodes/pilot</link>
      <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
      <description><![CDATA[<p>Our <b>first</b> talk.</p> Listen on https://open.spotify.com/episode/abc123?si=x or https://youtu.be/vid42]]></description>
      <enclosure url="https://cdn.example.com/pilot.mp3" length="123" type="audio/mpeg"/>
      <itunes:duration>01:02:03</itunes:duration>
    </item>
    <item>
      <title>Encoded content wins</title>
      <pubDate>sometime in spring</pubDate>
      <description>plain description</description>
      <content:encoded><![CDATA[<div>Rich   content</div>]]></content:encoded>
    </item>
    <item>
      <title>   </title>
      <pubDate>Tue, 02 Jan 2024 12:00:00 +0000</pubDate>
    </item>
    <item>
      <description>no title at all</description>
    </item>
    <item>
      <title>Quiet one</title>
    </item>
  </channel>
</rss>"#;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
}

fn service_for(server: &MockServer, cache_ttl: Duration) -> PodcastService {
    let config = PodcastConfig {
        rss_url: format!("{}/feed.xml", server.uri()),
        cache_ttl,
    };
    PodcastService::new(reqwest::Client::new(), &config)
}

#[test]
fn items_without_title_are_excluded() {
    let episodes = PodcastService::parse_feed(PODCAST_FEED, now()).unwrap();
    let titles: Vec<_> = episodes.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Pilot Episode", "Encoded content wins", "Quiet one"]);
}

#[test]
fn episode_fields_are_normalized() {
    let episodes = PodcastService::parse_feed(PODCAST_FEED, now()).unwrap();
    let pilot = &episodes[0];

    assert_eq!(pilot.slug, "2024-01-01-pilot-episode");
    assert_eq!(pilot.date, "2024-01-01T12:00:00.000Z");
    assert_eq!(
        pilot.description,
        "Our first talk. Listen on https://open.spotify.com/episode/abc123?si=x or https://youtu.be/vid42"
    );
    assert_eq!(pilot.duration.as_deref(), Some("01:02:03"));
    assert_eq!(pilot.audio_url.as_deref(), Some("https://cdn.example.com/pilot.mp3"));
    assert_eq!(pilot.episode_url.as_deref(), Some("https://example.com/episodes/pilot"));
    assert_eq!(
        pilot.spotify_embed.as_deref(),
        Some("https://open.spotify.com/embed/episode/abc123")
    );
    assert_eq!(
        pilot.youtube_embed.as_deref(),
        Some("https://www.youtube.com/embed/vid42")
    );
}

#[test]
fn unparseable_date_is_kept_raw_and_slug_is_undated() {
    let episodes = PodcastService::parse_feed(PODCAST_FEED, now()).unwrap();
    let encoded = &episodes[1];

    assert_eq!(encoded.date, "sometime in spring");
    assert_eq!(encoded.slug, "undated-encoded-content-wins");
    assert_eq!(encoded.description, "Rich content");
    assert_eq!(encoded.spotify_embed, None);
    assert_eq!(encoded.youtube_embed, None);
}

#[test]
fn missing_date_falls_back_to_now_and_description_to_placeholder() {
    let episodes = PodcastService::parse_feed(PODCAST_FEED, now()).unwrap();
    let quiet = &episodes[2];

    assert_eq!(quiet.date, "2024-06-01T08:30:00.000Z");
    assert_eq!(quiet.slug, "2024-06-01-quiet-one");
    assert_eq!(quiet.description, NO_DESCRIPTION);
    assert_eq!(quiet.audio_url, None);
    assert_eq!(quiet.duration, None);
}

#[test]
fn slugs_are_deterministic_across_parses() {
    let first = PodcastService::parse_feed(PODCAST_FEED, now()).unwrap();
    let second = PodcastService::parse_feed(PODCAST_FEED, now()).unwrap();
    let slugs = |episodes: &[PodcastEpisode]| -> Vec<String> {
        episodes.iter().map(|e| e.slug.clone()).collect()
    };
    assert_eq!(slugs(&first), slugs(&second));
}

#[test]
fn long_descriptions_are_truncated() {
    let body = "słowo ".repeat(100);
    let feed = format!(
        r#"<rss version="2.0"><channel><title>t</title><link>https://e</link><description>d</description>
<item><title>Long</title><pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate><description>{body}</description></item>
</channel></rss>"#
    );

    let episodes = PodcastService::parse_feed(&feed, now()).unwrap();
    let description = &episodes[0].description;
    assert_eq!(description.chars().count(), DESCRIPTION_MAX_CHARS);
    assert!(description.ends_with('…'));
}

#[test]
fn atom_feeds_are_accepted() {
    let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>urn:podcast</id>
  <title>Atom Podcast</title>
  <updated>2024-02-01T00:00:00Z</updated>
  <entry>
    <id>urn:ep1</id>
    <title>Atom Episode</title>
    <updated>2024-02-01T10:00:00Z</updated>
    <summary>Short summary</summary>
    <link rel="alternate" href="https://example.com/ep1"/>
    <link rel="enclosure" href="https://cdn.example.com/ep1.mp3" type="audio/mpeg"/>
  </entry>
</feed>"#;

    let episodes = PodcastService::parse_feed(feed, now()).unwrap();
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].slug, "2024-02-01-atom-episode");
    assert_eq!(episodes[0].description, "Short summary");
    assert_eq!(episodes[0].audio_url.as_deref(), Some("https://cdn.example.com/ep1.mp3"));
    assert_eq!(episodes[0].episode_url.as_deref(), Some("https://example.com/ep1"));
}

#[test]
fn garbage_is_a_parse_error() {
    let result = PodcastService::parse_feed("definitely not xml", now());
    assert!(matches!(result, Err(Error::FeedParse(_))));
}

#[tokio::test]
async fn fetch_errors_propagate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = service_for(&server, Duration::from_secs(60));
    let result = service.get_podcast_episodes().await;
    assert!(matches!(result, Err(Error::HttpStatus { status: 500, .. })));
}

#[tokio::test]
async fn safe_result_reports_error_with_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let service = service_for(&server, Duration::from_secs(60));
    let result = service.get_podcast_episodes_safe().await;

    assert!(result.episodes.is_empty());
    assert_eq!(result.error.as_deref(), Some(EPISODES_UNAVAILABLE));
}

#[tokio::test]
async fn safe_result_is_cached_and_failures_are_not() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PODCAST_FEED))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server, Duration::from_secs(60));

    let failed = service.get_podcast_episodes_safe().await;
    assert!(failed.error.is_some());

    let first = service.get_podcast_episodes_safe().await;
    let second = service.get_podcast_episodes_safe().await;
    assert_eq!(first.error, None);
    assert_eq!(first.episodes.len(), 3);
    assert_eq!(first.episodes, second.episodes);
}

#[tokio::test]
async fn find_episode_by_slug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PODCAST_FEED))
        .mount(&server)
        .await;

    let service = service_for(&server, Duration::from_secs(60));
    let found = service.find_episode("2024-01-01-pilot-episode").await.unwrap();
    assert_eq!(found.title, "Pilot Episode");
    assert!(service.find_episode("missing").await.is_none());
}
