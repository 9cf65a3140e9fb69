use super::*;
use crate::cache::InMemorySnapshotStore;
use crate::error::Error;
use channel::ChannelIdScraper;
use chrono::TimeZone;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHANNEL_ID: &str = "UCabcdefghijklmnopqrstuv";

/// Scraper that never finds anything
struct NoScraper;

#[async_trait]
impl ChannelIdScraper for NoScraper {
    async fn scrape_channel_id(&self, _handle_path: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Uploads source replaying scripted responses
struct ScriptedSource {
    source: UploadSource,
    responses: Mutex<VecDeque<Result<Vec<Video>>>>,
    calls: AtomicU32,
}

impl ScriptedSource {
    fn new(source: UploadSource, responses: Vec<Result<Vec<Video>>>) -> Arc<Self> {
        Arc::new(Self {
            source,
            responses: Mutex::new(responses.into()),
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl UploadsSource for ScriptedSource {
    async fn fetch_uploads(&self, _channel_id: &str) -> Result<Vec<Video>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no scripted response".into())))
    }

    fn source(&self) -> UploadSource {
        self.source
    }
}

fn video(id: &str, secs: i64, duration: Option<u64>, views: Option<u64>, is_short: bool) -> Video {
    Video {
        title: format!("Video {id}"),
        url: format!("https://www.youtube.com/watch?v={id}"),
        description: None,
        published_at: Some(Utc.timestamp_opt(secs, 0).unwrap()),
        is_short,
        duration_seconds: duration,
        view_count: views,
        episode_key: None,
    }
}

fn api_uploads() -> Vec<Video> {
    vec![
        video("s210", 210, Some(40), Some(3), true),
        video("ep200", 200, Some(3600), Some(50), false),
        video("s150", 150, Some(30), Some(9), true),
        video("s120", 120, Some(50), Some(5), true),
        video("ep100", 100, Some(4000), Some(70), false),
    ]
}

fn resolver(channel_id: Option<&str>) -> ChannelIdResolver {
    let config = YouTubeConfig {
        channel_id: channel_id.map(str::to_string),
        channel_url: "https://www.youtube.com/@Nobody".into(),
        ..Default::default()
    };
    ChannelIdResolver::new(&config, Arc::new(NoScraper))
}

fn service(
    source: Arc<ScriptedSource>,
    cache_ttl: Duration,
    snapshots: Arc<InMemorySnapshotStore>,
) -> YouTubeService {
    YouTubeService::from_parts(resolver(Some(CHANNEL_ID)), source, cache_ttl, snapshots)
}

#[tokio::test]
async fn missing_channel_id_is_unavailable_without_fetching() {
    let source = ScriptedSource::new(UploadSource::LiveRss, vec![Ok(vec![])]);
    let service = YouTubeService::from_parts(
        resolver(None),
        source.clone(),
        Duration::from_secs(60),
        Arc::new(InMemorySnapshotStore::new()),
    );

    let result = service.get_uploads_safe().await;
    assert_eq!(result, UploadsResult::unavailable());
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn api_path_matches_shorts_and_stores_snapshot() {
    let source = ScriptedSource::new(UploadSource::LiveApi, vec![Ok(api_uploads())]);
    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let service = service(source, Duration::from_secs(60), snapshots.clone());

    let result = service.get_uploads_safe().await;

    assert!(result.live_available);
    let featured: Vec<_> = result.featured.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(featured, vec!["Video ep200", "Video ep100"]);
    let shorts: Vec<_> = result.shorts.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(shorts, vec!["Video s210", "Video s150"]);

    let snapshot = snapshots.get(CHANNEL_ID).await.unwrap();
    assert_eq!(snapshot.data, result);
}

#[tokio::test]
async fn feed_path_uses_heuristic_shorts() {
    let mut uploads = vec![video("full", 1000, None, None, false)];
    for i in 0..8 {
        let mut short = video(&format!("s{i}"), 900 - i, None, None, true);
        short.url = format!("https://www.youtube.com/shorts/s{i}");
        uploads.push(short);
    }
    let source = ScriptedSource::new(UploadSource::LiveRss, vec![Ok(uploads)]);
    let service = service(source, Duration::from_secs(60), Arc::new(InMemorySnapshotStore::new()));

    let result = service.get_uploads_safe().await;
    assert_eq!(result.featured.len(), 1);
    assert_eq!(result.shorts.len(), 6);
    assert_eq!(result.shorts[0].title, "Video s0");
    assert_eq!(result.shorts[5].title, "Video s5");
}

#[tokio::test]
async fn failure_with_snapshot_serves_last_known_good_as_live() {
    let source = ScriptedSource::new(
        UploadSource::LiveApi,
        vec![
            Ok(api_uploads()),
            Err(Error::http_status("YouTube videos API", 500, "https://api/videos")),
        ],
    );
    let service = service(source.clone(), Duration::ZERO, Arc::new(InMemorySnapshotStore::new()));

    let first = service.get_uploads_safe().await;
    let second = service.get_uploads_safe().await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert!(second.live_available);
    assert_eq!(second.featured, first.featured);
    assert_eq!(second.shorts, first.shorts);
}

#[tokio::test]
async fn failure_without_snapshot_is_unavailable() {
    let source = ScriptedSource::new(
        UploadSource::LiveRss,
        vec![Err(Error::FeedParse("truncated".into()))],
    );
    let service = service(source, Duration::from_secs(60), Arc::new(InMemorySnapshotStore::new()));

    let result = service.get_uploads_safe().await;
    assert_eq!(
        result,
        UploadsResult {
            featured: vec![],
            shorts: vec![],
            live_available: false,
        }
    );
}

#[tokio::test]
async fn uploads_are_cached_within_ttl() {
    let source = ScriptedSource::new(UploadSource::LiveApi, vec![Ok(api_uploads())]);
    let service = service(source.clone(), Duration::from_secs(60), Arc::new(InMemorySnapshotStore::new()));

    let first = service.get_uploads_safe().await;
    let second = service.get_uploads_safe().await;

    assert_eq!(first, second);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn newer_success_overwrites_snapshot() {
    let mut newer = api_uploads();
    newer.insert(0, video("ep300", 300, Some(3600), Some(1), false));
    let source = ScriptedSource::new(
        UploadSource::LiveApi,
        vec![
            Ok(api_uploads()),
            Ok(newer),
            Err(Error::Other("down".into())),
        ],
    );
    let service = service(source, Duration::ZERO, Arc::new(InMemorySnapshotStore::new()));

    service.get_uploads_safe().await;
    let second = service.get_uploads_safe().await;
    let stale = service.get_uploads_safe().await;

    assert_eq!(second.featured.len(), 3);
    assert_eq!(stale.featured, second.featured);
}

#[tokio::test]
async fn config_without_api_key_uses_public_feed() {
    let server = MockServer::start().await;
    let feed = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>yt:channel:{CHANNEL_ID}</id>
  <title>Channel</title>
  <updated>2024-03-02T10:00:00+00:00</updated>
  <entry>
    <id>yt:video:one</id>
    <title>Full episode</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v=one"/>
    <published>2024-03-01T10:00:00+00:00</published>
    <updated>2024-03-01T10:00:00+00:00</updated>
  </entry>
  <entry>
    <id>yt:video:two</id>
    <title>Clip #shorts</title>
    <link rel="alternate" href="https://www.youtube.com/shorts/two"/>
    <published>2024-03-02T10:00:00+00:00</published>
    <updated>2024-03-02T10:00:00+00:00</updated>
  </entry>
</feed>"#
    );
    Mock::given(method("GET"))
        .and(path("/feeds/videos.xml"))
        .and(query_param("channel_id", CHANNEL_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.youtube.channel_id = Some(CHANNEL_ID.into());
    config.youtube.feed_base_url = server.uri();
    config.youtube.api_key = Some("   ".into());

    let service = YouTubeService::new(
        &config,
        reqwest::Client::new(),
        Arc::new(InMemorySnapshotStore::new()),
    );
    assert_eq!(service.source(), UploadSource::LiveRss);

    let result = service.get_uploads_safe().await;
    assert!(result.live_available);
    assert_eq!(result.featured.len(), 1);
    assert_eq!(result.featured[0].url, "https://www.youtube.com/watch?v=one");
    assert_eq!(result.shorts.len(), 1);
    assert_eq!(result.shorts[0].url, "https://www.youtube.com/shorts/two");
}

#[tokio::test]
async fn config_with_api_key_uses_data_api() {
    let mut config = Config::default();
    config.youtube.api_key = Some("key".into());

    let service = YouTubeService::new(
        &config,
        reqwest::Client::new(),
        Arc::new(InMemorySnapshotStore::new()),
    );
    assert_eq!(service.source(), UploadSource::LiveApi);
}

#[tokio::test]
async fn upstream_outage_after_success_serves_snapshot_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{ "contentDetails": { "relatedPlaylists": { "uploads": "UUx" } } }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{ "contentDetails": { "videoId": "ep" } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{
                "id": "ep",
                "snippet": { "title": "Full", "publishedAt": "2024-01-01T00:00:00Z" },
                "contentDetails": { "duration": "PT1H" },
                "statistics": { "viewCount": "10" }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.youtube.channel_id = Some(CHANNEL_ID.into());
    config.youtube.api_key = Some("key".into());
    config.youtube.api_base_url = server.uri();
    config.youtube.cache_ttl = Duration::ZERO;

    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let service = YouTubeService::new(&config, reqwest::Client::new(), snapshots.clone());

    let live = service.get_uploads_safe().await;
    assert_eq!(live.featured.len(), 1);

    let stale = service.get_uploads_safe().await;
    assert!(stale.live_available);
    assert_eq!(stale.featured, live.featured);
    assert_eq!(snapshots.len().await, 1);
}
