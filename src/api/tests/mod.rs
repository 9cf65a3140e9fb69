use super::*;
use crate::error::ApiError;
use crate::types::{PodcastEpisode, PodcastEpisodesResult, UploadsResult};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHANNEL_ID: &str = "UCabcdefghijklmnopqrstuv";

const PODCAST_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Podcast</title>
    <link>https://example.com</link>
    <description>Podcast</description>
    <item>
      <title>Pilot Episode</title>
      <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
      <description>First talk</description>
    </item>
  </channel>
</rss>"#;

fn channel_feed() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>yt:channel:{CHANNEL_ID}</id>
  <title>Channel</title>
  <updated>2024-03-01T10:00:00+00:00</updated>
  <entry>
    <id>yt:video:one</id>
    <title>Full episode</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v=one"/>
    <published>2024-03-01T10:00:00+00:00</published>
    <updated>2024-03-01T10:00:00+00:00</updated>
  </entry>
</feed>"#
    )
}

/// Config pointing every upstream at `server`
fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.podcast.rss_url = format!("{}/podcast.xml", server.uri());
    config.youtube.channel_id = Some(CHANNEL_ID.into());
    config.youtube.feed_base_url = server.uri();
    config.youtube.site_base_url = server.uri();
    config.youtube.api_base_url = server.uri();
    config.http.timeout = Duration::from_secs(2);
    config
}

async fn mount_upstreams(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/podcast.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PODCAST_FEED))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feeds/videos.xml"))
        .and(query_param("channel_id", CHANNEL_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(channel_feed()))
        .mount(server)
        .await;
}

fn router_for(config: Config) -> Router {
    let feeds = Arc::new(SiteFeeds::new(config.clone()).unwrap());
    create_router(feeds, Arc::new(config))
}

async fn send_get(app: Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let server = MockServer::start().await;
    let response = send_get(router_for(test_config(&server)), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn openapi_spec_is_served() {
    let server = MockServer::start().await;
    let response = send_get(router_for(test_config(&server)), "/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = json_body(response).await;
    assert!(body["paths"].get("/youtube/uploads").is_some());
}

#[tokio::test]
async fn podcast_episodes_are_listed() {
    let server = MockServer::start().await;
    mount_upstreams(&server).await;

    let response = send_get(router_for(test_config(&server)), "/podcast/episodes").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: PodcastEpisodesResult = json_body(response).await;
    assert_eq!(body.error, None);
    assert_eq!(body.episodes.len(), 1);
    assert_eq!(body.episodes[0].slug, "2024-01-01-pilot-episode");
}

#[tokio::test]
async fn podcast_outage_is_still_ok_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/podcast.xml"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let response = send_get(router_for(test_config(&server)), "/podcast/episodes").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: PodcastEpisodesResult = json_body(response).await;
    assert!(body.episodes.is_empty());
    assert_eq!(
        body.error.as_deref(),
        Some(crate::podcast::EPISODES_UNAVAILABLE)
    );
}

#[tokio::test]
async fn episode_by_slug() {
    let server = MockServer::start().await;
    mount_upstreams(&server).await;

    let response = send_get(
        router_for(test_config(&server)),
        "/podcast/episodes/2024-01-01-pilot-episode",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let episode: PodcastEpisode = json_body(response).await;
    assert_eq!(episode.title, "Pilot Episode");
    assert_eq!(episode.description, "First talk");
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let server = MockServer::start().await;
    mount_upstreams(&server).await;

    let response = send_get(router_for(test_config(&server)), "/podcast/episodes/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: ApiError = json_body(response).await;
    assert_eq!(body.error.code, "not_found");
    assert!(body.error.message.contains("nope"));
}

#[tokio::test]
async fn youtube_uploads_from_public_feed() {
    let server = MockServer::start().await;
    mount_upstreams(&server).await;

    let response = send_get(router_for(test_config(&server)), "/youtube/uploads").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = json_body(response).await;
    assert_eq!(body["liveAvailable"], true);
    assert_eq!(body["featured"][0]["url"], "https://www.youtube.com/watch?v=one");
    assert_eq!(body["shorts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn youtube_uploads_unavailable_without_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/@Nobody"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no id here</html>"))
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.youtube.channel_id = None;
    config.youtube.channel_url = "https://www.youtube.com/@Nobody".into();

    let response = send_get(router_for(config), "/youtube/uploads").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: UploadsResult = json_body(response).await;
    assert_eq!(body, UploadsResult::unavailable());
}

#[tokio::test]
async fn page_snapshot_combines_both_sources() {
    let server = MockServer::start().await;
    mount_upstreams(&server).await;

    let response = send_get(router_for(test_config(&server)), "/page").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = json_body(response).await;
    assert_eq!(body["podcast"]["episodes"].as_array().unwrap().len(), 1);
    assert_eq!(body["youtube"]["featured"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cors_headers_when_enabled() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    config.server.cors_enabled = true;
    config.server.cors_origins = vec!["*".to_string()];

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = router_for(config).oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn cors_specific_origin() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    config.server.cors_origins = vec!["https://podcast.example".to_string()];

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "https://podcast.example")
        .body(Body::empty())
        .unwrap();
    let response = router_for(config).oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://podcast.example")
    );
}

#[tokio::test]
async fn no_cors_headers_when_disabled() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    config.server.cors_enabled = false;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = router_for(config).oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn api_server_spawns() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    config.server.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);
    let feeds = Arc::new(SiteFeeds::new((*config).clone()).unwrap());

    let api_handle = tokio::spawn(async move { start_api_server(feeds, config).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished());
    api_handle.abort();
}
