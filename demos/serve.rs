//! JSON API server demo
//!
//! Reads configuration from the environment (and a `.env` file if present),
//! then serves the aggregated feeds.
//!
//! ```text
//! YOUTUBE_URL=https://www.youtube.com/@SomeChannel \
//! PODCAST_RSS_URL=https://anchor.fm/s/xxxx/podcast/rss \
//! RUST_LOG=site_feeds=debug,tower_http=info \
//!     cargo run --example serve
//! ```
//!
//! After starting, you can:
//! - List podcast episodes via GET http://localhost:8787/podcast/episodes
//! - Fetch YouTube uploads via GET http://localhost:8787/youtube/uploads
//! - Fetch both at once via GET http://localhost:8787/page

use site_feeds::api::start_api_server;
use site_feeds::{Config, SiteFeeds};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("site_feeds=info")),
        )
        .init();

    let config = Config::from_env()?;
    let bind_address = config.server.bind_address;
    let feeds = Arc::new(SiteFeeds::new(config.clone())?);

    println!("Starting site-feeds API on http://{bind_address}");
    println!("  Source for YouTube uploads: {}", feeds.youtube().source());
    println!();
    println!("Example commands:");
    println!("  curl http://{bind_address}/podcast/episodes");
    println!("  curl http://{bind_address}/youtube/uploads");
    println!("  curl http://{bind_address}/openapi.json");

    start_api_server(feeds, Arc::new(config)).await?;

    Ok(())
}
