//! Application state for the API server

use crate::SiteFeeds;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned per request; the services sit behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The podcast and YouTube services
    pub feeds: Arc<SiteFeeds>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(feeds: Arc<SiteFeeds>) -> Self {
        Self { feeds }
    }
}
