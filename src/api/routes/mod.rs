//! Route handlers for the JSON API
//!
//! Handlers are organized by domain:
//! - [`podcast`] - Podcast episodes
//! - [`youtube`] - YouTube uploads
//! - [`pages`] - Whole-page aggregates
//! - [`system`] - Health and OpenAPI

mod pages;
mod podcast;
mod system;
mod youtube;

// Re-export all handlers so `routes::function_name` works
pub use pages::*;
pub use podcast::*;
pub use system::*;
pub use youtube::*;
