//! Error types for site-feeds
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error variants (network, HTTP status, feed parsing, configuration)
//! - HTTP status code mapping for the API layer
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for site-feeds operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for site-feeds
///
/// Fetchers return these on any failure; the orchestration layer catches them
/// and degrades to cached or empty results so page rendering never sees them.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "YOUTUBE_MAX_PAGES")
        key: Option<String>,
    },

    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("{context} returned HTTP {status}: {url}")]
    HttpStatus {
        /// Which upstream call failed (e.g., "YouTube playlistItems API")
        context: String,
        /// The HTTP status code
        status: u16,
        /// The requested URL with credentials stripped
        url: String,
    },

    /// Feed body could not be parsed as RSS or Atom
    #[error("feed parse error: {0}")]
    FeedParse(String),

    /// Invalid URL in configuration or upstream data
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Serialization error (malformed API JSON)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::HttpStatus`], dropping the query string so API keys never reach logs
    pub fn http_status(context: impl Into<String>, status: u16, url: &str) -> Self {
        let url = url.split('?').next().unwrap_or(url).to_string();
        Error::HttpStatus {
            context: context.into(),
            status,
            url,
        }
    }
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "not found: episode 2024-01-01-pilot",
///     "details": {
///       "slug": "2024-01-01-pilot"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "upstream_status")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::Config { .. } => 400,
            Error::InvalidUrl(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 502 Bad Gateway - upstream feed/API problems
            Error::Network(_) => 502,
            Error::HttpStatus { .. } => 502,
            Error::FeedParse(_) => 502,
            Error::Serialization(_) => 502,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Network(_) => "network_error",
            Error::HttpStatus { .. } => "upstream_status",
            Error::FeedParse(_) => "feed_parse_error",
            Error::InvalidUrl(_) => "invalid_url",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
            Error::NotFound(_) => "not_found",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::HttpStatus {
                context,
                status,
                url,
            } => Some(serde_json::json!({
                "context": context,
                "upstream_status": status,
                "url": url,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
