//! Error types for GitHub operations

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Token rejected by the API
    #[error("GitHub rejected the token (401) for {0}")]
    Unauthorized(String),

    /// User or repository not found
    #[error("Not found (404): {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("GitHub rate limit exceeded for {0}")]
    RateLimited(String),

    /// Any other non-success status
    #[error("GitHub API returned {status} for {url}: {body}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    /// Invalid base URL or path segment
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}
