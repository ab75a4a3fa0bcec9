//! Error types for issuelinks

use thiserror::Error;

/// Result type alias for issuelinks operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for issuelinks operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Listing the user's repositories failed; nothing was scanned
    #[error("Failed to list repositories: {0}")]
    Listing(String),

    /// Fetching issues for a single repository failed
    #[error("Failed to fetch issues for {repository}: {message}")]
    Source {
        /// Repository the request was made for
        repository: String,
        /// Underlying error message
        message: String,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
