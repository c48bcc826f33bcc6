//! Error types for the groundline-search crate.
//!
//! Retrieval Source implementations report failures through [`SearchError`];
//! the preparation chain itself never fails on source data. Messages never
//! contain API keys or query text.

/// Errors that can occur while retrieving or preparing sources.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to the retrieval back-end failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The retrieval back-end did not answer in time.
    #[error("retrieval timed out: {0}")]
    Timeout(String),

    /// The back-end response could not be parsed into sources.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid source preparation configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The back-end is not configured or refuses service (quota, missing key).
    #[error("retrieval unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for groundline-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
