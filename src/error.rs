//! Error types for the groundline crate.
//!
//! Each error variant carries a stable error code (SCREAMING_SNAKE_CASE)
//! that is included in the Display output and accessible via
//! [`GroundlineError::code()`]. Codes are part of the public API contract and
//! travel to callers in `PipelineEvent::Error`.
//!
//! Retrieval failures never appear here: they are absorbed into an empty
//! source list before the pipeline sees them.

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Invalid or missing configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// The request itself is unusable (empty query).
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

    /// The Text Generator refused or failed the request.
    pub const GENERATION_FAILED: &str = "GENERATION_FAILED";

    /// The Text Generator's delta stream broke mid-answer.
    pub const STREAM_FAILED: &str = "STREAM_FAILED";

    /// The caller cancelled the request.
    pub const CANCELLED: &str = "CANCELLED";

    /// Reading or writing a file failed.
    pub const IO_ERROR: &str = "IO_ERROR";
}

/// Errors produced by the grounding pipeline.
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, thiserror::Error)]
pub enum GroundlineError {
    /// Invalid or missing configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),

    /// The request cannot be answered as given.
    #[error("[{}] {}", error_codes::INVALID_REQUEST, .0)]
    InvalidRequest(String),

    /// The Text Generator failed before producing a stream.
    #[error("[{}] {}", error_codes::GENERATION_FAILED, .0)]
    Generation(String),

    /// The delta stream failed part-way through.
    #[error("[{}] {}", error_codes::STREAM_FAILED, .0)]
    Stream(String),

    /// The request was cancelled by the caller.
    #[error("[{}] {}", error_codes::CANCELLED, .0)]
    Cancelled(String),

    /// File I/O failed.
    #[error("[{}] {}", error_codes::IO_ERROR, .0)]
    Io(String),
}

impl GroundlineError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => error_codes::CONFIG_INVALID,
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            Self::Generation(_) => error_codes::GENERATION_FAILED,
            Self::Stream(_) => error_codes::STREAM_FAILED,
            Self::Cancelled(_) => error_codes::CANCELLED,
            Self::Io(_) => error_codes::IO_ERROR,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Config(m)
            | Self::InvalidRequest(m)
            | Self::Generation(m)
            | Self::Stream(m)
            | Self::Cancelled(m)
            | Self::Io(m) => m,
        }
    }

    /// Returns true if this error represents a transient failure that can be
    /// retried by re-submitting the request.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Generation(_) | Self::Stream(_) => true,
            Self::Config(_) | Self::InvalidRequest(_) | Self::Cancelled(_) | Self::Io(_) => {
                false
            }
        }
    }
}

impl From<std::io::Error> for GroundlineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<groundline_search::SearchError> for GroundlineError {
    fn from(err: groundline_search::SearchError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenience alias for groundline results.
pub type Result<T> = std::result::Result<T, GroundlineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        assert_eq!(GroundlineError::Config("x".into()).code(), "CONFIG_INVALID");
        assert_eq!(
            GroundlineError::InvalidRequest("x".into()).code(),
            "INVALID_REQUEST"
        );
        assert_eq!(GroundlineError::Generation("x".into()).code(), "GENERATION_FAILED");
        assert_eq!(GroundlineError::Stream("x".into()).code(), "STREAM_FAILED");
        assert_eq!(GroundlineError::Cancelled("x".into()).code(), "CANCELLED");
        assert_eq!(GroundlineError::Io("x".into()).code(), "IO_ERROR");
    }

    #[test]
    fn display_includes_code_prefix() {
        let err = GroundlineError::Generation("model overloaded".into());
        let display = format!("{err}");
        assert!(display.starts_with("[GENERATION_FAILED]"));
        assert!(display.contains("model overloaded"));
    }

    #[test]
    fn message_strips_prefix() {
        let err = GroundlineError::Stream("unexpected EOF".into());
        assert_eq!(err.message(), "unexpected EOF");
    }

    #[test]
    fn retryable_classification() {
        assert!(GroundlineError::Generation("503".into()).is_retryable());
        assert!(GroundlineError::Stream("reset".into()).is_retryable());
        assert!(!GroundlineError::Config("bad".into()).is_retryable());
        assert!(!GroundlineError::Cancelled("user".into()).is_retryable());
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
        let err: GroundlineError = io.into();
        assert_eq!(err.code(), "IO_ERROR");
        assert!(err.message().contains("missing.toml"));
    }

    #[test]
    fn search_config_error_converts() {
        let err: GroundlineError =
            groundline_search::SearchError::Config("max_sources must be greater than 0".into())
                .into();
        assert_eq!(err.code(), "CONFIG_INVALID");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GroundlineError>();
    }
}
