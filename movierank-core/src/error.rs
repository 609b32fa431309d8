use thiserror::Error;

/// Why an incoming stream line was rejected.
///
/// Rejected lines are dropped by the ingest path; they never reach the
/// window state and are never retried.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed rating record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("rating record has no movieId")]
    MissingMovieId,
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("stream line is not valid UTF-8")]
    InvalidUtf8,
}

/// Invalid pipeline parameters, rejected before anything starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("slide interval must be positive")]
    ZeroSlide,
    #[error("window duration must be positive")]
    ZeroWindow,
    #[error("window duration {window_ms}ms is not a multiple of slide {slide_ms}ms")]
    WindowNotMultipleOfSlide { window_ms: i64, slide_ms: i64 },
    #[error("display row count must be positive")]
    ZeroRows,
    #[error("min delay {min_ms}ms exceeds max delay {max_ms}ms")]
    DelayRange { min_ms: u64, max_ms: u64 },
    #[error("movie catalog is empty")]
    EmptyCatalog,
}
