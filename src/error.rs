//! Error types for course ingestion, publishing and local storage.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a JSON course document.
///
/// These never escape [`crate::parse_course_content`]: the dispatcher treats any
/// of them as a signal to retry the input as free text.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level value is neither an object nor an array.
    #[error("expected a course object or an array of chapters")]
    NotACourse,

    /// A collection field holds something other than an array.
    #[error("expected an array for `{field}`")]
    NotAnArray { field: String },
}

/// Reasons a parsed course cannot be promoted to a published course.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    /// Nothing could be extracted from the imported content.
    #[error("no content could be extracted: the course has no chapters")]
    NoChapters,

    /// A chapter without any section.
    #[error("chapter {index} has no sections")]
    EmptyChapter { index: usize },

    /// A section whose title is blank.
    #[error("section {section} of chapter {chapter} has no title")]
    UntitledSection { chapter: usize, section: usize },
}

/// Errors from the SQLite-backed local store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored course payload could not be encoded or decoded.
    #[error("invalid course payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Failure of [`crate::db::publish_course`].
#[derive(Debug, Error)]
pub enum PublishOrStoreError {
    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from importing a course file.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Only `.txt`, `.json` and `.md` files are accepted.
    #[error("unsupported file format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from loading [`crate::MatchConfig`] overrides.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}")]
    InvalidValue { var: &'static str, value: String },

    /// Ratios and thresholds must lie in `0.0..=1.0`.
    #[error("{var} must be between 0 and 1, got {value}")]
    OutOfRange { var: &'static str, value: f64 },
}
