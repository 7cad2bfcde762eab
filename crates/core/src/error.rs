//! Error types for the pricewatch system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pricewatch system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A bar date that is not a `YYYY-MM-DD` calendar day.
    #[error("Invalid date '{date}': {source}")]
    InvalidDate {
        date: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Interpolation anchors that do not span a positive number of days.
    #[error("Non-positive span between anchors {before} and {after}")]
    NonPositiveSpan { before: String, after: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an invalid date error.
    pub fn invalid_date(date: impl Into<String>, source: chrono::ParseError) -> Self {
        Error::InvalidDate {
            date: date.into(),
            source,
        }
    }

    /// Create a non-positive span error.
    pub fn non_positive_span(before: impl Into<String>, after: impl Into<String>) -> Self {
        Error::NonPositiveSpan {
            before: before.into(),
            after: after.into(),
        }
    }
}
