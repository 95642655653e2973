//! Report error types
//!
//! Defines all errors that can occur between form submission and chart
//! rendering.

use thiserror::Error;

/// Errors that can occur while producing a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// A required form field was left empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A datetime field did not match `YYYY-MM-DDTHH:MM`
    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),

    /// Unknown `data_type` value
    #[error("Invalid granularity: {0}")]
    InvalidGranularity(String),

    /// Network or transport failure
    #[cfg(feature = "native")]
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Body was not JSON or did not have the expected fields
    #[error("Decode error: {0}")]
    Decode(String),

    /// `date_list` and `count_list` are not index-aligned
    #[error("Length mismatch: {labels} labels but {values} values")]
    LengthMismatch { labels: usize, values: usize },

    /// Chart surface failed to create the chart
    #[error("Render error: {0}")]
    Render(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Decode(err.to_string())
    }
}

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;
