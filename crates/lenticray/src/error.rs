//! Error types for the Lenticray client.

use std::path::PathBuf;
use thiserror::Error;

/// A row-level problem found before a page is submitted.
///
/// Row numbers are 1-based local sequence numbers, as shown in the grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// `Sample Date` is present but not `YYYY-MM-DD`.
    #[error("Sample Date in row {row} is not in the correct format (YYYY-MM-DD).")]
    InvalidDate { row: usize, value: String },

    /// A variable cell does not parse as a finite number.
    #[error("Variable '{column}' in row {row} must be numeric.")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    /// The row carries variable values but no `Sample Date`.
    #[error("Row {row} has variable data but no Sample Date.")]
    MissingDate { row: usize },
}

impl ValidationError {
    /// 1-based row the error refers to.
    pub fn row(&self) -> usize {
        match self {
            ValidationError::InvalidDate { row, .. }
            | ValidationError::NonNumeric { row, .. }
            | ValidationError::MissingDate { row } => *row,
        }
    }

    /// Column key the error refers to.
    pub fn column(&self) -> &str {
        match self {
            ValidationError::InvalidDate { .. } | ValidationError::MissingDate { .. } => {
                crate::model::SAMPLE_DATE
            }
            ValidationError::NonNumeric { column, .. } => column,
        }
    }
}

/// Main error type for Lenticray operations.
#[derive(Debug, Error)]
pub enum LenticrayError {
    /// The request never produced a response.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Server rejected the request ({status}): {message}")]
    Server { status: u16, message: String },

    /// A response body could not be decoded.
    #[error("Unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Page data failed client-side validation; nothing was sent.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Save was requested but every row on the page is blank.
    #[error("No data to save on this page.")]
    EmptySubmission,

    /// The navigation guard cancelled the pending action.
    #[error("{0} cancelled: unsaved changes were kept")]
    Cancelled(String),

    /// Page number outside `1..=total_pages`.
    #[error("Page {page} is out of range (1-{total_pages})")]
    InvalidPage { page: usize, total_pages: usize },

    /// Edit targeted a row id that is not on the resident page.
    #[error("Row {0} is not on the current page")]
    UnknownRow(usize),

    /// Edit targeted a column that does not exist.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// Edit targeted a derived, display-only column.
    #[error("Column '{0}' is read-only")]
    ReadOnlyColumn(String),

    /// Value rejected by the cell editor.
    #[error("Invalid value for column '{column}': {source}")]
    Cell {
        column: String,
        #[source]
        source: CellError,
    },

    /// A CSV file does not meet the upload requirements.
    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading or writing a local file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The resident page may not match the server and must be fetched again.
    #[error("This page is out of date; reload it before saving")]
    StalePage,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A raw cell value that cannot be committed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellError {
    /// Input contains characters a numeric cell never accepts.
    #[error("'{0}' is not a number")]
    NotNumeric(String),

    /// Input is a numeric prefix such as `-` or `.` with no digits.
    #[error("'{0}' is an incomplete number")]
    Incomplete(String),
}

/// Result type alias for Lenticray operations.
pub type Result<T> = std::result::Result<T, LenticrayError>;
