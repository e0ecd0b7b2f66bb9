//! Error types shared by every backend.

use thiserror::Error;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing or using a backend
#[derive(Debug, Error)]
pub enum Error {
    /// IO error from the text backend
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection or login rejected (MySQL connect, spreadsheet sign-in)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A SQL statement could not be executed
    #[error("Unable to execute statement `{statement}`: {message}")]
    QueryFailed {
        /// The offending statement text
        statement: String,
        /// Driver-reported cause
        message: String,
    },

    /// A row could not be inserted
    #[error("Unable to add row ({row}) to table ({table}): {message}")]
    RowInsert {
        /// Target table name
        table: String,
        /// Rendering of the rejected row
        row: String,
        /// Driver-reported cause
        message: String,
    },

    /// A loose factory parameter was missing or had the wrong shape
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Unrecognized backend tag, or an operation the backend does not support
    #[error("Unsupported backend: {0}")]
    Unsupported(String),

    /// The spreadsheet service answered with a non-success status
    #[error("Spreadsheet service error ({status}): {message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// No spreadsheet matched the requested title
    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    /// The configured worksheet index exceeds the worksheet feed
    #[error("Worksheet index {0} out of range")]
    WorksheetOutOfRange(usize),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Unreadable or unparseable backend configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
