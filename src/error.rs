//! Error types for the bank report parsing library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur around report parsing.
///
/// Data-quality problems inside a report never surface here: malformed
/// lines are skipped and empty reports are valid results. These variants
/// cover caller mistakes and the I/O done by the command-line shells.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred while reading a report or config file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No parser is registered under the requested key.
    #[error("Unsupported report type: {0}")]
    UnsupportedParser(String),

    /// A file name did not match any known report naming rule.
    #[error("Cannot detect report type from file name: {0}")]
    UndetectedReport(String),

    /// Unknown field type name in a column definition.
    #[error("Invalid field type: {0}")]
    InvalidFieldType(String),

    /// Configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization of a parse result failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A resolved span could not be sliced out of its line.
    #[error("Extraction error at line {line}: {message}")]
    Extraction { line: usize, message: String },
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
