//! Error types for telemetry recording and reconstruction.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context (paths, field names, group names) for debugging.
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: missing field groups or unknown field names,
//!   raised once at recorder construction, never per row
//! - **File Errors**: append/create failures in the session store
//! - **Serialization Errors**: a byte-sequence field that is not valid text
//! - **Reconstruction Errors**: missing lap streams and malformed rows in
//!   previously recorded files

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for recorder operations.
pub type Result<T, E = RecorderError> = std::result::Result<T, E>;

/// Main error type for recording and reconstruction operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RecorderError {
    #[error("file operation failed: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("field group '{group}' is not configured")]
    MissingFieldGroup { group: String },

    #[error("field group '{group}' names unknown field '{field}'")]
    UnknownField { group: String, field: String },

    #[error("field '{field}' is not valid text: {details}")]
    MalformedField { field: String, details: String },

    #[error("failed to read field group configuration: {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("no recorded stream at {path}")]
    LapNotFound { path: PathBuf },

    #[error("parse error in {context}: {details}")]
    Parse { context: String, details: String },
}

impl RecorderError {
    /// Helper constructor for file errors with path context.
    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RecorderError::File { path: path.into(), source }
    }

    /// Helper constructor for parse errors in recorded data.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        RecorderError::Parse { context: context.into(), details: details.into() }
    }

    /// Whether this error was raised while validating configuration.
    ///
    /// Configuration errors are fatal at startup: the recorder cannot
    /// produce correctly-shaped files without a resolved field-group list.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RecorderError::MissingFieldGroup { .. }
                | RecorderError::UnknownField { .. }
                | RecorderError::Config { .. }
        )
    }
}

impl From<std::io::Error> for RecorderError {
    fn from(err: std::io::Error) -> Self {
        RecorderError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
