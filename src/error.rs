//! Error types for the tlc_scan library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tlc_scan operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types for plate analysis operations
///
/// None of these are fatal: a caller is expected to surface
/// [`AnalysisError::user_message`] and keep whatever result table it already
/// had.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Source image is absent, empty, or could not be decoded
    #[error("Invalid image: {message}")]
    InvalidImage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No spots satisfied the detection filters
    #[error("No spots satisfied the detection filters")]
    EmptyResult,

    /// Export destination has an extension with no known encoding
    #[error("Unsupported export format '{extension}' for {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// A parameter lies outside its accepted range
    #[error("Parameter out of range: {parameter} = {value} (expected {expected})")]
    ParameterOutOfRange {
        parameter: String,
        value: String,
        expected: String,
    },

    /// Writing the result table failed
    #[error("Export failed: {message}")]
    Export {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Background analysis ended without delivering a result
    #[error("Background analysis failed: {message}")]
    Worker { message: String },

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Create an invalid image error with context
    pub fn invalid_image<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::InvalidImage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid image error without an underlying cause
    pub fn invalid_image_msg(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a parameter range error
    pub fn parameter(
        parameter: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        Self::ParameterOutOfRange {
            parameter: parameter.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Create an export error with context
    pub fn export<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Export {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if changing the inputs can clear this error
    ///
    /// `Io` and `Worker` are environmental: the same inputs may succeed on a
    /// later attempt, but no parameter change will fix them. Every variant is
    /// still reportable through [`AnalysisError::user_message`].
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AnalysisError::Io(_) | AnalysisError::Worker { .. })
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::InvalidImage { .. } => {
                "Could not load the plate image. Please check the file and try again.".to_string()
            }
            AnalysisError::EmptyResult => {
                "No spots were found. Try widening the area bounds or adjusting the threshold."
                    .to_string()
            }
            AnalysisError::UnsupportedFormat { extension, .. } => format!(
                "Cannot export to '.{}' files. Use .csv, .tsv, .json or .xlsx.",
                extension
            ),
            AnalysisError::ParameterOutOfRange {
                parameter, expected, ..
            } => format!("The value for {} must be {}.", parameter, expected),
            AnalysisError::Export { .. } => {
                "Could not write the results file. Check the destination and try again."
                    .to_string()
            }
            AnalysisError::Config { .. } => {
                "The configuration file could not be read. Please check its contents.".to_string()
            }
            AnalysisError::Worker { .. } => {
                "The background analysis stopped unexpectedly. Please run it again.".to_string()
            }
            AnalysisError::Io(_) => {
                "A file could not be read or written. Check the path and permissions.".to_string()
            }
        }
    }
}
