//! Defines the custom error types for the mailvet application.
//!
//! The DNS, SMTP and geolocation surfaces degrade into negative probe
//! results rather than erroring, so this enum only covers what a caller
//! can actually hit: configuration, setup and filesystem problems.

use std::io;
use thiserror::Error;

/// The primary error type for the validation process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error occurring during configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error initializing necessary components (e.g., clients, resolvers).
    #[error("Initialization Error: {0}")]
    Initialization(String),

    /// Error related to file input/output operations.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization or deserialization.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    /// A malformed input line or record that cannot enter the pipeline.
    #[error("Invalid Input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_identify_the_category() {
        let err = AppError::Config("zero workers".to_string());
        assert_eq!(err.to_string(), "Configuration Error: zero workers");

        let err = AppError::InvalidInput("empty identifier".to_string());
        assert_eq!(err.to_string(), "Invalid Input: empty identifier");
    }

    #[test]
    fn io_errors_convert_via_from() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: AppError = io_err.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
