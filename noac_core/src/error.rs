//! Error types for the noac_core library.
//!
//! The estimator and the dosing evaluator are total and never produce these;
//! errors only come from input collection, configuration and the outcome log.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for noac_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Patient biometrics or other intake values outside the accepted domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Intake workflow step submitted out of order
    #[error("Intake error: {0}")]
    Intake(String),
}
