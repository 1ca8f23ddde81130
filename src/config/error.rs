//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Upload endpoint must be an http(s) URL")]
    InvalidUploadEndpoint,

    #[error("Upload timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("Maximum proof size must be between 1 byte and 50 MB")]
    InvalidProofSize,

    #[error("At least one proof MIME type must be allowed")]
    NoProofMimeTypes,

    #[error("Only image MIME types may be allowed for proofs: {0}")]
    NonImageMimeType(String),

    #[error("Reconciliation windows must be between 1 and 366 days")]
    InvalidWindow,

    #[error("top_services must be at least 1")]
    InvalidTopServices,
}
