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
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("Persona count bounds are invalid: min {min}, default {default}, max {max}")]
    InvalidPersonaCounts {
        min: usize,
        default: usize,
        max: usize,
    },

    #[error("Similarity threshold must be in (0, 1]")]
    InvalidSimilarityThreshold,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
