//! errors.rs - Custom error types for the semprobe-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `semprobe-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProbeError {
    /// The ResponseSet (or another plain-data input) cannot be processed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An external collaborator the core depends on, such as the embedding
    /// provider, could not be reached or returned garbage.
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// A configuration value is outside the range its metric accepts.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Model request failed: {0}")]
    ModelRequest(String),

    #[error("Failed to render prompt template: {0}")]
    TemplateError(String),

    #[error("Failed to serialize results: {0}")]
    SerializationError(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
    
    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

impl From<csv::Error> for ProbeError {
    fn from(e: csv::Error) -> Self {
        ProbeError::SerializationError(e.to_string())
    }
}

impl From<serde_json::Error> for ProbeError {
    fn from(e: serde_json::Error) -> Self {
        ProbeError::SerializationError(e.to_string())
    }
}
