//! Error types for the empathizer library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using empathizer's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building profiles or comparing them.
///
/// Per-file problems (undecodable content, unsupported extensions, parse
/// failures) are not errors at this level: they are recorded as warnings in
/// the coverage report and analysis continues.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Unsupported language for the given file.
    #[error("Unsupported language for file: {path}")]
    UnsupportedLanguage { path: PathBuf },

    /// Parse error from tree-sitter.
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Analysis-specific error.
    #[error("Analysis error: {message}")]
    Analysis { message: String },

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A repository could not be retrieved at all.
    #[error("Failed to fetch repository {repository}: {message}")]
    Fetch { repository: String, message: String },

    /// Neither repository contained a single file that could be scored.
    #[error("No analyzable input: neither repository contains a supported source file")]
    NoAnalyzableInput,

    /// Threshold violation (for CI/CD integration).
    #[error("Threshold violation: {message}")]
    ThresholdViolation { message: String, score: f64 },
}

impl Error {
    /// Create a new analysis error.
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis {
            message: message.into(),
        }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new fetch error.
    pub fn fetch(repository: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            repository: repository.into(),
            message: message.into(),
        }
    }

    /// Create a threshold violation error.
    pub fn threshold_violation(message: impl Into<String>, score: f64) -> Self {
        Self::ThresholdViolation {
            message: message.into(),
            score,
        }
    }
}
