//! Error types for the orchestration layer.
//!
//! Gateway failures never appear here: `answer` and `summarize` degrade to
//! fixed fallback text and `recommend` to an empty list. What does surface
//! is caller error (an out-of-bounds question) and store failure, which is
//! never masked.

use std::path::PathBuf;

use lectern_store::StoreError;

use crate::answer::{MAX_QUESTION_LEN, MIN_QUESTION_LEN};

/// A specialized `Result` type for orchestration operations.
pub type Result<T> = std::result::Result<T, LecternError>;

/// Errors that can occur during orchestration and configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum LecternError {
    /// The submitted question is outside the accepted length bounds.
    /// Nothing was persisted.
    #[error("question must be between {min} and {max} characters, got {length}")]
    InvalidQuestion {
        /// Character count of the submitted question.
        length: usize,
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// A data-store operation failed. Store failures propagate unmasked;
    /// losing a write is not an acceptable silent case.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid JSON syntax in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your lectern.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },
}

impl LecternError {
    /// Creates an `InvalidQuestion` error for the given submitted length.
    #[must_use]
    pub const fn invalid_question(length: usize) -> Self {
        Self::InvalidQuestion {
            length,
            min: MIN_QUESTION_LEN,
            max: MAX_QUESTION_LEN,
        }
    }

    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}
