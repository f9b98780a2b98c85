//! Error types for store operations.

/// A specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading or writing the data stores.
///
/// Store failures are never masked by the orchestration layer: losing a
/// write is a hard failure, unlike a failed generation which degrades to
/// fallback text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{entity} not found: id {id}")]
    NotFound {
        /// Entity kind ("lesson" or "question").
        entity: &'static str,
        /// The identifier that was looked up.
        id: u64,
    },

    /// A create or update violated a domain invariant. Nothing was written.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the violated rule.
        message: String,
    },

    /// The caller is not allowed to mutate this record.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Description of the ownership rule that was violated.
        message: String,
    },
}

impl StoreError {
    /// Creates a `NotFound` error for a lesson id.
    #[must_use]
    pub const fn lesson_not_found(id: u64) -> Self {
        Self::NotFound {
            entity: "lesson",
            id,
        }
    }

    /// Creates a `NotFound` error for a question id.
    #[must_use]
    pub const fn question_not_found(id: u64) -> Self {
        Self::NotFound {
            entity: "question",
            id,
        }
    }

    /// Creates a `Validation` error with the given message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a `Forbidden` error with the given message.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is a missing-record lookup.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
