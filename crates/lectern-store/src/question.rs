//! Question records: a stored student question paired 1:1 with its answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum accepted rating value.
pub const MIN_RATING: u8 = 1;

/// Maximum accepted rating value.
pub const MAX_RATING: u8 = 5;

/// A student-asked question and the answer generated for it.
///
/// Questions are created atomically with their answer: the answer may be
/// fallback text, but a question row never exists without one. The rating
/// transition is one-way: once rated, a question stays rated, though the
/// owner may overwrite their rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique question identifier.
    pub id: u64,

    /// The lesson this question was asked about.
    pub lesson_id: u64,

    /// The student who asked.
    pub user_id: u64,

    /// The question text as submitted.
    pub question: String,

    /// The generated (or fallback) answer text.
    pub answer: String,

    /// Owner-assigned rating of the answer, 1-5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    /// Optional free-text feedback accompanying the rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,

    /// When the rating was last set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated_at: Option<DateTime<Utc>>,

    /// When the question was asked.
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// Returns `true` if the owner has rated this answer.
    #[must_use]
    pub const fn is_rated(&self) -> bool {
        self.rating.is_some()
    }
}
