//! Chat-display formatting for stored question/answer pairs.
//!
//! Each stored [`Question`] expands into two chat messages: the student's
//! question at its creation time and the assistant's answer one second
//! later, so the answer always sorts strictly after its question.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use lectern_store::Question;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The student asking the question.
    User,
    /// The generated answer.
    Assistant,
}

/// A single message in a lesson's chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display identifier, `user_{question_id}` or `ai_{question_id}`.
    pub id: String,

    /// Message author.
    #[serde(rename = "type")]
    pub sender: Sender,

    /// Message text.
    pub content: String,

    /// Logical display timestamp.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// The student side of a stored question.
    #[must_use]
    pub fn user(question: &Question) -> Self {
        Self {
            id: format!("user_{}", question.id),
            sender: Sender::User,
            content: question.question.clone(),
            created_at: question.created_at,
        }
    }

    /// The assistant side of a stored question, timestamped one second
    /// after the student message.
    #[must_use]
    pub fn assistant(question: &Question) -> Self {
        Self {
            id: format!("ai_{}", question.id),
            sender: Sender::Assistant,
            content: question.answer.clone(),
            created_at: question.created_at + Duration::seconds(1),
        }
    }
}

/// Expands stored questions into a chat transcript.
///
/// The input is expected in creation order (what
/// `QuestionStore::list_by_lesson_and_user` returns); each pair contributes
/// its user message followed by its assistant message.
#[must_use]
pub fn transcript(questions: &[Question]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(questions.len() * 2);
    for question in questions {
        messages.push(ChatMessage::user(question));
        messages.push(ChatMessage::assistant(question));
    }
    messages
}
