//! Question answering against lesson content.

use std::sync::Arc;

use tracing::{info, warn};

use lectern_gateway::{GenerateOptions, LlmGateway};
use lectern_store::{Lesson, Question, QuestionStore};

use crate::chat::ChatMessage;
use crate::error::{LecternError, Result};

/// Minimum accepted question length in characters.
pub const MIN_QUESTION_LEN: usize = 5;

/// Maximum accepted question length in characters.
pub const MAX_QUESTION_LEN: usize = 500;

/// Fallback answer when the provider answered with a non-success status.
pub const REJECTED_FALLBACK: &str =
    "I apologize, but I cannot process your question right now. Please try again later.";

/// Fallback answer when the request failed in transit or the response was
/// unusable.
pub const ERROR_FALLBACK: &str =
    "An error occurred while processing your question. Please try again.";

/// Fixed persona for the answering model.
const SYSTEM_INSTRUCTION: &str = "You are a helpful educational assistant. Answer questions \
     based only on the provided lesson content. Be clear, educational, and encouraging.";

/// Generation tuning for answers.
const ANSWER_OPTIONS: GenerateOptions = GenerateOptions::new(500, 0.7);

/// A stored question/answer exchange, formatted for chat display.
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    /// The persisted question row.
    pub question: Question,

    /// The student's side of the exchange.
    pub user_message: ChatMessage,

    /// The assistant's side, timestamped strictly after the student's.
    pub ai_message: ChatMessage,
}

/// Answers student questions from lesson content and persists the exchange.
///
/// A question that passes validation always produces a stored Q&A pair:
/// when generation fails, one of two fixed fallback strings is persisted as
/// the answer instead of surfacing an error. The student always sees a
/// stored answer, never a bare error; only store failures propagate.
pub struct AnswerOrchestrator {
    gateway: Arc<dyn LlmGateway>,
    questions: Arc<dyn QuestionStore>,
}

impl AnswerOrchestrator {
    /// Creates an orchestrator over the given gateway and question store.
    #[must_use]
    pub fn new(gateway: Arc<dyn LlmGateway>, questions: Arc<dyn QuestionStore>) -> Self {
        Self { gateway, questions }
    }

    /// Answers `question` from the lesson's content and persists the pair.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::InvalidQuestion` when the question is outside
    /// [`MIN_QUESTION_LEN`], [`MAX_QUESTION_LEN`] (nothing is persisted)
    /// and `LecternError::Store` when the write fails.
    pub async fn answer(
        &self,
        lesson: &Lesson,
        user_id: u64,
        question: &str,
    ) -> Result<AnswerRecord> {
        let length = question.chars().count();
        if !(MIN_QUESTION_LEN..=MAX_QUESTION_LEN).contains(&length) {
            return Err(LecternError::invalid_question(length));
        }

        let prompt = build_prompt(lesson, question);
        let answer = match self
            .gateway
            .generate(SYSTEM_INSTRUCTION, &prompt, &ANSWER_OPTIONS)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    lesson_id = lesson.id,
                    user_id,
                    error = %e,
                    "generation failed, storing fallback answer"
                );
                if e.is_provider_rejection() {
                    REJECTED_FALLBACK.to_string()
                } else {
                    ERROR_FALLBACK.to_string()
                }
            }
        };

        let stored = self
            .questions
            .create(lesson.id, user_id, question, &answer)
            .await?;
        info!(
            lesson_id = lesson.id,
            user_id,
            question_id = stored.id,
            "question answered and stored"
        );

        Ok(AnswerRecord {
            user_message: ChatMessage::user(&stored),
            ai_message: ChatMessage::assistant(&stored),
            question: stored,
        })
    }

    /// The caller's chat transcript for a lesson, in display order.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::Store` when the read fails.
    pub async fn transcript(&self, lesson_id: u64, user_id: u64) -> Result<Vec<ChatMessage>> {
        let questions = self
            .questions
            .list_by_lesson_and_user(lesson_id, user_id)
            .await?;
        Ok(crate::chat::transcript(&questions))
    }
}

/// Builds the deterministic answering prompt from lesson content and the
/// student question.
fn build_prompt(lesson: &Lesson, question: &str) -> String {
    format!(
        "Lesson Title: {}\n\n\
         Lesson Content:\n{}\n\n\
         Student Question: {}\n\n\
         Please provide a helpful answer based on the lesson content above. \
         If the question cannot be answered from the lesson content, \
         kindly let the student know and suggest they ask their teacher for more information.",
        lesson.title, lesson.content, question
    )
}
