//! Lectern derived read models and exports.
//!
//! Everything in this crate is a pure computation over plain lesson and
//! question slices: the caller fetches records from the stores and feeds
//! them in. That keeps analytics, statistics, the student dashboard, and
//! the exporters fully unit-testable with fixed inputs.
//!
//! # Types
//!
//! - [`analytics::LessonAnalytics`] - Per-lesson question insight for admins
//! - [`statistics::CatalogStatistics`] - Catalog-wide totals and rankings
//! - [`dashboard::StudentDashboard`] - A student's home-screen read model
//! - [`LessonExport`] - A lesson's full Q&A history prepared for export
//!
//! # Generators
//!
//! - [`json::JsonExporter`] - Compact or pretty JSON export with file output
//! - [`MarkdownTranscript`] - Human-readable Markdown transcript

pub mod analytics;
pub mod dashboard;
pub mod json;
mod markdown;
pub mod statistics;

pub use markdown::MarkdownTranscript;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lectern_store::{Lesson, Question};

/// Errors that can occur during export generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize the export to JSON.
    #[error("failed to serialize export: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to write the export file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// A lesson's complete question history, prepared for export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonExport {
    /// Identifier of the exported lesson.
    pub lesson_id: u64,

    /// Title of the exported lesson.
    pub lesson_title: String,

    /// Subject of the exported lesson.
    pub subject: String,

    /// Generated summary, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Number of exported exchanges.
    pub total_questions: usize,

    /// The exchanges, in creation order.
    pub questions: Vec<ExportedQuestion>,
}

/// One exported question/answer exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedQuestion {
    /// The asking student.
    pub user_id: u64,

    /// The question text.
    pub question: String,

    /// The stored answer text.
    pub answer: String,

    /// Owner rating, when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    /// Owner feedback, when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,

    /// When the question was asked.
    pub asked_at: DateTime<Utc>,
}

impl LessonExport {
    /// Assembles an export from a lesson and its questions.
    ///
    /// Questions are expected in creation order (what
    /// `QuestionStore::list_by_lesson` returns).
    #[must_use]
    pub fn new(lesson: &Lesson, questions: &[Question]) -> Self {
        Self {
            lesson_id: lesson.id,
            lesson_title: lesson.title.clone(),
            subject: lesson.subject.clone(),
            summary: lesson.summary.clone(),
            total_questions: questions.len(),
            questions: questions
                .iter()
                .map(|q| ExportedQuestion {
                    user_id: q.user_id,
                    question: q.question.clone(),
                    answer: q.answer.clone(),
                    rating: q.rating,
                    feedback: q.feedback.clone(),
                    asked_at: q.created_at,
                })
                .collect(),
        }
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::{lesson, question};
    use super::*;

    #[test]
    fn test_export_assembles_in_order() {
        let lesson = lesson(5, "Photosynthesis", "Biology", 1);
        let questions = vec![
            question(1, 5, 7, "How do plants eat?", 1),
            question(2, 5, 9, "What is chlorophyll?", 2),
        ];

        let export = LessonExport::new(&lesson, &questions);
        assert_eq!(export.lesson_title, "Photosynthesis");
        assert_eq!(export.total_questions, 2);
        assert_eq!(export.questions[0].question, "How do plants eat?");
        assert_eq!(export.questions[1].user_id, 9);
    }

    #[test]
    fn test_export_round_trips_through_json() {
        let lesson = lesson(5, "Photosynthesis", "Biology", 1);
        let questions = vec![question(1, 5, 7, "How do plants eat?", 1)];
        let export = LessonExport::new(&lesson, &questions);

        let json = serde_json::to_string(&export).unwrap();
        let parsed: LessonExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.lesson_id, 5);
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].answer, export.questions[0].answer);
    }
}
