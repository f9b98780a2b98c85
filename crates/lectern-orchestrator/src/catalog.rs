//! Lesson catalog operations that weave summarization into the lesson
//! lifecycle.

use std::sync::Arc;

use tracing::info;

use lectern_store::{Lesson, LessonDraft, LessonPatch, LessonStore, QuestionStore};

use crate::error::Result;
use crate::summary::SummaryGenerator;

/// Lesson lifecycle operations over the store, with summary enrichment.
///
/// The summary is generated after the lesson row exists and stored as a
/// follow-up patch, so a failed (fallback) summary never blocks lesson
/// creation.
pub struct LessonCatalog {
    lessons: Arc<dyn LessonStore>,
    questions: Arc<dyn QuestionStore>,
    summaries: SummaryGenerator,
}

impl LessonCatalog {
    /// Creates a catalog over the given stores and summary generator.
    #[must_use]
    pub fn new(
        lessons: Arc<dyn LessonStore>,
        questions: Arc<dyn QuestionStore>,
        summaries: SummaryGenerator,
    ) -> Self {
        Self {
            lessons,
            questions,
            summaries,
        }
    }

    /// Creates a lesson and enriches it with a generated summary.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::Store` when validation or a write fails.
    pub async fn create_lesson(&self, draft: LessonDraft) -> Result<Lesson> {
        let lesson = self.lessons.create(draft).await?;
        let summary = self.summaries.summarize(&lesson).await;
        let lesson = self
            .lessons
            .update(lesson.id, LessonPatch::summary_only(summary))
            .await?;
        info!(lesson_id = lesson.id, title = %lesson.title, "lesson created");
        Ok(lesson)
    }

    /// Applies a patch; when the content changed the summary is regenerated.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::Store` when validation or a write fails.
    pub async fn update_lesson(&self, id: u64, patch: LessonPatch) -> Result<Lesson> {
        let content_changed = patch.content.is_some();
        let lesson = self.lessons.update(id, patch).await?;

        if content_changed {
            let summary = self.summaries.summarize(&lesson).await;
            let lesson = self
                .lessons
                .update(id, LessonPatch::summary_only(summary))
                .await?;
            info!(lesson_id = id, "lesson updated, summary refreshed");
            return Ok(lesson);
        }
        info!(lesson_id = id, "lesson updated");
        Ok(lesson)
    }

    /// Fetches a lesson for display, counting the view for student reads
    /// only.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::Store` when the lesson does not exist.
    pub async fn open_lesson(&self, id: u64, elevated: bool) -> Result<Lesson> {
        if !elevated {
            self.lessons.increment_view_count(id).await?;
        }
        Ok(self.lessons.find(id).await?)
    }

    /// Clears the caller's chat history for a lesson, returning how many
    /// exchanges were removed.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::Store` when the delete fails.
    pub async fn clear_chat(&self, lesson_id: u64, user_id: u64) -> Result<usize> {
        let removed = self
            .questions
            .delete_by_lesson_and_user(lesson_id, user_id)
            .await?;
        info!(lesson_id, user_id, removed, "chat history cleared");
        Ok(removed)
    }
}
