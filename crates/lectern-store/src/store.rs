//! Async store traits the orchestration layer programs against.
//!
//! Implementors encapsulate the actual persistence mechanism; consumers stay
//! decoupled from any particular backend. The in-memory implementations in
//! [`crate::memory`] back the CLI and the test suites.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lesson::{Lesson, LessonDraft, LessonPatch};
use crate::question::Question;

/// Default page size for lesson listings.
const DEFAULT_PER_PAGE: u32 = 15;

/// Filter criteria for lesson listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonFilter {
    /// Restrict to this subject.
    pub subject: Option<String>,

    /// Restrict to this grade level.
    pub grade_level: Option<String>,

    /// Case-insensitive substring match over title, content, and subject.
    pub search: Option<String>,
}

impl LessonFilter {
    /// Returns `true` if the lesson satisfies every provided criterion.
    #[must_use]
    pub fn matches(&self, lesson: &Lesson) -> bool {
        if let Some(ref subject) = self.subject {
            if !lesson.subject.eq_ignore_ascii_case(subject) {
                return false;
            }
        }
        if let Some(ref grade_level) = self.grade_level {
            if !lesson.grade_level.eq_ignore_ascii_case(grade_level) {
                return false;
            }
        }
        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            let haystack = format!(
                "{}\n{}\n{}",
                lesson.title.to_lowercase(),
                lesson.content.to_lowercase(),
                lesson.subject.to_lowercase()
            );
            if !haystack.contains(&term) {
                return false;
            }
        }
        true
    }
}

/// One-based pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page number, starting at 1.
    pub number: u32,

    /// Records per page.
    pub per_page: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Page {
    /// Creates a page window with the given number and size.
    #[must_use]
    pub const fn new(number: u32, per_page: u32) -> Self {
        Self { number, per_page }
    }

    /// Index of the first record in this window.
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.number.saturating_sub(1) as usize) * self.per_page as usize
    }
}

/// Filter criteria for a user's question history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFilter {
    /// Restrict to questions about this lesson.
    pub lesson_id: Option<u64>,

    /// Case-insensitive substring match over the question text.
    pub search: Option<String>,
}

impl QuestionFilter {
    /// Returns `true` if the question satisfies every provided criterion.
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        if let Some(lesson_id) = self.lesson_id {
            if question.lesson_id != lesson_id {
                return false;
            }
        }
        if let Some(ref term) = self.search {
            if !question
                .question
                .to_lowercase()
                .contains(&term.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Persistence for lesson records.
#[async_trait]
pub trait LessonStore: Send + Sync {
    /// Creates a lesson from a validated draft.
    async fn create(&self, draft: LessonDraft) -> Result<Lesson>;

    /// Fetches a lesson by id.
    async fn find(&self, id: u64) -> Result<Lesson>;

    /// Applies a partial update to a lesson.
    async fn update(&self, id: u64, patch: LessonPatch) -> Result<Lesson>;

    /// Removes a lesson.
    async fn delete(&self, id: u64) -> Result<()>;

    /// Lists lessons matching the filter, newest first, paginated.
    async fn list(&self, filter: &LessonFilter, page: Page) -> Result<Vec<Lesson>>;

    /// Bumps the student view counter.
    async fn increment_view_count(&self, id: u64) -> Result<()>;

    /// Total number of lessons.
    async fn count(&self) -> Result<usize>;
}

/// Persistence for question/answer records.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Stores a question together with its answer.
    async fn create(
        &self,
        lesson_id: u64,
        user_id: u64,
        question: &str,
        answer: &str,
    ) -> Result<Question>;

    /// Fetches a question by id.
    async fn find(&self, id: u64) -> Result<Question>;

    /// Sets or overwrites the rating and feedback on a question.
    ///
    /// Only the owning user may rate; the transition is one-way (there is no
    /// un-rate) but repeat ratings by the owner overwrite.
    async fn rate(
        &self,
        id: u64,
        user_id: u64,
        rating: u8,
        feedback: Option<String>,
    ) -> Result<Question>;

    /// Removes a question.
    async fn delete(&self, id: u64) -> Result<()>;

    /// A user's questions for one lesson, created-at ascending (chat order).
    async fn list_by_lesson_and_user(&self, lesson_id: u64, user_id: u64) -> Result<Vec<Question>>;

    /// Every question asked about a lesson, created-at ascending.
    async fn list_by_lesson(&self, lesson_id: u64) -> Result<Vec<Question>>;

    /// A user's question history across lessons, newest first.
    async fn list_by_user(&self, user_id: u64, filter: &QuestionFilter) -> Result<Vec<Question>>;

    /// Deletes a user's chat history for a lesson, returning the count removed.
    async fn delete_by_lesson_and_user(&self, lesson_id: u64, user_id: u64) -> Result<usize>;

    /// Total number of questions.
    async fn count(&self) -> Result<usize>;
}
