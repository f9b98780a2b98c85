//! In-memory store implementations.
//!
//! These back the CLI and the test suites. State lives behind a
//! `tokio::sync::Mutex` so each operation is a single atomic step; sequential
//! ids start at 1. Both stores can snapshot to and restore from a plain
//! record list, which the CLI uses for its JSON state file.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::lesson::{Lesson, LessonDraft, LessonPatch};
use crate::question::{Question, MAX_RATING, MIN_RATING};
use crate::store::{LessonFilter, LessonStore, Page, QuestionFilter, QuestionStore};

#[derive(Debug)]
struct Table<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory [`LessonStore`].
#[derive(Debug, Default)]
pub struct MemoryLessonStore {
    inner: Mutex<Table<Lesson>>,
}

impl MemoryLessonStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every lesson, id ascending.
    pub async fn snapshot(&self) -> Vec<Lesson> {
        let inner = self.inner.lock().await;
        inner.rows.values().cloned().collect()
    }

    /// Replaces the store contents with the given records.
    pub async fn restore(&self, lessons: Vec<Lesson>) {
        let mut inner = self.inner.lock().await;
        inner.next_id = lessons.iter().map(|l| l.id).max().unwrap_or(0);
        inner.rows = lessons.into_iter().map(|l| (l.id, l)).collect();
    }
}

#[async_trait]
impl LessonStore for MemoryLessonStore {
    async fn create(&self, draft: LessonDraft) -> Result<Lesson> {
        draft.validate()?;

        let now = Utc::now();
        let mut inner = self.inner.lock().await;
        let id = inner.allocate_id();
        let lesson = Lesson {
            id,
            title: draft.title,
            content: draft.content,
            subject: draft.subject,
            grade_level: draft.grade_level,
            summary: None,
            tags: draft.tags,
            view_count: 0,
            created_by: draft.created_by,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(id, lesson.clone());
        Ok(lesson)
    }

    async fn find(&self, id: u64) -> Result<Lesson> {
        let inner = self.inner.lock().await;
        inner
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::lesson_not_found(id))
    }

    async fn update(&self, id: u64, patch: LessonPatch) -> Result<Lesson> {
        patch.validate()?;

        let mut inner = self.inner.lock().await;
        let lesson = inner
            .rows
            .get_mut(&id)
            .ok_or(StoreError::lesson_not_found(id))?;
        patch.apply(lesson, Utc::now());
        Ok(lesson.clone())
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::lesson_not_found(id))
    }

    async fn list(&self, filter: &LessonFilter, page: Page) -> Result<Vec<Lesson>> {
        let inner = self.inner.lock().await;
        let mut matches: Vec<Lesson> = inner
            .rows
            .values()
            .filter(|lesson| filter.matches(lesson))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matches
            .into_iter()
            .skip(page.offset())
            .take(page.per_page as usize)
            .collect())
    }

    async fn increment_view_count(&self, id: u64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let lesson = inner
            .rows
            .get_mut(&id)
            .ok_or(StoreError::lesson_not_found(id))?;
        lesson.view_count += 1;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.len())
    }
}

/// In-memory [`QuestionStore`].
#[derive(Debug, Default)]
pub struct MemoryQuestionStore {
    inner: Mutex<Table<Question>>,
}

impl MemoryQuestionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every question, id ascending.
    pub async fn snapshot(&self) -> Vec<Question> {
        let inner = self.inner.lock().await;
        inner.rows.values().cloned().collect()
    }

    /// Replaces the store contents with the given records.
    pub async fn restore(&self, questions: Vec<Question>) {
        let mut inner = self.inner.lock().await;
        inner.next_id = questions.iter().map(|q| q.id).max().unwrap_or(0);
        inner.rows = questions.into_iter().map(|q| (q.id, q)).collect();
    }
}

#[async_trait]
impl QuestionStore for MemoryQuestionStore {
    async fn create(
        &self,
        lesson_id: u64,
        user_id: u64,
        question: &str,
        answer: &str,
    ) -> Result<Question> {
        let mut inner = self.inner.lock().await;
        let id = inner.allocate_id();
        let record = Question {
            id,
            lesson_id,
            user_id,
            question: question.to_string(),
            answer: answer.to_string(),
            rating: None,
            feedback: None,
            rated_at: None,
            created_at: Utc::now(),
        };
        inner.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn find(&self, id: u64) -> Result<Question> {
        let inner = self.inner.lock().await;
        inner
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::question_not_found(id))
    }

    async fn rate(
        &self,
        id: u64,
        user_id: u64,
        rating: u8,
        feedback: Option<String>,
    ) -> Result<Question> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(StoreError::validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }

        let mut inner = self.inner.lock().await;
        let question = inner
            .rows
            .get_mut(&id)
            .ok_or(StoreError::question_not_found(id))?;
        if question.user_id != user_id {
            return Err(StoreError::forbidden(
                "only the question owner may rate the answer",
            ));
        }
        question.rating = Some(rating);
        question.feedback = feedback;
        question.rated_at = Some(Utc::now());
        Ok(question.clone())
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::question_not_found(id))
    }

    async fn list_by_lesson_and_user(&self, lesson_id: u64, user_id: u64) -> Result<Vec<Question>> {
        let inner = self.inner.lock().await;
        let mut matches: Vec<Question> = inner
            .rows
            .values()
            .filter(|q| q.lesson_id == lesson_id && q.user_id == user_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matches)
    }

    async fn list_by_lesson(&self, lesson_id: u64) -> Result<Vec<Question>> {
        let inner = self.inner.lock().await;
        let mut matches: Vec<Question> = inner
            .rows
            .values()
            .filter(|q| q.lesson_id == lesson_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matches)
    }

    async fn list_by_user(&self, user_id: u64, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let inner = self.inner.lock().await;
        let mut matches: Vec<Question> = inner
            .rows
            .values()
            .filter(|q| q.user_id == user_id && filter.matches(q))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matches)
    }

    async fn delete_by_lesson_and_user(&self, lesson_id: u64, user_id: u64) -> Result<usize> {
        let mut inner = self.inner.lock().await;
        let doomed: Vec<u64> = inner
            .rows
            .values()
            .filter(|q| q.lesson_id == lesson_id && q.user_id == user_id)
            .map(|q| q.id)
            .collect();
        for id in &doomed {
            inner.rows.remove(id);
        }
        Ok(doomed.len())
    }

    async fn count(&self) -> Result<usize> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.len())
    }
}
