//! Catalog-wide statistics for the admin dashboard.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use lectern_store::{Lesson, Question};

/// Number of recent lessons included in the statistics view.
const RECENT_LESSONS: usize = 5;

/// Number of most-questioned lessons included in the statistics view.
const MOST_QUESTIONED: usize = 5;

/// Number of lessons returned by [`popular_lessons`] by default.
pub const POPULAR_LESSONS: usize = 6;

/// A subject and how many lessons carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCount {
    /// Subject name.
    pub subject: String,

    /// Number of lessons with that subject.
    pub lessons: usize,
}

/// A compact lesson reference used in rankings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRef {
    /// Lesson identifier.
    pub id: u64,

    /// Lesson title.
    pub title: String,

    /// Lesson subject.
    pub subject: String,
}

impl From<&Lesson> for LessonRef {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            subject: lesson.subject.clone(),
        }
    }
}

/// A lesson ranked by how many questions it attracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonQuestionCount {
    /// The ranked lesson.
    #[serde(flatten)]
    pub lesson: LessonRef,

    /// Number of questions asked about it.
    pub questions: usize,
}

/// A lesson ranked by student interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularLesson {
    /// The ranked lesson.
    #[serde(flatten)]
    pub lesson: LessonRef,

    /// Student view count.
    pub view_count: u64,

    /// Number of questions asked about it.
    pub questions: usize,
}

/// Catalog-wide totals and rankings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStatistics {
    /// Total lessons in the catalog.
    pub total_lessons: usize,

    /// Total questions asked across all lessons.
    pub total_questions: usize,

    /// The subject with the most lessons, when any exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_popular_subject: Option<SubjectCount>,

    /// The latest lessons, newest first.
    pub recent_lessons: Vec<LessonRef>,

    /// Lessons ranked by question volume.
    pub most_questioned: Vec<LessonQuestionCount>,
}

/// Computes catalog statistics from the full lesson and question lists.
#[must_use]
pub fn catalog_statistics(lessons: &[Lesson], questions: &[Question]) -> CatalogStatistics {
    let mut subject_counts: HashMap<&str, usize> = HashMap::new();
    for lesson in lessons {
        *subject_counts.entry(lesson.subject.as_str()).or_insert(0) += 1;
    }
    let most_popular_subject = subject_counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(subject, count)| SubjectCount {
            subject: subject.to_string(),
            lessons: count,
        });

    let mut recent: Vec<&Lesson> = lessons.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    let recent_lessons = recent
        .iter()
        .take(RECENT_LESSONS)
        .map(|lesson| LessonRef::from(*lesson))
        .collect();

    let counts = question_counts(questions);
    let mut ranked: Vec<LessonQuestionCount> = lessons
        .iter()
        .map(|lesson| LessonQuestionCount {
            lesson: LessonRef::from(lesson),
            questions: counts.get(&lesson.id).copied().unwrap_or(0),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.questions
            .cmp(&a.questions)
            .then(a.lesson.id.cmp(&b.lesson.id))
    });
    ranked.truncate(MOST_QUESTIONED);

    CatalogStatistics {
        total_lessons: lessons.len(),
        total_questions: questions.len(),
        most_popular_subject,
        recent_lessons,
        most_questioned: ranked,
    }
}

/// Ranks lessons by view count, breaking ties by question volume.
#[must_use]
pub fn popular_lessons(
    lessons: &[Lesson],
    questions: &[Question],
    limit: usize,
) -> Vec<PopularLesson> {
    let counts = question_counts(questions);
    let mut ranked: Vec<PopularLesson> = lessons
        .iter()
        .map(|lesson| PopularLesson {
            lesson: LessonRef::from(lesson),
            view_count: lesson.view_count,
            questions: counts.get(&lesson.id).copied().unwrap_or(0),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.view_count
            .cmp(&a.view_count)
            .then(b.questions.cmp(&a.questions))
            .then(a.lesson.id.cmp(&b.lesson.id))
    });
    ranked.truncate(limit);
    ranked
}

fn question_counts(questions: &[Question]) -> HashMap<u64, usize> {
    let mut counts = HashMap::new();
    for question in questions {
        *counts.entry(question.lesson_id).or_insert(0) += 1;
    }
    counts
}
