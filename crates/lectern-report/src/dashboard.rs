//! The student's home-screen read model.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use lectern_store::{Lesson, Question};

use crate::statistics::LessonRef;

/// Number of recent activity rows on the dashboard.
const RECENT_ACTIVITY: usize = 10;

/// Number of featured lessons on the dashboard.
const FEATURED_LESSONS: usize = 5;

/// A recent question row on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Question identifier.
    pub question_id: u64,

    /// The question text.
    pub question: String,

    /// The lesson it was asked about.
    pub lesson_id: u64,

    /// Title of that lesson.
    pub lesson_title: String,

    /// When the question was asked.
    pub asked_at: DateTime<Utc>,
}

/// A featured lesson row on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedLesson {
    /// The featured lesson.
    #[serde(flatten)]
    pub lesson: LessonRef,

    /// Questions asked about it by any student.
    pub questions: usize,
}

/// Everything the student dashboard displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDashboard {
    /// Lessons where the student asked at least one question.
    pub completed_lessons: usize,

    /// Total questions the student has asked.
    pub total_questions: usize,

    /// Consecutive days (ending today or yesterday) with activity.
    pub learning_streak: u32,

    /// The student's latest questions, newest first.
    pub recent_activity: Vec<ActivityEntry>,

    /// The newest lessons in the catalog.
    pub featured_lessons: Vec<FeaturedLesson>,

    /// The lesson of the student's most recent question, for "continue".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_lesson: Option<LessonRef>,
}

/// Computes the dashboard for one student.
///
/// `today` is passed in rather than read from the clock so the streak
/// computation stays deterministic under test.
#[must_use]
pub fn student_dashboard(
    user_id: u64,
    lessons: &[Lesson],
    questions: &[Question],
    today: NaiveDate,
) -> StudentDashboard {
    let mut own: Vec<&Question> = questions.iter().filter(|q| q.user_id == user_id).collect();
    own.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let completed_lessons = own
        .iter()
        .map(|q| q.lesson_id)
        .collect::<HashSet<_>>()
        .len();

    let recent_activity = own
        .iter()
        .take(RECENT_ACTIVITY)
        .map(|q| ActivityEntry {
            question_id: q.id,
            question: q.question.clone(),
            lesson_id: q.lesson_id,
            lesson_title: lessons
                .iter()
                .find(|l| l.id == q.lesson_id)
                .map_or_else(|| "(removed lesson)".to_string(), |l| l.title.clone()),
            asked_at: q.created_at,
        })
        .collect();

    let continue_lesson = own
        .first()
        .and_then(|q| lessons.iter().find(|l| l.id == q.lesson_id))
        .map(LessonRef::from);

    let mut newest: Vec<&Lesson> = lessons.iter().collect();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    let featured_lessons = newest
        .into_iter()
        .take(FEATURED_LESSONS)
        .map(|lesson| FeaturedLesson {
            lesson: LessonRef::from(lesson),
            questions: questions.iter().filter(|q| q.lesson_id == lesson.id).count(),
        })
        .collect();

    let activity_dates: Vec<NaiveDate> = {
        let mut dates: Vec<NaiveDate> = own
            .iter()
            .map(|q| q.created_at.date_naive())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        dates.sort_by(|a, b| b.cmp(a));
        dates
    };

    StudentDashboard {
        completed_lessons,
        total_questions: own.len(),
        learning_streak: learning_streak(&activity_dates, today),
        recent_activity,
        featured_lessons,
        continue_lesson,
    }
}

/// Counts consecutive active days ending today or yesterday.
///
/// `dates` must be unique and sorted newest first. A gap of more than one
/// day before the most recent activity breaks the streak entirely.
fn learning_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let Some(&last_active) = dates.first() else {
        return 0;
    };

    let days_since = (today - last_active).num_days();
    if !(0..=1).contains(&days_since) {
        return 0;
    }

    let mut streak = 1;
    for pair in dates.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}
