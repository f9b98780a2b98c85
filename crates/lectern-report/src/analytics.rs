//! Per-lesson question analytics for lesson authors.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use lectern_store::{Lesson, Question};

/// Number of topic words reported per lesson.
const TOP_TOPICS: usize = 10;

/// Number of recent questions included in the analytics view.
const RECENT_QUESTIONS: usize = 10;

/// Minimum word length counted as a topic.
const MIN_TOPIC_WORD_LEN: usize = 4;

/// A topic word and how often it appeared across questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    /// The (lowercased) word.
    pub word: String,

    /// How many times it appeared.
    pub count: usize,
}

/// A recent question row in the analytics view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentQuestion {
    /// Question identifier.
    pub id: u64,

    /// The asking student.
    pub user_id: u64,

    /// The question text.
    pub question: String,

    /// Owner rating, when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    /// When the question was asked.
    pub asked_at: DateTime<Utc>,
}

/// Question insight for one lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonAnalytics {
    /// The analyzed lesson.
    pub lesson_id: u64,

    /// Total questions asked about the lesson.
    pub total_questions: usize,

    /// Distinct students who asked at least one question.
    pub unique_students: usize,

    /// Mean rating over rated questions, when any exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,

    /// Most frequent question words, ordered by frequency.
    pub common_topics: Vec<TopicCount>,

    /// Questions rated 2 or lower.
    pub low_rated_questions: usize,

    /// Questions that received written feedback.
    pub questions_with_feedback: usize,

    /// Distinct question texts asked more than once.
    pub repeat_questions: usize,

    /// The latest questions, newest first.
    pub recent_questions: Vec<RecentQuestion>,
}

/// Computes analytics for a lesson from its full question list.
#[must_use]
pub fn analyze_lesson(lesson: &Lesson, questions: &[Question]) -> LessonAnalytics {
    let unique_students = questions
        .iter()
        .map(|q| q.user_id)
        .collect::<HashSet<_>>()
        .len();

    let ratings: Vec<f64> = questions
        .iter()
        .filter_map(|q| q.rating)
        .map(f64::from)
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let average_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    };

    let low_rated_questions = questions
        .iter()
        .filter(|q| q.rating.is_some_and(|r| r <= 2))
        .count();
    let questions_with_feedback = questions.iter().filter(|q| q.feedback.is_some()).count();

    let mut text_counts: HashMap<&str, usize> = HashMap::new();
    for q in questions {
        *text_counts.entry(q.question.as_str()).or_insert(0) += 1;
    }
    let repeat_questions = text_counts.values().filter(|&&count| count > 1).count();

    let mut recent: Vec<&Question> = questions.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    let recent_questions = recent
        .into_iter()
        .take(RECENT_QUESTIONS)
        .map(|q| RecentQuestion {
            id: q.id,
            user_id: q.user_id,
            question: q.question.clone(),
            rating: q.rating,
            asked_at: q.created_at,
        })
        .collect();

    LessonAnalytics {
        lesson_id: lesson.id,
        total_questions: questions.len(),
        unique_students,
        average_rating,
        common_topics: common_topics(questions),
        low_rated_questions,
        questions_with_feedback,
        repeat_questions,
        recent_questions,
    }
}

/// Extracts the most frequent question words, skipping short ones.
///
/// Ties break alphabetically so identical inputs always produce identical
/// output.
fn common_topics(questions: &[Question]) -> Vec<TopicCount> {
    let Ok(word_re) = Regex::new(r"[a-zA-Z][a-zA-Z'-]*") else {
        return Vec::new();
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for question in questions {
        for word in word_re.find_iter(&question.question) {
            let word = word.as_str().to_lowercase();
            if word.chars().count() >= MIN_TOPIC_WORD_LEN {
                *counts.entry(word).or_insert(0) += 1;
            }
        }
    }

    let mut topics: Vec<TopicCount> = counts
        .into_iter()
        .map(|(word, count)| TopicCount { word, count })
        .collect();
    topics.sort_by(|a, b| b.count.cmp(&a.count).then(a.word.cmp(&b.word)));
    topics.truncate(TOP_TOPICS);
    topics
}
