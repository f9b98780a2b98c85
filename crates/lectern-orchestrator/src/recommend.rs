//! Lesson recommendations derived from the asked question.
//!
//! Recommendations are a soft feature: any gateway failure produces an
//! empty list rather than an error.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use lectern_gateway::{GenerateOptions, LlmGateway};
use lectern_store::Lesson;

/// Maximum number of lessons returned per recommendation.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Fixed instruction for the recommending model.
const SYSTEM_INSTRUCTION: &str =
    "You are an educational content recommender. Return only lesson IDs as comma-separated numbers.";

/// Generation tuning for recommendations.
const RECOMMEND_OPTIONS: GenerateOptions = GenerateOptions::new(100, 0.3);

/// A recommended lesson, trimmed to what the chat UI displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendedLesson {
    /// Lesson identifier.
    pub id: u64,

    /// Lesson title.
    pub title: String,

    /// Lesson subject.
    pub subject: String,

    /// Generated summary, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl From<&Lesson> for RecommendedLesson {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            subject: lesson.subject.clone(),
            summary: lesson.summary.clone(),
        }
    }
}

/// Ranks candidate lessons against a student question via the gateway.
pub struct RecommendationEngine {
    gateway: Arc<dyn LlmGateway>,
}

impl RecommendationEngine {
    /// Creates an engine over the given gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    /// Recommends up to [`MAX_RECOMMENDATIONS`] candidate lessons for the
    /// question asked about `current`.
    ///
    /// The current lesson never recommends itself, ids the model invents
    /// are silently dropped, and first-mentioned ids rank first. Identical
    /// inputs against a deterministic gateway yield identical output.
    pub async fn recommend(
        &self,
        current: &Lesson,
        question: &str,
        candidates: &[Lesson],
    ) -> Vec<RecommendedLesson> {
        let prompt = build_prompt(current, question, candidates);
        let raw = match self
            .gateway
            .generate(SYSTEM_INSTRUCTION, &prompt, &RECOMMEND_OPTIONS)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    lesson_id = current.id,
                    error = %e,
                    "recommendation generation failed, returning none"
                );
                return Vec::new();
            }
        };

        let ids = parse_recommended_ids(&raw);
        debug!(lesson_id = current.id, ?ids, "parsed recommended lesson ids");

        let mut recommended = Vec::new();
        for id in ids {
            if id == current.id {
                continue;
            }
            if let Some(lesson) = candidates.iter().find(|candidate| candidate.id == id) {
                recommended.push(RecommendedLesson::from(lesson));
                if recommended.len() == MAX_RECOMMENDATIONS {
                    break;
                }
            }
        }
        recommended
    }
}

/// Builds the ranking prompt listing every candidate except the current
/// lesson.
fn build_prompt(current: &Lesson, question: &str, candidates: &[Lesson]) -> String {
    let mut prompt = format!(
        "Based on this lesson: '{}' and student question: '{}', \
         which of these lessons would be most helpful for further learning? \
         Return only lesson IDs as a comma-separated list.\n\n\
         Available lessons:",
        current.title, question
    );
    for candidate in candidates {
        if candidate.id != current.id {
            prompt.push_str(&format!("\nID: {}, Title: {}", candidate.id, candidate.title));
        }
    }
    prompt
}

/// Parses a comma-separated id list out of free-text model output.
///
/// Tokens are trimmed, non-numeric tokens discarded, duplicates dropped,
/// and first-mention order preserved.
fn parse_recommended_ids(raw: &str) -> Vec<u64> {
    let mut ids = Vec::new();
    for token in raw.split(',') {
        if let Ok(id) = token.trim().parse::<u64>() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}
