//! Lesson summarization.

use std::sync::Arc;

use tracing::warn;

use lectern_gateway::{GenerateOptions, LlmGateway};
use lectern_store::Lesson;

/// Literal returned whenever summarization fails. Summary is a non-critical
/// enrichment; the lesson create/update flow never sees an error.
pub const SUMMARY_FALLBACK: &str = "Summary not available.";

/// Fixed instruction for the summarizing model.
const SYSTEM_INSTRUCTION: &str =
    "Summarize the following lesson in 2-3 sentences, highlighting the key learning points.";

/// Generation tuning for summaries.
const SUMMARY_OPTIONS: GenerateOptions = GenerateOptions::new(150, 0.5);

/// Produces short lesson summaries for display on create/update.
pub struct SummaryGenerator {
    gateway: Arc<dyn LlmGateway>,
}

impl SummaryGenerator {
    /// Creates a generator over the given gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    /// Summarizes the lesson content, returning [`SUMMARY_FALLBACK`] on any
    /// failure.
    pub async fn summarize(&self, lesson: &Lesson) -> String {
        match self
            .gateway
            .generate(SYSTEM_INSTRUCTION, &lesson.content, &SUMMARY_OPTIONS)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    lesson_id = lesson.id,
                    error = %e,
                    "summarization failed, using fallback"
                );
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}
