//! Lectern orchestration layer.
//!
//! Drives the LLM gateway and the data stores: answering student questions
//! (with fixed fallback text on generation failure), recommending further
//! lessons, generating lesson summaries, and maintaining the lesson catalog.

pub mod answer;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod recommend;
pub mod summary;

pub use answer::{
    AnswerOrchestrator, AnswerRecord, ERROR_FALLBACK, MAX_QUESTION_LEN, MIN_QUESTION_LEN,
    REJECTED_FALLBACK,
};
pub use catalog::LessonCatalog;
pub use chat::{transcript, ChatMessage, Sender};
pub use config::{Config, Provider};
pub use error::{LecternError, Result};
pub use recommend::{RecommendationEngine, RecommendedLesson, MAX_RECOMMENDATIONS};
pub use summary::{SummaryGenerator, SUMMARY_FALLBACK};
