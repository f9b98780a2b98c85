//! End-to-end tests for the ask/recommend/summarize flows.
//!
//! These drive the orchestrators against the in-memory stores and a
//! scripted gateway stub, covering the externally observable contract:
//! validation bounds, fallback persistence, recommendation parsing and
//! filtering, and the one-way rating transition.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use lectern_gateway::{GatewayError, GenerateOptions, LlmGateway};
use lectern_orchestrator::{
    AnswerOrchestrator, LecternError, LessonCatalog, RecommendationEngine, SummaryGenerator,
    ERROR_FALLBACK, REJECTED_FALLBACK, SUMMARY_FALLBACK,
};
use lectern_store::{
    Lesson, LessonDraft, LessonStore, MemoryLessonStore, MemoryQuestionStore, QuestionFilter,
    QuestionStore, StoreError,
};

/// Gateway stub that replays a scripted result and records every prompt.
struct StubGateway {
    result: Result<String, GatewayError>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubGateway {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn err(error: GatewayError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(error),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("poisoned").clone()
    }
}

#[async_trait]
impl LlmGateway for StubGateway {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        _options: &GenerateOptions,
    ) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .expect("poisoned")
            .push((system.to_string(), user.to_string()));
        self.result.clone()
    }
}

fn draft(title: &str, subject: &str) -> LessonDraft {
    LessonDraft {
        title: title.to_string(),
        content: format!("{title}: content that is comfortably past the fifty character minimum."),
        subject: subject.to_string(),
        grade_level: "Grade 7".to_string(),
        tags: vec![],
        created_by: 1,
    }
}

struct Harness {
    lessons: Arc<MemoryLessonStore>,
    questions: Arc<MemoryQuestionStore>,
}

impl Harness {
    fn new() -> Self {
        Self {
            lessons: Arc::new(MemoryLessonStore::new()),
            questions: Arc::new(MemoryQuestionStore::new()),
        }
    }

    async fn seed(&self, titles: &[&str]) -> Vec<Lesson> {
        let mut seeded = Vec::new();
        for title in titles {
            let lesson = self
                .lessons
                .create(draft(title, "Biology"))
                .await
                .expect("seed lesson");
            seeded.push(lesson);
        }
        seeded
    }

    fn answerer(&self, gateway: Arc<dyn LlmGateway>) -> AnswerOrchestrator {
        AnswerOrchestrator::new(
            gateway,
            Arc::clone(&self.questions) as Arc<dyn QuestionStore>,
        )
    }
}

#[tokio::test]
async fn test_valid_question_persists_non_empty_answer() {
    let harness = Harness::new();
    let lessons = harness.seed(&["Photosynthesis"]).await;
    let gateway = StubGateway::ok("Plants convert sunlight into chemical energy.");

    let record = harness
        .answerer(gateway.clone())
        .answer(&lessons[0], 7, "How do plants make food?")
        .await
        .expect("answer");

    assert!(!record.question.answer.is_empty());
    let stored = harness
        .questions
        .find(record.question.id)
        .await
        .expect("stored question");
    assert_eq!(stored.answer, "Plants convert sunlight into chemical energy.");
    assert_eq!(stored.lesson_id, lessons[0].id);
    assert_eq!(stored.user_id, 7);

    // The outbound prompt carries the lesson content and the question.
    let prompts = gateway.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].1.contains("fifty character minimum"));
    assert!(prompts[0].1.contains("How do plants make food?"));
    assert!(prompts[0].0.contains("educational assistant"));
}

#[tokio::test]
async fn test_out_of_bounds_question_persists_nothing() {
    let harness = Harness::new();
    let lessons = harness.seed(&["Photosynthesis"]).await;
    let orchestrator = harness.answerer(StubGateway::ok("unused"));

    let err = orchestrator
        .answer(&lessons[0], 7, "Hi?")
        .await
        .expect_err("too short");
    assert!(matches!(err, LecternError::InvalidQuestion { .. }));

    let long = "y".repeat(501);
    let err = orchestrator
        .answer(&lessons[0], 7, &long)
        .await
        .expect_err("too long");
    assert!(matches!(err, LecternError::InvalidQuestion { .. }));

    assert_eq!(harness.questions.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_gateway_timeout_still_stores_a_row() {
    let harness = Harness::new();
    let lessons = harness.seed(&["Photosynthesis"]).await;
    let gateway = StubGateway::err(GatewayError::transport("request timed out"));

    let record = harness
        .answerer(gateway)
        .answer(&lessons[0], 7, "How do plants make food?")
        .await
        .expect("fallback answer");

    assert_eq!(record.question.answer, ERROR_FALLBACK);
    assert_eq!(harness.questions.count().await.expect("count"), 1);
}

#[tokio::test]
async fn test_provider_error_uses_rejected_fallback() {
    let harness = Harness::new();
    let lessons = harness.seed(&["Photosynthesis"]).await;
    let gateway = StubGateway::err(GatewayError::rejected(503));

    let record = harness
        .answerer(gateway)
        .answer(&lessons[0], 7, "How do plants make food?")
        .await
        .expect("fallback answer");

    assert_eq!(record.question.answer, REJECTED_FALLBACK);
}

#[tokio::test]
async fn test_chat_pair_ordering_guarantee() {
    let harness = Harness::new();
    let lessons = harness.seed(&["Photosynthesis"]).await;
    let orchestrator = harness.answerer(StubGateway::ok("answer one"));

    orchestrator
        .answer(&lessons[0], 7, "first question")
        .await
        .expect("first");
    orchestrator
        .answer(&lessons[0], 7, "second question")
        .await
        .expect("second");

    let messages = orchestrator
        .transcript(lessons[0].id, 7)
        .await
        .expect("transcript");
    assert_eq!(messages.len(), 4);
    // Every AI message sorts strictly after its user message.
    for pair in messages.chunks(2) {
        assert!(pair[1].created_at > pair[0].created_at);
    }
    assert_eq!(messages[0].content, "first question");
    assert_eq!(messages[2].content, "second question");
}

#[tokio::test]
async fn test_recommendation_round_trip_with_junk_tokens() {
    let harness = Harness::new();
    let seeded = harness.seed(&["A", "B", "C", "D"]).await;
    // Seeded ids are 1..=4; ask about lesson 2 so 3 and 1 remain valid.
    let current = seeded[1].clone();
    let gateway = StubGateway::ok("3, 99, x, 3, 1");

    let engine = RecommendationEngine::new(gateway);
    let candidates = harness.lessons.snapshot().await;
    let recommendations = engine
        .recommend(&current, "which lesson next?", &candidates)
        .await;

    let ids: Vec<u64> = recommendations.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert!(recommendations.len() <= 3);
}

#[tokio::test]
async fn test_current_lesson_never_recommends_itself() {
    let harness = Harness::new();
    let seeded = harness.seed(&["A", "B", "C", "D", "E"]).await;
    let current = seeded[4].clone();
    assert_eq!(current.id, 5);

    let gateway = StubGateway::ok("5, 2, 3");
    let engine = RecommendationEngine::new(gateway.clone());
    let candidates = harness.lessons.snapshot().await;
    let recommendations = engine.recommend(&current, "next?", &candidates).await;

    let ids: Vec<u64> = recommendations.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 3]);

    // The prompt never offered the current lesson as a candidate either.
    let prompts = gateway.prompts();
    assert!(!prompts[0].1.contains("ID: 5"));
}

#[tokio::test]
async fn test_recommendation_idempotence() {
    let harness = Harness::new();
    let seeded = harness.seed(&["A", "B", "C", "D"]).await;
    let current = seeded[0].clone();
    let engine = RecommendationEngine::new(StubGateway::ok("4, 2, 3"));
    let candidates = harness.lessons.snapshot().await;

    let first = engine.recommend(&current, "next?", &candidates).await;
    let second = engine.recommend(&current, "next?", &candidates).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_recommendation_failure_is_soft() {
    let harness = Harness::new();
    let seeded = harness.seed(&["A", "B"]).await;
    let engine = RecommendationEngine::new(StubGateway::err(GatewayError::rejected(500)));
    let candidates = harness.lessons.snapshot().await;

    let recommendations = engine.recommend(&seeded[0], "next?", &candidates).await;
    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn test_summary_http_500_yields_exact_fallback() {
    let harness = Harness::new();
    let seeded = harness.seed(&["Photosynthesis"]).await;
    let generator = SummaryGenerator::new(StubGateway::err(GatewayError::rejected(500)));

    let summary = generator.summarize(&seeded[0]).await;
    assert_eq!(summary, SUMMARY_FALLBACK);
}

#[tokio::test]
async fn test_catalog_create_attaches_summary_and_survives_failure() {
    let harness = Harness::new();
    let catalog = LessonCatalog::new(
        Arc::clone(&harness.lessons) as Arc<dyn LessonStore>,
        Arc::clone(&harness.questions) as Arc<dyn QuestionStore>,
        SummaryGenerator::new(StubGateway::err(GatewayError::transport("down"))),
    );

    let lesson = catalog
        .create_lesson(draft("Photosynthesis", "Biology"))
        .await
        .expect("create");
    assert_eq!(lesson.summary.as_deref(), Some(SUMMARY_FALLBACK));
}

#[tokio::test]
async fn test_rating_lifecycle_owner_only_one_way() {
    let harness = Harness::new();
    let lessons = harness.seed(&["Photosynthesis"]).await;
    let orchestrator = harness.answerer(StubGateway::ok("an answer"));

    let record = orchestrator
        .answer(&lessons[0], 7, "How do plants make food?")
        .await
        .expect("answer");
    let question_id = record.question.id;

    // A different user cannot rate.
    let err = harness
        .questions
        .rate(question_id, 9, 5, None)
        .await
        .expect_err("not the owner");
    assert!(matches!(err, StoreError::Forbidden { .. }));

    // The owner rates once...
    let rated = harness
        .questions
        .rate(question_id, 7, 5, Some("helpful".to_string()))
        .await
        .expect("rate");
    assert_eq!(rated.rating, Some(5));
    let first_rated_at = rated.rated_at.expect("rated_at set");

    // ...and may overwrite; the question never becomes unrated again.
    let rerated = harness
        .questions
        .rate(question_id, 7, 3, None)
        .await
        .expect("re-rate");
    assert_eq!(rerated.rating, Some(3));
    assert!(rerated.rated_at.expect("rated_at") >= first_rated_at);
    assert!(rerated.is_rated());
}

#[tokio::test]
async fn test_history_search_and_lesson_filter() {
    let harness = Harness::new();
    let lessons = harness.seed(&["Photosynthesis", "Respiration"]).await;
    let orchestrator = harness.answerer(StubGateway::ok("answer"));

    orchestrator
        .answer(&lessons[0], 7, "Why are leaves green?")
        .await
        .expect("q1");
    orchestrator
        .answer(&lessons[1], 7, "What is oxygen used for?")
        .await
        .expect("q2");
    orchestrator
        .answer(&lessons[1], 9, "Someone else's question")
        .await
        .expect("q3");

    let all = harness
        .questions
        .list_by_user(7, &QuestionFilter::default())
        .await
        .expect("history");
    assert_eq!(all.len(), 2);

    let filtered = harness
        .questions
        .list_by_user(
            7,
            &QuestionFilter {
                lesson_id: Some(lessons[1].id),
                search: None,
            },
        )
        .await
        .expect("filtered");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].question, "What is oxygen used for?");

    let searched = harness
        .questions
        .list_by_user(
            7,
            &QuestionFilter {
                lesson_id: None,
                search: Some("LEAVES".to_string()),
            },
        )
        .await
        .expect("searched");
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].question, "Why are leaves green?");
}

#[tokio::test]
async fn test_clear_chat_then_ask_again() {
    let harness = Harness::new();
    let lessons = harness.seed(&["Photosynthesis"]).await;
    let orchestrator = harness.answerer(StubGateway::ok("answer"));

    orchestrator
        .answer(&lessons[0], 7, "first question")
        .await
        .expect("q1");
    orchestrator
        .answer(&lessons[0], 7, "second question")
        .await
        .expect("q2");

    let removed = harness
        .questions
        .delete_by_lesson_and_user(lessons[0].id, 7)
        .await
        .expect("clear");
    assert_eq!(removed, 2);

    let messages = orchestrator
        .transcript(lessons[0].id, 7)
        .await
        .expect("transcript");
    assert!(messages.is_empty());

    orchestrator
        .answer(&lessons[0], 7, "a fresh start")
        .await
        .expect("q3");
    assert_eq!(harness.questions.count().await.expect("count"), 1);
}
