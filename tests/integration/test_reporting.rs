//! End-to-end tests for the derived read models and exports, fed from the
//! in-memory stores the way the CLI feeds them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use lectern_gateway::{GatewayError, GenerateOptions, LlmGateway};
use lectern_orchestrator::AnswerOrchestrator;
use lectern_report::{
    analytics::analyze_lesson, dashboard::student_dashboard, json::JsonExporter,
    statistics::catalog_statistics, LessonExport, MarkdownTranscript,
};
use lectern_store::{
    Lesson, LessonDraft, LessonStore, MemoryLessonStore, MemoryQuestionStore, QuestionStore,
};

struct EchoGateway;

#[async_trait]
impl LlmGateway for EchoGateway {
    async fn generate(
        &self,
        _system: &str,
        user: &str,
        _options: &GenerateOptions,
    ) -> Result<String, GatewayError> {
        Ok(format!("Answer: {}", user.chars().take(40).collect::<String>()))
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

async fn seeded_stores() -> (Arc<MemoryLessonStore>, Arc<MemoryQuestionStore>, Vec<Lesson>) {
    let lessons = Arc::new(MemoryLessonStore::new());
    let questions = Arc::new(MemoryQuestionStore::new());

    let mut seeded = Vec::new();
    for (title, subject) in [
        ("Photosynthesis", "Biology"),
        ("Respiration", "Biology"),
        ("The Roman Empire", "History"),
    ] {
        seeded.push(lessons.create(draft(title, subject)).await.expect("seed"));
    }

    let orchestrator = AnswerOrchestrator::new(
        Arc::new(EchoGateway),
        Arc::clone(&questions) as Arc<dyn QuestionStore>,
    );
    orchestrator
        .answer(&seeded[0], 7, "Why are leaves green in summer?")
        .await
        .expect("q1");
    orchestrator
        .answer(&seeded[0], 9, "Why are leaves green in summer?")
        .await
        .expect("q2");
    orchestrator
        .answer(&seeded[1], 7, "Where does respiration happen?")
        .await
        .expect("q3");

    (lessons, questions, seeded)
}

#[tokio::test]
async fn test_catalog_statistics_over_store_data() {
    let (lessons, questions, _) = seeded_stores().await;
    let stats = catalog_statistics(&lessons.snapshot().await, &questions.snapshot().await);

    assert_eq!(stats.total_lessons, 3);
    assert_eq!(stats.total_questions, 3);
    let subject = stats.most_popular_subject.expect("subject");
    assert_eq!(subject.subject, "Biology");
    assert_eq!(subject.lessons, 2);

    assert_eq!(stats.most_questioned[0].lesson.title, "Photosynthesis");
    assert_eq!(stats.most_questioned[0].questions, 2);
}

#[tokio::test]
async fn test_lesson_analytics_over_store_data() {
    let (lessons, questions, seeded) = seeded_stores().await;

    // Both students asked the identical question, so it counts as a repeat.
    let rows = questions
        .list_by_lesson(seeded[0].id)
        .await
        .expect("questions");
    let lesson = lessons.find(seeded[0].id).await.expect("lesson");
    let analytics = analyze_lesson(&lesson, &rows);

    assert_eq!(analytics.total_questions, 2);
    assert_eq!(analytics.unique_students, 2);
    assert_eq!(analytics.repeat_questions, 1);
    assert!(analytics
        .common_topics
        .iter()
        .any(|topic| topic.word == "leaves"));
}

#[tokio::test]
async fn test_student_dashboard_over_store_data() {
    let (lessons, questions, seeded) = seeded_stores().await;
    let dashboard = student_dashboard(
        7,
        &lessons.snapshot().await,
        &questions.snapshot().await,
        Utc::now().date_naive(),
    );

    assert_eq!(dashboard.completed_lessons, 2);
    assert_eq!(dashboard.total_questions, 2);
    assert_eq!(dashboard.learning_streak, 1);
    assert_eq!(
        dashboard.continue_lesson.expect("continue").id,
        seeded[1].id
    );
    assert_eq!(dashboard.featured_lessons.len(), 3);
}

#[tokio::test]
async fn test_export_json_and_markdown_agree() {
    let (lessons, questions, seeded) = seeded_stores().await;

    let lesson = lessons.find(seeded[0].id).await.expect("lesson");
    let rows = questions
        .list_by_lesson(seeded[0].id)
        .await
        .expect("questions");
    let export = LessonExport::new(&lesson, &rows);

    let json = JsonExporter::new(&export).generate_pretty().expect("json");
    let parsed: LessonExport = serde_json::from_str(&json).expect("parse");
    assert_eq!(parsed.total_questions, 2);
    assert_eq!(parsed.lesson_title, "Photosynthesis");

    let markdown = MarkdownTranscript::new(&export).generate();
    assert!(markdown.contains("# Lesson Transcript: Photosynthesis"));
    assert!(markdown.contains("Why are leaves green in summer?"));
    assert!(markdown.contains("**Assistant:**"));
}
