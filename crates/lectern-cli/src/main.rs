//! Lectern CLI
//!
//! Command-line entry point for the Lectern tutoring service: seed a lesson
//! catalog, ask questions against lessons, browse chat history, rate
//! answers, and inspect analytics, all against a JSON state file, with the
//! configured LLM provider behind the gateway.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use lectern_gateway::LlmGateway;
use lectern_orchestrator::{
    transcript, AnswerOrchestrator, ChatMessage, Config, LessonCatalog, RecommendationEngine,
    Sender, SummaryGenerator,
};
use lectern_report::{
    analytics::analyze_lesson,
    dashboard::student_dashboard,
    json::JsonExporter,
    statistics::{catalog_statistics, popular_lessons, POPULAR_LESSONS},
    LessonExport, MarkdownTranscript,
};
use lectern_store::{
    Lesson, LessonDraft, LessonFilter, LessonStore, MemoryLessonStore, MemoryQuestionStore, Page,
    Question, QuestionFilter, QuestionStore,
};

/// Environment variable consulted when the config carries no API key.
const API_KEY_ENV: &str = "LECTERN_API_KEY";

/// Lectern - AI-assisted lesson tutoring
///
/// Students browse administrator-authored lessons and ask questions that are
/// answered from lesson content by the configured LLM provider; every
/// exchange is stored and browsable as a chat transcript.
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: lectern.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import lesson drafts from the catalog file and generate summaries
    Seed {
        /// Catalog file to import (default: from config)
        #[arg(long, value_name = "FILE")]
        catalog: Option<String>,
    },

    /// List lessons, optionally filtered
    Lessons {
        /// Filter by subject
        #[arg(long)]
        subject: Option<String>,

        /// Filter by grade level
        #[arg(long)]
        grade_level: Option<String>,

        /// Search in title, content, and subject
        #[arg(long)]
        search: Option<String>,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Show one lesson; student views bump the view counter
    Show {
        /// Lesson id
        #[arg(long)]
        lesson: u64,

        /// Read as an elevated (admin) user; the view is not counted
        #[arg(long)]
        admin: bool,
    },

    /// Ask a question about a lesson
    Ask {
        /// Lesson id
        #[arg(long)]
        lesson: u64,

        /// Asking user id
        #[arg(long)]
        user: u64,

        /// The question text (5-500 characters)
        question: String,

        /// Skip lesson recommendations
        #[arg(long)]
        no_recommend: bool,
    },

    /// Print a user's chat transcript for a lesson
    Chat {
        /// Lesson id
        #[arg(long)]
        lesson: u64,

        /// User id
        #[arg(long)]
        user: u64,
    },

    /// Clear a user's chat history for a lesson
    ClearChat {
        /// Lesson id
        #[arg(long)]
        lesson: u64,

        /// User id
        #[arg(long)]
        user: u64,
    },

    /// Rate a stored answer (owner only)
    Rate {
        /// Question id
        #[arg(long)]
        question: u64,

        /// Rating user id
        #[arg(long)]
        user: u64,

        /// Rating from 1 to 5
        #[arg(long)]
        rating: u8,

        /// Optional feedback text
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Print a user's question history across lessons
    History {
        /// User id
        #[arg(long)]
        user: u64,

        /// Restrict to one lesson
        #[arg(long)]
        lesson: Option<u64>,

        /// Search in question text
        #[arg(long)]
        search: Option<String>,
    },

    /// Regenerate the summary for a lesson
    Summarize {
        /// Lesson id
        #[arg(long)]
        lesson: u64,
    },

    /// Print catalog statistics
    Stats,

    /// Print question analytics for a lesson
    Analytics {
        /// Lesson id
        #[arg(long)]
        lesson: u64,
    },

    /// Print a student's dashboard
    Dashboard {
        /// User id
        #[arg(long)]
        user: u64,
    },

    /// Export a lesson's question history
    Export {
        /// Lesson id
        #[arg(long)]
        lesson: u64,

        /// Render a Markdown transcript instead of JSON
        #[arg(long)]
        markdown: bool,

        /// Output file (prints to stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Serialized store contents persisted between CLI runs.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    lessons: Vec<Lesson>,
    #[serde(default)]
    questions: Vec<Question>,
}

/// Everything a command handler needs.
struct App {
    config: Config,
    lessons: Arc<MemoryLessonStore>,
    questions: Arc<MemoryQuestionStore>,
}

impl App {
    /// Builds the provider gateway, falling back to the environment for the
    /// credential.
    fn gateway(&self) -> anyhow::Result<Arc<dyn LlmGateway>> {
        let mut config = self.config.clone();
        if config.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                config.api_key = key;
            }
        }
        config.build_gateway().map_err(|e| anyhow::anyhow!("{e}"))
    }

    /// Persists both stores to the configured state file.
    async fn save_state(&self) -> anyhow::Result<()> {
        let state = StateFile {
            lessons: self.lessons.snapshot().await,
            questions: self.questions.snapshot().await,
        };

        let path = Path::new(&self.config.state_file);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to create state directory '{}': {e}",
                        parent.display()
                    )
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&state)?;
        std::fs::write(path, json)
            .map_err(|e| anyhow::anyhow!("Failed to write state file '{}': {e}", path.display()))?;
        Ok(())
    }

    /// Restores both stores from the configured state file, if present.
    async fn load_state(&self) -> anyhow::Result<()> {
        let path = Path::new(&self.config.state_file);
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                anyhow::bail!("Failed to read state file '{}': {e}", path.display());
            }
        };

        let state: StateFile = serde_json::from_str(&contents).map_err(|e| {
            anyhow::anyhow!(
                "Corrupted state file '{}': {e}\n\nSuggestion: Remove the file to start fresh",
                path.display()
            )
        })?;
        self.lessons.restore(state.lessons).await;
        self.questions.restore(state.questions).await;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Loads configuration and state, then dispatches the subcommand.
async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    tracing::debug!(state_file = %config.state_file, "configuration loaded");

    let app = App {
        config,
        lessons: Arc::new(MemoryLessonStore::new()),
        questions: Arc::new(MemoryQuestionStore::new()),
    };
    app.load_state().await?;

    match args.command {
        Command::Seed { catalog } => seed(&app, catalog.as_deref()).await,
        Command::Lessons {
            subject,
            grade_level,
            search,
            page,
        } => list_lessons(&app, subject, grade_level, search, page).await,
        Command::Show { lesson, admin } => show_lesson(&app, lesson, admin).await,
        Command::Ask {
            lesson,
            user,
            question,
            no_recommend,
        } => ask(&app, lesson, user, &question, no_recommend).await,
        Command::Chat { lesson, user } => print_chat(&app, lesson, user).await,
        Command::ClearChat { lesson, user } => clear_chat(&app, lesson, user).await,
        Command::Rate {
            question,
            user,
            rating,
            feedback,
        } => rate(&app, question, user, rating, feedback).await,
        Command::History {
            user,
            lesson,
            search,
        } => history(&app, user, lesson, search).await,
        Command::Summarize { lesson } => summarize(&app, lesson).await,
        Command::Stats => stats(&app).await,
        Command::Analytics { lesson } => analytics(&app, lesson).await,
        Command::Dashboard { user } => dashboard(&app, user).await,
        Command::Export {
            lesson,
            markdown,
            output,
        } => export(&app, lesson, markdown, output).await,
    }
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Imports lesson drafts from the catalog file, generating summaries.
async fn seed(app: &App, catalog_override: Option<&str>) -> anyhow::Result<()> {
    let catalog_path = catalog_override.unwrap_or(&app.config.catalog);
    let contents = std::fs::read_to_string(catalog_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read catalog '{catalog_path}': {e}\n\nSuggestion: Provide a JSON file containing an array of lesson drafts"
        )
    })?;
    let drafts: Vec<LessonDraft> = serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Invalid catalog '{catalog_path}': {e}"))?;

    let gateway = app.gateway()?;
    let catalog = LessonCatalog::new(
        Arc::clone(&app.lessons) as Arc<dyn LessonStore>,
        Arc::clone(&app.questions) as Arc<dyn QuestionStore>,
        SummaryGenerator::new(gateway),
    );

    println!("Importing {} lessons from {catalog_path}...", drafts.len());
    for draft in drafts {
        let lesson = catalog.create_lesson(draft).await?;
        println!("  [{}] {} ({})", lesson.id, lesson.title, lesson.subject);
    }

    app.save_state().await?;
    println!("Catalog imported");
    Ok(())
}

/// Lists lessons matching the filters.
async fn list_lessons(
    app: &App,
    subject: Option<String>,
    grade_level: Option<String>,
    search: Option<String>,
    page: u32,
) -> anyhow::Result<()> {
    let filter = LessonFilter {
        subject,
        grade_level,
        search,
    };
    let lessons = app
        .lessons
        .list(&filter, Page::new(page, Page::default().per_page))
        .await?;

    if lessons.is_empty() {
        println!("No lessons found");
        return Ok(());
    }

    for lesson in lessons {
        println!(
            "[{}] {} | {} | {} | {} views",
            lesson.id, lesson.title, lesson.subject, lesson.grade_level, lesson.view_count
        );
        if let Some(summary) = lesson.summary {
            println!("    {summary}");
        }
    }
    Ok(())
}

/// Shows a lesson and its stored summary.
async fn show_lesson(app: &App, lesson_id: u64, admin: bool) -> anyhow::Result<()> {
    // Only student reads count toward the view counter.
    if !admin {
        app.lessons.increment_view_count(lesson_id).await?;
    }
    let lesson = app.lessons.find(lesson_id).await?;

    println!("[{}] {}", lesson.id, lesson.title);
    println!("Subject: {} | Grade: {}", lesson.subject, lesson.grade_level);
    if !lesson.tags.is_empty() {
        println!("Tags: {}", lesson.tags.join(", "));
    }
    println!("Views: {}", lesson.view_count);
    if let Some(ref summary) = lesson.summary {
        println!();
        println!("Summary: {summary}");
    }
    println!();
    println!("{}", lesson.content);

    if !admin {
        app.save_state().await?;
    }
    Ok(())
}

/// Asks a question, prints the exchange, and recommends further lessons.
async fn ask(
    app: &App,
    lesson_id: u64,
    user_id: u64,
    question: &str,
    no_recommend: bool,
) -> anyhow::Result<()> {
    let lesson = app.lessons.find(lesson_id).await?;
    let gateway = app.gateway()?;

    let orchestrator = AnswerOrchestrator::new(
        Arc::clone(&gateway),
        Arc::clone(&app.questions) as Arc<dyn QuestionStore>,
    );
    let record = orchestrator.answer(&lesson, user_id, question).await?;

    print_message(&record.user_message);
    print_message(&record.ai_message);
    app.save_state().await?;

    if no_recommend {
        return Ok(());
    }

    let candidates = app.lessons.snapshot().await;
    let engine = RecommendationEngine::new(gateway);
    let recommendations = engine.recommend(&lesson, question, &candidates).await;
    if !recommendations.is_empty() {
        println!();
        println!("You might also like:");
        for rec in recommendations {
            match rec.summary {
                Some(summary) => println!("  [{}] {} ({}) - {summary}", rec.id, rec.title, rec.subject),
                None => println!("  [{}] {} ({})", rec.id, rec.title, rec.subject),
            }
        }
    }
    Ok(())
}

/// Prints a user's chat transcript for a lesson.
async fn print_chat(app: &App, lesson_id: u64, user_id: u64) -> anyhow::Result<()> {
    let questions = app
        .questions
        .list_by_lesson_and_user(lesson_id, user_id)
        .await?;
    let messages = transcript(&questions);

    if messages.is_empty() {
        println!("No chat history for this lesson");
        return Ok(());
    }
    for message in &messages {
        print_message(message);
    }
    Ok(())
}

/// Clears a user's chat history for a lesson.
async fn clear_chat(app: &App, lesson_id: u64, user_id: u64) -> anyhow::Result<()> {
    let removed = app
        .questions
        .delete_by_lesson_and_user(lesson_id, user_id)
        .await?;
    app.save_state().await?;
    println!("Cleared {removed} exchanges");
    Ok(())
}

/// Rates a stored answer.
async fn rate(
    app: &App,
    question_id: u64,
    user_id: u64,
    rating: u8,
    feedback: Option<String>,
) -> anyhow::Result<()> {
    app.questions
        .rate(question_id, user_id, rating, feedback)
        .await?;
    app.save_state().await?;
    println!("Thank you for your feedback!");
    Ok(())
}

/// Prints a user's question history.
async fn history(
    app: &App,
    user_id: u64,
    lesson_id: Option<u64>,
    search: Option<String>,
) -> anyhow::Result<()> {
    let filter = QuestionFilter {
        lesson_id,
        search,
    };
    let questions = app.questions.list_by_user(user_id, &filter).await?;

    if questions.is_empty() {
        println!("No questions found");
        return Ok(());
    }
    for question in questions {
        let rating = question
            .rating
            .map_or_else(|| "unrated".to_string(), |r| format!("{r}/5"));
        println!(
            "[{}] lesson {} | {} | {}",
            question.id,
            question.lesson_id,
            question.created_at.format("%Y-%m-%d %H:%M"),
            rating
        );
        println!("    Q: {}", question.question);
        println!("    A: {}", question.answer);
    }
    Ok(())
}

/// Regenerates and stores the summary for a lesson.
async fn summarize(app: &App, lesson_id: u64) -> anyhow::Result<()> {
    let lesson = app.lessons.find(lesson_id).await?;
    let generator = SummaryGenerator::new(app.gateway()?);
    let summary = generator.summarize(&lesson).await;

    app.lessons
        .update(
            lesson_id,
            lectern_store::LessonPatch::summary_only(summary.clone()),
        )
        .await?;
    app.save_state().await?;
    println!("Summary: {summary}");
    Ok(())
}

/// Prints catalog statistics.
async fn stats(app: &App) -> anyhow::Result<()> {
    let lessons = app.lessons.snapshot().await;
    let questions = app.questions.snapshot().await;
    let stats = catalog_statistics(&lessons, &questions);

    println!("=== Catalog Statistics ===");
    println!("Lessons: {}", stats.total_lessons);
    println!("Questions: {}", stats.total_questions);
    if let Some(subject) = stats.most_popular_subject {
        println!(
            "Most popular subject: {} ({} lessons)",
            subject.subject, subject.lessons
        );
    }

    if !stats.most_questioned.is_empty() {
        println!();
        println!("Most questioned lessons:");
        for entry in &stats.most_questioned {
            println!(
                "  [{}] {} - {} questions",
                entry.lesson.id, entry.lesson.title, entry.questions
            );
        }
    }

    let popular = popular_lessons(&lessons, &questions, POPULAR_LESSONS);
    if !popular.is_empty() {
        println!();
        println!("Popular lessons:");
        for entry in &popular {
            println!(
                "  [{}] {} - {} views, {} questions",
                entry.lesson.id, entry.lesson.title, entry.view_count, entry.questions
            );
        }
    }
    Ok(())
}

/// Prints question analytics for a lesson.
async fn analytics(app: &App, lesson_id: u64) -> anyhow::Result<()> {
    let lesson = app.lessons.find(lesson_id).await?;
    let questions = app.questions.list_by_lesson(lesson_id).await?;
    let analytics = analyze_lesson(&lesson, &questions);

    println!("=== Analytics: {} ===", lesson.title);
    println!("Questions: {}", analytics.total_questions);
    println!("Unique students: {}", analytics.unique_students);
    match analytics.average_rating {
        Some(avg) => println!("Average rating: {avg:.2}"),
        None => println!("Average rating: no ratings yet"),
    }
    println!("Low rated: {}", analytics.low_rated_questions);
    println!("With feedback: {}", analytics.questions_with_feedback);
    println!("Repeat questions: {}", analytics.repeat_questions);

    if !analytics.common_topics.is_empty() {
        println!();
        println!("Common topics:");
        for topic in &analytics.common_topics {
            println!("  {} ({})", topic.word, topic.count);
        }
    }
    Ok(())
}

/// Prints a student's dashboard.
async fn dashboard(app: &App, user_id: u64) -> anyhow::Result<()> {
    let lessons = app.lessons.snapshot().await;
    let questions = app.questions.snapshot().await;
    let dashboard = student_dashboard(user_id, &lessons, &questions, Utc::now().date_naive());

    println!("=== Dashboard (user {user_id}) ===");
    println!("Lessons started: {}", dashboard.completed_lessons);
    println!("Questions asked: {}", dashboard.total_questions);
    println!("Learning streak: {} days", dashboard.learning_streak);

    if let Some(lesson) = dashboard.continue_lesson {
        println!("Continue with: [{}] {}", lesson.id, lesson.title);
    }

    if !dashboard.recent_activity.is_empty() {
        println!();
        println!("Recent activity:");
        for entry in &dashboard.recent_activity {
            println!(
                "  {} | {} | {}",
                entry.asked_at.format("%Y-%m-%d %H:%M"),
                entry.lesson_title,
                entry.question
            );
        }
    }

    if !dashboard.featured_lessons.is_empty() {
        println!();
        println!("Featured lessons:");
        for entry in &dashboard.featured_lessons {
            println!(
                "  [{}] {} ({}) - {} questions",
                entry.lesson.id, entry.lesson.title, entry.lesson.subject, entry.questions
            );
        }
    }
    Ok(())
}

/// Exports a lesson's question history to JSON or Markdown.
async fn export(
    app: &App,
    lesson_id: u64,
    markdown: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let lesson = app.lessons.find(lesson_id).await?;
    let questions = app.questions.list_by_lesson(lesson_id).await?;
    let export = LessonExport::new(&lesson, &questions);

    if markdown {
        let rendered = MarkdownTranscript::new(&export).generate();
        match output {
            Some(path) => {
                std::fs::write(&path, rendered).map_err(|e| {
                    anyhow::anyhow!("Failed to write export to '{}': {e}", path.display())
                })?;
                println!("Markdown transcript written to {}", path.display());
            }
            None => print!("{rendered}"),
        }
        return Ok(());
    }

    let exporter = JsonExporter::new(&export);
    match output {
        Some(path) => {
            exporter
                .write_to_file(&path, true)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("JSON export written to {}", path.display());
        }
        None => println!("{}", exporter.generate_pretty().map_err(|e| anyhow::anyhow!("{e}"))?),
    }
    Ok(())
}

/// Prints one chat message with its logical timestamp.
fn print_message(message: &ChatMessage) {
    let who = match message.sender {
        Sender::User => "You",
        Sender::Assistant => "Tutor",
    };
    println!(
        "[{}] {who}: {}",
        message.created_at.format("%H:%M:%S"),
        message.content
    );
}
