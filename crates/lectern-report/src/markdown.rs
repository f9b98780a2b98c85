//! Markdown transcript rendering for a lesson's question history.
//!
//! Produces a human-readable document: lesson header, the generated
//! summary when one exists, and each exchange rendered as a student/
//! assistant pair with its rating.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::{ExportedQuestion, LessonExport};

/// Renders a [`LessonExport`] as a Markdown document.
pub struct MarkdownTranscript<'a> {
    export: &'a LessonExport,
}

impl<'a> MarkdownTranscript<'a> {
    /// Creates a transcript renderer for the given export record.
    #[must_use]
    pub const fn new(export: &'a LessonExport) -> Self {
        Self { export }
    }

    /// Generates the complete Markdown transcript.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_title(&mut output);
        self.write_summary(&mut output);
        self.write_exchanges(&mut output);

        output
    }

    fn write_title(&self, output: &mut String) {
        let _ = writeln!(
            output,
            "# Lesson Transcript: {}\n",
            escape_markdown(&self.export.lesson_title)
        );
        let _ = writeln!(
            output,
            "Subject: {} | Questions: {}\n",
            escape_markdown(&self.export.subject),
            self.export.total_questions
        );
    }

    fn write_summary(&self, output: &mut String) {
        if let Some(ref summary) = self.export.summary {
            let _ = writeln!(output, "## Summary\n");
            let _ = writeln!(output, "{}\n", escape_markdown(summary));
        }
    }

    fn write_exchanges(&self, output: &mut String) {
        let _ = writeln!(output, "## Questions\n");

        if self.export.questions.is_empty() {
            let _ = writeln!(output, "No questions have been asked yet.\n");
            return;
        }

        for question in &self.export.questions {
            Self::write_exchange(output, question);
        }
    }

    fn write_exchange(output: &mut String, question: &ExportedQuestion) {
        let _ = writeln!(
            output,
            "### {} (student {})\n",
            format_timestamp(&question.asked_at),
            question.user_id
        );
        let _ = writeln!(
            output,
            "**Student:** {}\n",
            escape_markdown(&question.question)
        );
        let _ = writeln!(
            output,
            "**Assistant:** {}\n",
            escape_markdown(&question.answer)
        );

        if let Some(rating) = question.rating {
            match question.feedback {
                Some(ref feedback) => {
                    let _ = writeln!(
                        output,
                        "Rated {rating}/5: {}\n",
                        escape_markdown(feedback)
                    );
                }
                None => {
                    let _ = writeln!(output, "Rated {rating}/5\n");
                }
            }
        }
    }
}

/// Formats a timestamp to a human-readable string.
///
/// Format: "YYYY-MM-DD HH:MM:SS UTC"
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Escapes special Markdown characters in text.
///
/// This prevents student content from being interpreted as Markdown
/// formatting.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '*' | '_' | '`' | '#' | '[' | ']' | '(' | ')' | '!' | '\\' | '<' | '>' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            _ => result.push(ch),
        }
    }

    result
}
