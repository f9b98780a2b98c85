//! Lesson records and the invariants enforced at the store boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Minimum lesson content length in characters.
pub const MIN_CONTENT_LEN: usize = 50;

/// Maximum lesson title length in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum subject length in characters.
pub const MAX_SUBJECT_LEN: usize = 100;

/// Maximum grade-level length in characters.
pub const MAX_GRADE_LEVEL_LEN: usize = 50;

/// Maximum length of a single tag in characters.
pub const MAX_TAG_LEN: usize = 50;

/// An educational content unit authored by an administrator.
///
/// The view counter is monotonically non-decreasing and incremented on
/// student reads only; the summary is an optional AI-generated enrichment
/// refreshed when content changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique lesson identifier.
    pub id: u64,

    /// Lesson title.
    pub title: String,

    /// Full lesson body content.
    pub content: String,

    /// Subject the lesson belongs to (e.g. "Mathematics").
    pub subject: String,

    /// Grade level the lesson targets (e.g. "Grade 7").
    pub grade_level: String,

    /// Short generated summary, if one has been produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Ordered set of free-text tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Number of student reads.
    #[serde(default)]
    pub view_count: u64,

    /// Identifier of the administrator who created the lesson.
    pub created_by: u64,

    /// When the lesson was created.
    pub created_at: DateTime<Utc>,

    /// When the lesson was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonDraft {
    /// Lesson title.
    pub title: String,

    /// Full lesson body content.
    pub content: String,

    /// Subject the lesson belongs to.
    pub subject: String,

    /// Grade level the lesson targets.
    pub grade_level: String,

    /// Ordered set of free-text tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Identifier of the creating administrator.
    pub created_by: u64,
}

impl LessonDraft {
    /// Validates the draft against the lesson invariants.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_content(&self.content)?;
        validate_subject(&self.subject)?;
        validate_grade_level(&self.grade_level)?;
        validate_tags(&self.tags)
    }
}

/// A partial lesson update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonPatch {
    /// New title, if changing.
    pub title: Option<String>,

    /// New content, if changing.
    pub content: Option<String>,

    /// New subject, if changing.
    pub subject: Option<String>,

    /// New grade level, if changing.
    pub grade_level: Option<String>,

    /// Replacement tag set, if changing.
    pub tags: Option<Vec<String>>,

    /// New summary, if changing.
    pub summary: Option<String>,
}

impl LessonPatch {
    /// A patch that only replaces the generated summary.
    #[must_use]
    pub fn summary_only(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    /// Returns `true` if the patch changes no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.subject.is_none()
            && self.grade_level.is_none()
            && self.tags.is_none()
            && self.summary.is_none()
    }

    /// Validates every field the patch provides.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        if let Some(ref content) = self.content {
            validate_content(content)?;
        }
        if let Some(ref subject) = self.subject {
            validate_subject(subject)?;
        }
        if let Some(ref grade_level) = self.grade_level {
            validate_grade_level(grade_level)?;
        }
        if let Some(ref tags) = self.tags {
            validate_tags(tags)?;
        }
        Ok(())
    }

    /// Applies the patch to a lesson in place, refreshing `updated_at`.
    pub fn apply(self, lesson: &mut Lesson, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            lesson.title = title;
        }
        if let Some(content) = self.content {
            lesson.content = content;
        }
        if let Some(subject) = self.subject {
            lesson.subject = subject;
        }
        if let Some(grade_level) = self.grade_level {
            lesson.grade_level = grade_level;
        }
        if let Some(tags) = self.tags {
            lesson.tags = tags;
        }
        if let Some(summary) = self.summary {
            lesson.summary = Some(summary);
        }
        lesson.updated_at = now;
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(StoreError::validation("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(StoreError::validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<()> {
    if content.chars().count() < MIN_CONTENT_LEN {
        return Err(StoreError::validation(format!(
            "content must be at least {MIN_CONTENT_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_subject(subject: &str) -> Result<()> {
    if subject.trim().is_empty() {
        return Err(StoreError::validation("subject must not be empty"));
    }
    if subject.chars().count() > MAX_SUBJECT_LEN {
        return Err(StoreError::validation(format!(
            "subject must be at most {MAX_SUBJECT_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_grade_level(grade_level: &str) -> Result<()> {
    if grade_level.trim().is_empty() {
        return Err(StoreError::validation("grade level must not be empty"));
    }
    if grade_level.chars().count() > MAX_GRADE_LEVEL_LEN {
        return Err(StoreError::validation(format!(
            "grade level must be at most {MAX_GRADE_LEVEL_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<()> {
    for tag in tags {
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(StoreError::validation(format!(
                "tag '{tag}' exceeds {MAX_TAG_LEN} characters"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_draft() -> LessonDraft {
        LessonDraft {
            title: "Photosynthesis".to_string(),
            content: "Photosynthesis is the process by which green plants convert \
                      sunlight into chemical energy."
                .to_string(),
            subject: "Biology".to_string(),
            grade_level: "Grade 7".to_string(),
            tags: vec!["plants".to_string(), "energy".to_string()],
            created_by: 1,
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn test_short_content_rejected() {
        let mut draft = valid_draft();
        draft.content = "Too short.".to_string();
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
        assert!(err.to_string().contains("at least 50"));
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut draft = valid_draft();
        draft.title = "   ".to_string();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_overlong_tag_rejected() {
        let mut draft = valid_draft();
        draft.tags.push("x".repeat(MAX_TAG_LEN + 1));
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_patch_validates_only_provided_fields() {
        let patch = LessonPatch {
            title: Some("Cell Division".to_string()),
            ..LessonPatch::default()
        };
        assert!(patch.validate().is_ok());

        let bad = LessonPatch {
            content: Some("short".to_string()),
            ..LessonPatch::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_patch_apply_refreshes_updated_at() {
        let now = Utc::now();
        let mut lesson = Lesson {
            id: 1,
            title: "Old".to_string(),
            content: "c".repeat(MIN_CONTENT_LEN),
            subject: "Biology".to_string(),
            grade_level: "Grade 7".to_string(),
            summary: None,
            tags: vec![],
            view_count: 0,
            created_by: 1,
            created_at: now,
            updated_at: now,
        };

        let later = now + chrono::Duration::seconds(60);
        LessonPatch {
            title: Some("New".to_string()),
            ..LessonPatch::default()
        }
        .apply(&mut lesson, later);

        assert_eq!(lesson.title, "New");
        assert_eq!(lesson.updated_at, later);
        assert_eq!(lesson.created_at, now);
    }
}
