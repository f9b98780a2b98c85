//! JSON export of a lesson's question history.
//!
//! [`JsonExporter`] serializes a [`LessonExport`] as compact single-line
//! JSON for programmatic consumption or pretty-printed JSON for human
//! review, and can write either form straight to a file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::{LessonExport, ReportError, Result};

/// JSON exporter for a lesson's Q&A history.
pub struct JsonExporter<'a> {
    export: &'a LessonExport,
}

impl<'a> JsonExporter<'a> {
    /// Creates an exporter for the given export record.
    #[must_use]
    pub const fn new(export: &'a LessonExport) -> Self {
        Self { export }
    }

    /// Generates compact JSON output (single line, no extra whitespace).
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if serialization fails.
    pub fn generate(&self) -> Result<String> {
        serde_json::to_string(self.export).map_err(ReportError::from)
    }

    /// Generates pretty-printed JSON output with indentation.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if serialization fails.
    pub fn generate_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self.export).map_err(ReportError::from)
    }

    /// Writes the export directly to a file, creating or overwriting it.
    ///
    /// Parent directories must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if serialization fails and
    /// [`ReportError::Io`] if file creation or writing fails.
    pub fn write_to_file(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = if pretty {
            self.generate_pretty()?
        } else {
            self.generate()?
        };

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
