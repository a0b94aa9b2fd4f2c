//! Output formatting for CLI commands.

use serde::Serialize;

use crate::error::CommandError;
use crate::rag::{CourseAnalytics, QueryAnswer};
use crate::retrieval::{Course, format_outline};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name (case-insensitive); unknown names mean text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes `value` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::OutputFormat`] if serialization fails.
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> Result<String, CommandError> {
        serde_json::to_string_pretty(value)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| CommandError::OutputFormat(format!("JSON serialization failed: {e}")))
    }
}

/// Formats an answer followed by its numbered sources.
#[must_use]
pub fn format_answer(answer: &QueryAnswer) -> String {
    let mut output = answer.answer.clone();
    output.push('\n');
    if !answer.sources.is_empty() {
        output.push_str("\nSources:\n");
        for (i, source) in answer.sources.iter().enumerate() {
            match &source.link {
                Some(link) => output.push_str(&format!("  {}. {} <{link}>\n", i + 1, source.label)),
                None => output.push_str(&format!("  {}. {}\n", i + 1, source.label)),
            }
        }
    }
    output
}

/// Formats course analytics.
#[must_use]
pub fn format_analytics(analytics: &CourseAnalytics) -> String {
    let mut output = format!("Courses: {}\n", analytics.total_courses);
    for title in &analytics.course_titles {
        output.push_str(&format!("  - {title}\n"));
    }
    output
}

/// Formats one course outline.
#[must_use]
pub fn format_course(course: &Course) -> String {
    let mut output = format_outline(course);
    output.push('\n');
    output
}
