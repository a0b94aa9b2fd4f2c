//! Course store contract and an in-memory implementation.
//!
//! [`CourseStore`] is the seam between the retrieval tools and whatever
//! index actually holds course content. [`MemoryCourseStore`] loads a JSON
//! course catalog and ranks lesson paragraphs by query-term overlap.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RetrievalError;

/// Default number of hits returned by [`MemoryCourseStore::search`].
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// A lesson within a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson number, unique within its course.
    pub number: u32,
    /// Lesson title.
    pub title: String,
    /// Link to the lesson page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Lesson transcript; paragraphs separated by blank lines.
    #[serde(default, skip_serializing)]
    pub content: String,
}

/// A course and its lesson list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course title.
    pub title: String,
    /// Link to the course page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Course instructor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    /// Lessons in catalog order.
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    courses: Vec<Course>,
}

/// Where a search hit came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitMetadata {
    /// Title of the course holding the hit.
    pub course_title: String,
    /// Lesson number, when the hit belongs to a lesson.
    pub lesson_number: Option<u32>,
}

/// Ranked hits from a store query.
///
/// `documents[i]` is described by `metadata[i]`. A non-empty `error`
/// means the query could not run; the tool layer reports it verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// Matching text, best first.
    pub documents: Vec<String>,
    /// Origin of each document.
    pub metadata: Vec<HitMetadata>,
    /// Failure description.
    pub error: Option<String>,
}

impl SearchResults {
    /// Creates an empty result carrying an error.
    #[must_use]
    pub fn empty(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Returns `true` when there are no hits.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of hits.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.documents.len()
    }

    /// Iterates hits with their metadata.
    pub fn hits(&self) -> impl Iterator<Item = (&str, &HitMetadata)> {
        self.documents
            .iter()
            .map(String::as_str)
            .zip(self.metadata.iter())
    }
}

/// Filters for a content search.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchQuery<'a> {
    /// Free-text query.
    pub text: &'a str,
    /// Course name, possibly partial.
    pub course_name: Option<&'a str>,
    /// Lesson number within the course.
    pub lesson_number: Option<u32>,
    /// Hit limit; the store default applies when `None`.
    pub limit: Option<usize>,
}

/// Backend holding indexed course material.
///
/// Implementations are shared across concurrent queries.
pub trait CourseStore: Send + Sync {
    /// Searches lesson content.
    fn search(&self, query: &SearchQuery<'_>) -> SearchResults;

    /// Resolves a possibly partial course name to a canonical title.
    fn resolve_course_name(&self, name: &str) -> Option<String>;

    /// Returns the course with exactly this title.
    fn course_outline(&self, title: &str) -> Option<Course>;

    /// Returns the link of one lesson.
    fn lesson_link(&self, title: &str, lesson: u32) -> Option<String>;

    /// Titles of every stored course.
    fn course_titles(&self) -> Vec<String>;
}

struct Chunk {
    course: usize,
    lesson: Option<u32>,
    text: String,
    terms: HashSet<String>,
}

/// In-memory course store.
pub struct MemoryCourseStore {
    courses: Vec<Course>,
    chunks: Vec<Chunk>,
    max_results: usize,
}

/// Lowercased alphanumeric terms of `text`.
fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

impl MemoryCourseStore {
    /// Builds a store from parsed courses.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Catalog`] when two courses share a title.
    pub fn new(courses: Vec<Course>) -> Result<Self, RetrievalError> {
        let mut seen = HashSet::new();
        for course in &courses {
            if !seen.insert(course.title.as_str()) {
                return Err(RetrievalError::Catalog {
                    message: format!("duplicate course title '{}'", course.title),
                });
            }
        }

        let chunks = courses
            .iter()
            .enumerate()
            .flat_map(|(idx, course)| {
                course.lessons.iter().flat_map(move |lesson| {
                    lesson
                        .content
                        .split("\n\n")
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(move |paragraph| Chunk {
                            course: idx,
                            lesson: Some(lesson.number),
                            text: paragraph.to_string(),
                            terms: terms(paragraph).collect(),
                        })
                })
            })
            .collect::<Vec<_>>();

        debug!(courses = courses.len(), chunks = chunks.len(), "course store built");
        Ok(Self {
            courses,
            chunks,
            max_results: DEFAULT_MAX_RESULTS,
        })
    }

    /// Parses a JSON catalog (`{"courses": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Catalog`] on malformed JSON or duplicate titles.
    pub fn from_json(json: &str) -> Result<Self, RetrievalError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| RetrievalError::Catalog {
                message: e.to_string(),
            })?;
        Self::new(file.courses)
    }

    /// Loads a JSON catalog from disk.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Catalog`] when the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, RetrievalError> {
        let json = std::fs::read_to_string(path).map_err(|e| RetrievalError::Catalog {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_json(&json)
    }

    /// Sets the default hit limit.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Number of courses.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.courses.len()
    }

    /// Returns `true` when the store holds no courses.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Looks up a course by possibly partial name.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::CourseNotFound`] when nothing matches.
    pub fn course(&self, name: &str) -> Result<&Course, RetrievalError> {
        self.resolve_index(name)
            .map(|idx| &self.courses[idx])
            .ok_or_else(|| RetrievalError::CourseNotFound {
                name: name.to_string(),
            })
    }

    /// Exact (case-insensitive) title, then substring, then best term overlap.
    fn resolve_index(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let titles: Vec<String> = self.courses.iter().map(|c| c.title.to_lowercase()).collect();

        if let Some(idx) = titles.iter().position(|t| *t == needle) {
            return Some(idx);
        }
        if let Some(idx) = titles.iter().position(|t| t.contains(&needle)) {
            return Some(idx);
        }

        let wanted: HashSet<String> = terms(&needle).collect();
        titles
            .iter()
            .enumerate()
            .map(|(idx, title)| (idx, terms(title).filter(|t| wanted.contains(t)).count()))
            .filter(|&(_, score)| score > 0)
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(idx, _)| idx)
    }
}

impl CourseStore for MemoryCourseStore {
    fn search(&self, query: &SearchQuery<'_>) -> SearchResults {
        let course = match query.course_name {
            Some(name) => match self.resolve_index(name) {
                Some(idx) => Some(idx),
                None => return SearchResults::empty(format!("No course found matching '{name}'")),
            },
            None => None,
        };

        let wanted: HashSet<String> = terms(query.text).collect();
        let mut scored: Vec<(usize, &Chunk)> = self
            .chunks
            .iter()
            .filter(|c| course.is_none_or(|idx| c.course == idx))
            .filter(|c| query.lesson_number.is_none_or(|n| c.lesson == Some(n)))
            .map(|c| (c.terms.intersection(&wanted).count(), c))
            .filter(|&(score, _)| score > 0)
            .collect();
        // Stable sort keeps catalog order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let limit = query.limit.unwrap_or(self.max_results);
        let (documents, metadata): (Vec<String>, Vec<HitMetadata>) = scored
            .into_iter()
            .take(limit)
            .map(|(_, chunk)| {
                (
                    chunk.text.clone(),
                    HitMetadata {
                        course_title: self.courses[chunk.course].title.clone(),
                        lesson_number: chunk.lesson,
                    },
                )
            })
            .unzip();

        SearchResults {
            documents,
            metadata,
            error: None,
        }
    }

    fn resolve_course_name(&self, name: &str) -> Option<String> {
        self.resolve_index(name).map(|idx| self.courses[idx].title.clone())
    }

    fn course_outline(&self, title: &str) -> Option<Course> {
        self.courses.iter().find(|c| c.title == title).cloned()
    }

    fn lesson_link(&self, title: &str, lesson: u32) -> Option<String> {
        self.courses
            .iter()
            .find(|c| c.title == title)?
            .lessons
            .iter()
            .find(|l| l.number == lesson)?
            .link
            .clone()
    }

    fn course_titles(&self) -> Vec<String> {
        self.courses.iter().map(|c| c.title.clone()).collect()
    }
}

impl std::fmt::Debug for MemoryCourseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCourseStore")
            .field("courses", &self.courses.len())
            .field("chunks", &self.chunks.len())
            .field("max_results", &self.max_results)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use test_case::test_case;

    pub(crate) const CATALOG: &str = r#"{
        "courses": [
            {
                "title": "Building Towards Computer Use with Anthropic",
                "link": "https://example.com/computer-use",
                "instructor": "Colt Steele",
                "lessons": [
                    {"number": 0, "title": "Introduction", "link": "https://example.com/cu/0",
                     "content": "Welcome to the course on computer use.\n\nWe cover tool use and prompting."},
                    {"number": 1, "title": "Tool Use", "link": "https://example.com/cu/1",
                     "content": "Tool use lets the model call functions you define."}
                ]
            },
            {
                "title": "MCP: Build Rich-Context AI Apps",
                "instructor": "Elie Schoppik",
                "lessons": [
                    {"number": 1, "title": "Why MCP", "content": "The model context protocol standardizes tool servers."},
                    {"number": 2, "title": "Servers", "link": "https://example.com/mcp/2",
                     "content": "An MCP server exposes tools and resources."}
                ]
            }
        ]
    }"#;

    pub(crate) fn store() -> MemoryCourseStore {
        MemoryCourseStore::from_json(CATALOG).unwrap_or_else(|e| panic!("catalog: {e}"))
    }

    #[test]
    fn test_load_catalog() {
        let store = store();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.course_titles(),
            vec![
                "Building Towards Computer Use with Anthropic".to_string(),
                "MCP: Build Rich-Context AI Apps".to_string(),
            ]
        );
    }

    #[test]
    fn test_duplicate_titles_rejected() {
        let json = r#"{"courses": [{"title": "A"}, {"title": "A"}]}"#;
        assert!(matches!(
            MemoryCourseStore::from_json(json),
            Err(RetrievalError::Catalog { .. })
        ));
    }

    #[test]
    fn test_malformed_catalog_rejected() {
        assert!(matches!(
            MemoryCourseStore::from_json("{not json"),
            Err(RetrievalError::Catalog { .. })
        ));
    }

    #[test]
    fn test_missing_file_rejected() {
        let result = MemoryCourseStore::from_path(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(RetrievalError::Catalog { .. })));
    }

    #[test_case("MCP: Build Rich-Context AI Apps", Some("MCP: Build Rich-Context AI Apps"); "exact")]
    #[test_case("mcp", Some("MCP: Build Rich-Context AI Apps"); "substring")]
    #[test_case("computer use course", Some("Building Towards Computer Use with Anthropic"); "term overlap")]
    #[test_case("Quantum Knitting", None; "no match")]
    #[test_case("  ", None; "blank")]
    fn test_resolve_course_name(name: &str, expected: Option<&str>) {
        assert_eq!(store().resolve_course_name(name).as_deref(), expected);
    }

    #[test]
    fn test_search_ranks_by_overlap() {
        let results = store().search(&SearchQuery {
            text: "tool use",
            ..SearchQuery::default()
        });
        assert!(results.error.is_none());
        assert!(!results.is_empty());
        assert!(results.documents[0].to_lowercase().contains("tool use"));
        assert_eq!(results.documents.len(), results.metadata.len());
    }

    #[test]
    fn test_search_filters_course_and_lesson() {
        let results = store().search(&SearchQuery {
            text: "tools",
            course_name: Some("MCP"),
            lesson_number: Some(2),
            limit: None,
        });
        assert_eq!(results.len(), 1);
        assert_eq!(
            results.metadata[0],
            HitMetadata {
                course_title: "MCP: Build Rich-Context AI Apps".to_string(),
                lesson_number: Some(2),
            }
        );
    }

    #[test]
    fn test_search_unknown_course_reports_error() {
        let results = store().search(&SearchQuery {
            text: "tools",
            course_name: Some("Quantum Knitting"),
            ..SearchQuery::default()
        });
        assert!(results.is_empty());
        assert_eq!(
            results.error.as_deref(),
            Some("No course found matching 'Quantum Knitting'")
        );
    }

    #[test]
    fn test_search_respects_limit() {
        let store = store().with_max_results(1);
        let results = store.search(&SearchQuery {
            text: "tool model",
            ..SearchQuery::default()
        });
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_lesson_link_and_outline() {
        let store = store();
        let title = "Building Towards Computer Use with Anthropic";
        assert_eq!(store.lesson_link(title, 1).as_deref(), Some("https://example.com/cu/1"));
        assert_eq!(store.lesson_link(title, 9), None);
        let outline = store
            .course_outline(title)
            .unwrap_or_else(|| panic!("outline missing"));
        assert_eq!(outline.lessons.len(), 2);
        assert!(store.course_outline("computer use").is_none());
    }

    #[test]
    fn test_course_lookup_error() {
        assert!(matches!(
            store().course("Quantum Knitting"),
            Err(RetrievalError::CourseNotFound { ref name }) if name == "Quantum Knitting"
        ));
    }
}
