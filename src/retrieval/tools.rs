//! Retrieval tools exposed to the model.
//!
//! Both tools report "nothing there" outcomes as ordinary text so the
//! model can react to them; only malformed arguments become errors.

use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::store::{Course, CourseStore, HitMetadata, SearchQuery};
use crate::agent::executor::{Source, Tool};
use crate::agent::tool::ToolDefinition;
use crate::error::AgentError;

/// Name of the content search tool.
pub const SEARCH_TOOL: &str = "search_course_content";
/// Name of the course outline tool.
pub const OUTLINE_TOOL: &str = "get_course_outline";

fn parse_args<T: for<'de> Deserialize<'de>>(
    tool: &str,
    arguments: &Map<String, Value>,
) -> Result<T, AgentError> {
    serde_json::from_value(Value::Object(arguments.clone())).map_err(|e| {
        AgentError::ToolExecution {
            name: tool.to_string(),
            message: format!("invalid arguments: {e}"),
        }
    })
}

fn hit_label(meta: &HitMetadata) -> String {
    match meta.lesson_number {
        Some(n) => format!("{} - Lesson {n}", meta.course_title),
        None => meta.course_title.clone(),
    }
}

/// Searches lesson content with optional course and lesson filters.
pub struct CourseSearchTool {
    store: Arc<dyn CourseStore>,
    max_results: Option<usize>,
    sources: Mutex<Vec<Source>>,
}

impl CourseSearchTool {
    /// Creates a search tool over `store`.
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self {
            store,
            max_results: None,
            sources: Mutex::new(Vec::new()),
        }
    }

    /// Caps hits per search; the store default applies otherwise.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    fn record(&self, sources: Vec<Source>) {
        if let Ok(mut guard) = self.sources.lock() {
            *guard = sources;
        }
    }
}

impl Tool for CourseSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: SEARCH_TOOL.to_string(),
            description: "Search course materials with smart course name matching and lesson \
                          filtering"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    fn execute(&self, arguments: &Map<String, Value>) -> Result<String, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            query: String,
            course_name: Option<String>,
            lesson_number: Option<u32>,
        }
        let args: Args = parse_args(SEARCH_TOOL, arguments)?;

        let results = self.store.search(&SearchQuery {
            text: &args.query,
            course_name: args.course_name.as_deref(),
            lesson_number: args.lesson_number,
            limit: self.max_results,
        });

        if let Some(error) = results.error {
            self.record(Vec::new());
            return Ok(error);
        }

        if results.is_empty() {
            self.record(Vec::new());
            let mut message = "No relevant content found".to_string();
            if let Some(course) = &args.course_name {
                message.push_str(&format!(" in course '{course}'"));
            }
            if let Some(lesson) = args.lesson_number {
                message.push_str(&format!(" in lesson {lesson}"));
            }
            message.push('.');
            return Ok(message);
        }

        let mut sources = Vec::with_capacity(results.len());
        let formatted: Vec<String> = results
            .hits()
            .map(|(document, meta)| {
                let label = hit_label(meta);
                let link = meta
                    .lesson_number
                    .and_then(|n| self.store.lesson_link(&meta.course_title, n));
                let block = format!("[{label}]\n{document}");
                sources.push(Source { label, link });
                block
            })
            .collect();

        self.record(sources);
        Ok(formatted.join("\n\n"))
    }

    fn last_sources(&self) -> Vec<Source> {
        self.sources.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn reset_sources(&self) {
        self.record(Vec::new());
    }
}

/// Returns a course's title, link, instructor and lesson list.
pub struct CourseOutlineTool {
    store: Arc<dyn CourseStore>,
}

impl CourseOutlineTool {
    /// Creates an outline tool over `store`.
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }
}

impl Tool for CourseOutlineTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: OUTLINE_TOOL.to_string(),
            description: "Get the complete outline of a course: title, link, instructor and \
                          every lesson with its number and title"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "course_name": {
                        "type": "string",
                        "description": "Course title or part of it (e.g. 'MCP', 'Computer Use')"
                    }
                },
                "required": ["course_name"]
            }),
        }
    }

    fn execute(&self, arguments: &Map<String, Value>) -> Result<String, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            course_name: String,
        }
        let args: Args = parse_args(OUTLINE_TOOL, arguments)?;

        let Some(course) = self
            .store
            .resolve_course_name(&args.course_name)
            .and_then(|title| self.store.course_outline(&title))
        else {
            return Ok(format!("No course found matching '{}'.", args.course_name));
        };

        Ok(format_outline(&course))
    }
}

/// Renders a course header followed by its numbered lesson list.
#[must_use]
pub fn format_outline(course: &Course) -> String {
    let mut lines = vec![format!("Course Title: {}", course.title)];
    if let Some(link) = &course.link {
        lines.push(format!("Course Link: {link}"));
    }
    if let Some(instructor) = &course.instructor {
        lines.push(format!("Instructor: {instructor}"));
    }
    lines.push(String::new());
    lines.push(format!("Lessons ({} total):", course.lessons.len()));
    lines.extend(
        course
            .lessons
            .iter()
            .map(|l| format!("Lesson {}: {}", l.number, l.title)),
    );
    lines.join("\n")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::executor::{ToolExecutor, ToolManager};
    use crate::agent::tool::is_tool_failure;
    use crate::retrieval::store::SearchResults;
    use crate::retrieval::store::tests::store;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn shared_store() -> Arc<dyn CourseStore> {
        Arc::new(store())
    }

    /// Store double returning canned results.
    struct CannedStore(SearchResults);

    impl CourseStore for CannedStore {
        fn search(&self, _query: &SearchQuery<'_>) -> SearchResults {
            self.0.clone()
        }
        fn resolve_course_name(&self, _name: &str) -> Option<String> {
            None
        }
        fn course_outline(&self, _title: &str) -> Option<Course> {
            None
        }
        fn lesson_link(&self, _title: &str, lesson: u32) -> Option<String> {
            Some(format!("https://example.com/lesson{lesson}"))
        }
        fn course_titles(&self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_search_definition_requires_query() {
        let definition = CourseSearchTool::new(shared_store()).definition();
        assert_eq!(definition.name, "search_course_content");
        assert_eq!(definition.input_schema["type"], "object");
        assert_eq!(definition.input_schema["required"], json!(["query"]));
    }

    #[test]
    fn test_search_formats_hits_and_records_sources() {
        let tool = CourseSearchTool::new(Arc::new(CannedStore(SearchResults {
            documents: vec!["Document 1".to_string(), "Document 2".to_string()],
            metadata: vec![
                HitMetadata {
                    course_title: "Course A".to_string(),
                    lesson_number: Some(1),
                },
                HitMetadata {
                    course_title: "Course B".to_string(),
                    lesson_number: None,
                },
            ],
            error: None,
        })));

        let output = tool
            .execute(&args(json!({"query": "anything"})))
            .unwrap_or_else(|e| panic!("search failed: {e}"));

        assert_eq!(output, "[Course A - Lesson 1]\nDocument 1\n\n[Course B]\nDocument 2");
        assert_eq!(
            tool.last_sources(),
            vec![
                Source {
                    label: "Course A - Lesson 1".to_string(),
                    link: Some("https://example.com/lesson1".to_string()),
                },
                Source {
                    label: "Course B".to_string(),
                    link: None,
                },
            ]
        );

        tool.reset_sources();
        assert!(tool.last_sources().is_empty());
    }

    #[test]
    fn test_search_backend_error_verbatim() {
        let tool = CourseSearchTool::new(Arc::new(CannedStore(SearchResults::empty(
            "Search error: index offline",
        ))));
        let output = tool
            .execute(&args(json!({"query": "x"})))
            .unwrap_or_else(|e| panic!("search failed: {e}"));
        assert_eq!(output, "Search error: index offline");
    }

    #[test]
    fn test_search_empty_message_names_filters() {
        let tool = CourseSearchTool::new(shared_store());
        let output = tool
            .execute(&args(json!({
                "query": "zebra",
                "course_name": "MCP",
                "lesson_number": 2
            })))
            .unwrap_or_else(|e| panic!("search failed: {e}"));
        assert_eq!(output, "No relevant content found in course 'MCP' in lesson 2.");
        assert!(!is_tool_failure(&output));
    }

    #[test]
    fn test_search_with_course_filter_hits_store() {
        let tool = CourseSearchTool::new(shared_store());
        let output = tool
            .execute(&args(json!({"query": "server tools", "course_name": "mcp"})))
            .unwrap_or_else(|e| panic!("search failed: {e}"));
        assert!(output.starts_with("[MCP: Build Rich-Context AI Apps - Lesson"));
        assert!(!tool.last_sources().is_empty());
    }

    #[test]
    fn test_search_missing_query_is_error() {
        let tool = CourseSearchTool::new(shared_store());
        let result = tool.execute(&args(json!({"course_name": "MCP"})));
        assert!(matches!(
            result,
            Err(AgentError::ToolExecution { ref name, .. }) if name == SEARCH_TOOL
        ));
    }

    #[test]
    fn test_outline_lists_lessons() {
        let tool = CourseOutlineTool::new(shared_store());
        let output = tool
            .execute(&args(json!({"course_name": "computer use"})))
            .unwrap_or_else(|e| panic!("outline failed: {e}"));
        assert_eq!(
            output,
            "Course Title: Building Towards Computer Use with Anthropic\n\
             Course Link: https://example.com/computer-use\n\
             Instructor: Colt Steele\n\
             \n\
             Lessons (2 total):\n\
             Lesson 0: Introduction\n\
             Lesson 1: Tool Use"
        );
    }

    #[test]
    fn test_outline_unknown_course() {
        let tool = CourseOutlineTool::new(shared_store());
        let output = tool
            .execute(&args(json!({"course_name": "Quantum Knitting"})))
            .unwrap_or_else(|e| panic!("outline failed: {e}"));
        assert_eq!(output, "No course found matching 'Quantum Knitting'.");
    }

    #[test]
    fn test_manager_dispatches_both_tools() {
        let store = shared_store();
        let mut manager = ToolManager::new();
        manager.register(Box::new(CourseSearchTool::new(Arc::clone(&store))));
        manager.register(Box::new(CourseOutlineTool::new(store)));

        assert_eq!(
            manager.definitions().names(),
            vec![SEARCH_TOOL, OUTLINE_TOOL]
        );
        let output = manager
            .execute(OUTLINE_TOOL, &args(json!({"course_name": "MCP"})))
            .unwrap_or_else(|e| panic!("dispatch failed: {e}"));
        assert!(output.contains("Lesson 2: Servers"));
    }
}
