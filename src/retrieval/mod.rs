//! Course retrieval: the store seam and the tools built on it.

pub mod store;
pub mod tools;

pub use store::{
    Course, CourseStore, HitMetadata, Lesson, MemoryCourseStore, SearchQuery, SearchResults,
};
pub use tools::{CourseOutlineTool, CourseSearchTool, OUTLINE_TOOL, SEARCH_TOOL, format_outline};
