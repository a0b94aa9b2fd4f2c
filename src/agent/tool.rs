//! Tool type definitions for function-calling.
//!
//! Provides the provider-agnostic tool descriptor, the ordered catalog
//! offered to the model, a borrowed view over the tool-use blocks of an
//! assistant turn, and the predicate that classifies a tool's textual
//! output as a soft failure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::ContentBlock;

/// Marker that identifies a soft tool failure in a textual result.
const FAILURE_MARKER: &str = "not found";

/// A tool descriptor that can be offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match the executor's dispatch table).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's arguments.
    pub input_schema: Value,
}

/// An ordered set of tool descriptors.
///
/// Passed to the model opaquely; the orchestrator only looks at names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCatalog {
    definitions: Vec<ToolDefinition>,
}

impl ToolCatalog {
    /// Creates a catalog from definitions, keeping their order.
    #[must_use]
    pub const fn new(definitions: Vec<ToolDefinition>) -> Self {
        Self { definitions }
    }

    /// Empty catalog (no tools offered).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns the definitions in order.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns the tool names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Returns `true` if the catalog offers no tools.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Number of tools.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.definitions.len()
    }
}

/// Borrowed view of one tool-use block.
#[derive(Debug, Clone, Copy)]
pub struct ToolCall<'a> {
    /// Invocation identifier.
    pub id: &'a str,
    /// Tool name.
    pub name: &'a str,
    /// Argument mapping.
    pub input: &'a Map<String, Value>,
}

/// Collects the tool-use blocks of a turn in emission order.
#[must_use]
pub fn tool_calls(blocks: &[ContentBlock]) -> Vec<ToolCall<'_>> {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } => Some(ToolCall { id, name, input }),
            ContentBlock::Text { .. } | ContentBlock::ToolResult { .. } => None,
        })
        .collect()
}

/// Returns `true` if a tool's textual output signals a failure.
///
/// Case-insensitive substring match on "not found". This also fires on
/// legitimate output that happens to contain the phrase; callers that need
/// a structured signal should return an error from the executor instead.
#[must_use]
pub fn is_tool_failure(content: &str) -> bool {
    content.to_lowercase().contains(FAILURE_MARKER)
}
