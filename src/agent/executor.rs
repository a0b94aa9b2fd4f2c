//! Tool execution: the executor contract and the tool registry.
//!
//! The orchestrator only sees [`ToolExecutor`]. [`ToolManager`] is the
//! stock implementation: it maps tool names to registered [`Tool`]s and
//! aggregates the sources they record while answering a query.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::tool::{ToolCatalog, ToolDefinition};
use crate::error::AgentError;

/// Executes a named tool with an argument mapping.
///
/// Implementations may be shared across concurrent `generate` calls and
/// must be safe for that themselves; the orchestrator adds no locking.
pub trait ToolExecutor: Send + Sync {
    /// Runs `name` with `arguments` and returns its textual result.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolNotFound`] for unknown tools and
    /// [`AgentError::ToolExecution`] when the tool itself fails.
    fn execute(&self, name: &str, arguments: &Map<String, Value>) -> Result<String, AgentError>;
}

/// A citation recorded by a tool for the answer it helped produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Display label, e.g. `"Intro to Rust - Lesson 2"`.
    pub label: String,
    /// Link to the lesson or course, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A single capability exposed to the model.
pub trait Tool: Send + Sync {
    /// Descriptor offered to the model.
    fn definition(&self) -> ToolDefinition;

    /// Runs the tool.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolExecution`] on invalid arguments or
    /// backend failures.
    fn execute(&self, arguments: &Map<String, Value>) -> Result<String, AgentError>;

    /// Sources recorded by the most recent execution.
    fn last_sources(&self) -> Vec<Source> {
        Vec::new()
    }

    /// Clears recorded sources.
    fn reset_sources(&self) {}
}

/// Registry that dispatches tool calls by name.
#[derive(Default)]
pub struct ToolManager {
    order: Vec<String>,
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolManager {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its definition name.
    ///
    /// A later registration with the same name replaces the earlier one
    /// but keeps its position in the catalog.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.definition().name;
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Returns `true` if a tool with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Builds the catalog of registered tools in registration order.
    #[must_use]
    pub fn definitions(&self) -> ToolCatalog {
        ToolCatalog::new(
            self.order
                .iter()
                .filter_map(|name| self.tools.get(name))
                .map(|tool| tool.definition())
                .collect(),
        )
    }

    /// Sources recorded by all tools since the last reset, in
    /// registration order.
    #[must_use]
    pub fn last_sources(&self) -> Vec<Source> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .flat_map(|tool| tool.last_sources())
            .collect()
    }

    /// Clears the sources recorded by every tool.
    pub fn reset_sources(&self) {
        for tool in self.tools.values() {
            tool.reset_sources();
        }
    }
}

impl ToolExecutor for ToolManager {
    fn execute(&self, name: &str, arguments: &Map<String, Value>) -> Result<String, AgentError> {
        let tool = self.tools.get(name).ok_or_else(|| AgentError::ToolNotFound {
            name: name.to_string(),
        })?;
        let result = tool.execute(arguments);
        debug!(tool = name, ok = result.is_ok(), "tool executed");
        result
    }
}

impl std::fmt::Debug for ToolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolManager")
            .field("tools", &self.order)
            .finish()
    }
}
