//! Test doubles shared by the agent unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::executor::ToolExecutor;
use super::message::{ContentBlock, ModelRequest, ModelResponse, StopReason, TokenUsage};
use super::provider::LlmProvider;
use super::tool::{ToolCatalog, ToolDefinition};
use crate::error::AgentError;

/// Scripted model client: replays canned responses in order and records
/// every request it receives. Once the script runs out it answers with
/// `"Sequence exhausted"`.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ModelResponse, AgentError>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<ModelResponse>) -> Self {
        Self::with_results(script.into_iter().map(Ok).collect())
    }

    pub fn with_results(script: Vec<Result<ModelResponse, AgentError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ModelRequest) -> Result<ModelResponse, AgentError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| Ok(text_response("Sequence exhausted")))
    }
}

/// Executor double: records every call and answers from a closure.
pub struct RecordingExecutor<F> {
    respond: F,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl<F> RecordingExecutor<F>
where
    F: Fn(&str, &Map<String, Value>) -> Result<String, AgentError> + Send + Sync,
{
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

impl<F> ToolExecutor for RecordingExecutor<F>
where
    F: Fn(&str, &Map<String, Value>) -> Result<String, AgentError> + Send + Sync,
{
    fn execute(&self, name: &str, arguments: &Map<String, Value>) -> Result<String, AgentError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments.clone()));
        }
        (self.respond)(name, arguments)
    }
}

/// Executor that always succeeds with a fixed result.
pub fn ok_executor(
    result: &'static str,
) -> RecordingExecutor<impl Fn(&str, &Map<String, Value>) -> Result<String, AgentError> + Send + Sync>
{
    RecordingExecutor::new(move |_, _| Ok(result.to_string()))
}

pub fn usage(total: u32) -> TokenUsage {
    TokenUsage {
        prompt_tokens: total,
        completion_tokens: 0,
        total_tokens: total,
    }
}

pub fn text_response(text: &str) -> ModelResponse {
    ModelResponse {
        stop_reason: StopReason::EndTurn,
        content: vec![ContentBlock::text(text)],
        usage: usage(10),
    }
}

pub fn tool_response(id: &str, tool: &str, input: Value) -> ModelResponse {
    let input = match input {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    ModelResponse {
        stop_reason: StopReason::ToolUse,
        content: vec![ContentBlock::tool_use(id, tool, input)],
        usage: usage(10),
    }
}

pub fn catalog() -> ToolCatalog {
    ToolCatalog::new(vec![
        ToolDefinition {
            name: "search_course_content".to_string(),
            description: "Search course materials".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "get_course_outline".to_string(),
            description: "Get a course outline".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {"course_name": {"type": "string"}},
                "required": ["course_name"]
            }),
        },
    ])
}
