//! Provider-agnostic conversation types.
//!
//! A [`Conversation`] is an ordered list of [`Message`] turns. Each turn is
//! either plain text or a list of [`ContentBlock`]s, so an assistant turn
//! can carry tool-use requests and the following user turn can carry the
//! matching tool results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::tool::ToolDefinition;

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input (queries and tool results).
    User,
    /// Model output.
    Assistant,
}

/// A single block of turn content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Human-readable text.
    Text {
        /// Text payload.
        text: String,
    },
    /// A tool invocation requested by the model.
    ToolUse {
        /// Identifier, unique within the model turn.
        id: String,
        /// Tool to invoke.
        name: String,
        /// Argument mapping.
        input: Map<String, Value>,
    },
    /// The result of a tool invocation.
    ToolResult {
        /// Identifier of the invocation this answers.
        tool_use_id: String,
        /// Textual result payload.
        content: String,
    },
}

impl ContentBlock {
    /// Creates a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates a tool-use block.
    #[must_use]
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Map<String, Value>) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Creates a tool-result block.
    #[must_use]
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
        }
    }
}

/// Turn content: plain text or a list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text.
    Text(String),
    /// Structured blocks.
    Blocks(Vec<ContentBlock>),
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the turn.
    pub role: Role,
    /// Turn content.
    pub content: MessageContent,
}

impl Message {
    /// Returns the turn's content as blocks, treating plain text as a
    /// single text block.
    #[must_use]
    pub fn blocks(&self) -> Vec<ContentBlock> {
        match &self.content {
            MessageContent::Text(text) => vec![ContentBlock::text(text.clone())],
            MessageContent::Blocks(blocks) => blocks.clone(),
        }
    }
}

/// Creates a plain-text user turn.
#[must_use]
pub fn user_message(content: &str) -> Message {
    Message {
        role: Role::User,
        content: MessageContent::Text(content.to_string()),
    }
}

/// Creates an assistant turn from the blocks the model returned.
#[must_use]
pub const fn assistant_blocks_message(blocks: Vec<ContentBlock>) -> Message {
    Message {
        role: Role::Assistant,
        content: MessageContent::Blocks(blocks),
    }
}

/// Creates a user turn holding the tool results of one round.
#[must_use]
pub const fn tool_results_message(results: Vec<ContentBlock>) -> Message {
    Message {
        role: Role::User,
        content: MessageContent::Blocks(results),
    }
}

/// The ordered turns of one orchestration run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Starts a conversation with the user's query as its only turn.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self {
            messages: vec![user_message(query)],
        }
    }

    /// Appends the assistant turn exactly as the model returned it.
    pub fn push_assistant_blocks(&mut self, blocks: Vec<ContentBlock>) {
        self.messages.push(assistant_blocks_message(blocks));
    }

    /// Appends one user turn holding every tool result of a round.
    pub fn push_tool_results(&mut self, results: Vec<ContentBlock>) {
        self.messages.push(tool_results_message(results));
    }

    /// Returns the turns in order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of turns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no turns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Why the model ended its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model wants tools executed before it continues.
    ToolUse,
    /// The model finished its answer.
    EndTurn,
    /// The token limit cut the answer short.
    MaxTokens,
    /// A stop sequence ended the answer.
    StopSequence,
}

impl StopReason {
    /// Parses a provider finish/stop reason string.
    ///
    /// Unknown values are treated as a finished turn.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "tool_use" | "tool_calls" | "toolcalls" | "function_call" | "functioncall" => {
                Self::ToolUse
            }
            "max_tokens" | "length" => Self::MaxTokens,
            "stop_sequence" => Self::StopSequence,
            _ => Self::EndTurn,
        }
    }

    /// Returns the wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToolUse => "tool_use",
            Self::EndTurn => "end_turn",
            Self::MaxTokens => "max_tokens",
            Self::StopSequence => "stop_sequence",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A model request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Model identifier.
    pub model: String,
    /// System context for this call.
    pub system: String,
    /// Conversation snapshot.
    pub messages: Vec<Message>,
    /// Tool catalog offered on this call; empty means no tools.
    pub tools: Vec<ToolDefinition>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Adds another call's usage, saturating on overflow.
    pub const fn accumulate(&mut self, other: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

/// A model response (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ModelResponse {
    /// Why the turn ended.
    pub stop_reason: StopReason,
    /// Turn content, in emission order.
    pub content: Vec<ContentBlock>,
    /// Token usage for this call.
    pub usage: TokenUsage,
}

impl ModelResponse {
    /// Returns `true` if the model asked for tools.
    #[must_use]
    pub fn requests_tools(&self) -> bool {
        self.stop_reason == StopReason::ToolUse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_conversation_from_query() {
        let conversation = Conversation::from_query("What is lesson 1 about?");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].role, Role::User);
        assert_eq!(
            conversation.messages()[0].content,
            MessageContent::Text("What is lesson 1 about?".to_string())
        );
    }

    #[test]
    fn test_round_adds_two_turns() {
        let mut conversation = Conversation::from_query("q");
        conversation.push_assistant_blocks(vec![ContentBlock::tool_use("t1", "search", Map::new())]);
        conversation.push_tool_results(vec![ContentBlock::tool_result("t1", "hits")]);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[1].role, Role::Assistant);
        assert_eq!(conversation.messages()[2].role, Role::User);
    }

    #[test]
    fn test_message_blocks_from_plain_text() {
        let msg = user_message("hello");
        assert_eq!(msg.blocks(), vec![ContentBlock::text("hello")]);
    }

    #[test]
    fn test_content_block_serialization() {
        let mut input = Map::new();
        input.insert("query".to_string(), json!("ownership"));
        let block = ContentBlock::tool_use("toolu_1", "search_course_content", input);
        let json = serde_json::to_value(&block).unwrap_or_default();
        assert_eq!(json["type"], "tool_use");
        assert_eq!(json["name"], "search_course_content");
        assert_eq!(json["input"]["query"], "ownership");

        let result = serde_json::to_value(ContentBlock::tool_result("toolu_1", "ok"))
            .unwrap_or_default();
        assert_eq!(result["type"], "tool_result");
        assert_eq!(result["tool_use_id"], "toolu_1");
    }

    #[test]
    fn test_plain_text_content_serializes_as_string() {
        let json = serde_json::to_value(user_message("hi")).unwrap_or_default();
        assert_eq!(json, json!({"role": "user", "content": "hi"}));
    }

    #[test_case("tool_use", StopReason::ToolUse ; "anthropic tool use")]
    #[test_case("tool_calls", StopReason::ToolUse ; "openai tool calls")]
    #[test_case("toolcalls", StopReason::ToolUse ; "debug formatted tool calls")]
    #[test_case("end_turn", StopReason::EndTurn ; "end turn")]
    #[test_case("stop", StopReason::EndTurn ; "openai stop")]
    #[test_case("length", StopReason::MaxTokens ; "openai length")]
    #[test_case("max_tokens", StopReason::MaxTokens ; "max tokens")]
    #[test_case("stop_sequence", StopReason::StopSequence ; "stop sequence")]
    #[test_case("something_new", StopReason::EndTurn ; "unknown")]
    fn test_stop_reason_parse(raw: &str, expected: StopReason) {
        assert_eq!(StopReason::parse(raw), expected);
    }

    #[test]
    fn test_usage_accumulate() {
        let mut total = TokenUsage::default();
        total.accumulate(TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });
        total.accumulate(TokenUsage {
            prompt_tokens: u32::MAX,
            completion_tokens: 1,
            total_tokens: 1,
        });
        assert_eq!(total.prompt_tokens, u32::MAX);
        assert_eq!(total.completion_tokens, 6);
        assert_eq!(total.total_tokens, 16);
    }
}
