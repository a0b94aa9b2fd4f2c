//! `OpenAI` provider implementation using the `async-openai` crate.
//!
//! Supports any `OpenAI`-compatible API (`OpenAI`, Azure, local proxies)
//! via the base URL override in [`AgentConfig`]. Tool-use blocks map to
//! assistant `tool_calls`, tool-result blocks to `tool` role messages.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
    ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
    ChatCompletionRequestToolMessage, ChatCompletionRequestToolMessageContent,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent, ChatCompletionTool,
    ChatCompletionToolChoiceOption, ChatCompletionToolType, CreateChatCompletionRequest,
    FunctionCall, FunctionObject,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::agent::config::AgentConfig;
use crate::agent::message::{
    ContentBlock, Message, MessageContent, ModelRequest, ModelResponse, Role, StopReason,
    TokenUsage,
};
use crate::agent::provider::LlmProvider;
use crate::error::AgentError;

/// `OpenAI`-compatible LLM provider.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAiProvider {
    /// Creates a new provider from agent configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(ref base_url) = config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        Self {
            client: Client::with_config(openai_config),
        }
    }

    fn system_message(system: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(system.to_string()),
            name: None,
        })
    }

    fn user_text(text: String) -> ChatCompletionRequestMessage {
        ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(text),
            name: None,
        })
    }

    /// Converts one conversation turn into `OpenAI` messages.
    ///
    /// A user turn holding tool results expands to one `tool` message per
    /// result, in order.
    fn convert_message(msg: &Message) -> Vec<ChatCompletionRequestMessage> {
        match (&msg.role, &msg.content) {
            (Role::User, MessageContent::Text(text)) => vec![Self::user_text(text.clone())],
            (Role::User, MessageContent::Blocks(blocks)) => {
                let mut out = Vec::with_capacity(blocks.len());
                let mut texts = Vec::new();
                for block in blocks {
                    match block {
                        ContentBlock::ToolResult {
                            tool_use_id,
                            content,
                        } => out.push(ChatCompletionRequestMessage::Tool(
                            ChatCompletionRequestToolMessage {
                                content: ChatCompletionRequestToolMessageContent::Text(
                                    content.clone(),
                                ),
                                tool_call_id: tool_use_id.clone(),
                            },
                        )),
                        ContentBlock::Text { text } => texts.push(text.as_str()),
                        ContentBlock::ToolUse { .. } => {}
                    }
                }
                if !texts.is_empty() {
                    out.push(Self::user_text(texts.join("\n")));
                }
                out
            }
            (Role::Assistant, MessageContent::Text(text)) => {
                vec![Self::assistant_message(Some(text.clone()), Vec::new())]
            }
            (Role::Assistant, MessageContent::Blocks(blocks)) => {
                let mut texts = Vec::new();
                let mut tool_calls = Vec::new();
                for block in blocks {
                    match block {
                        ContentBlock::Text { text } => texts.push(text.as_str()),
                        ContentBlock::ToolUse { id, name, input } => {
                            tool_calls.push(ChatCompletionMessageToolCall {
                                id: id.clone(),
                                r#type: ChatCompletionToolType::Function,
                                function: FunctionCall {
                                    name: name.clone(),
                                    arguments: Value::Object(input.clone()).to_string(),
                                },
                            });
                        }
                        ContentBlock::ToolResult { .. } => {}
                    }
                }
                let text = texts.join("\n");
                let content = if text.is_empty() { None } else { Some(text) };
                vec![Self::assistant_message(content, tool_calls)]
            }
        }
    }

    fn assistant_message(
        content: Option<String>,
        tool_calls: Vec<ChatCompletionMessageToolCall>,
    ) -> ChatCompletionRequestMessage {
        #[allow(deprecated)]
        ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
            content: content.map(ChatCompletionRequestAssistantMessageContent::Text),
            name: None,
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            refusal: None,
            audio: None,
            function_call: None,
        })
    }

    /// Builds an `OpenAI` chat completion request from our generic request.
    fn build_request(request: &ModelRequest) -> CreateChatCompletionRequest {
        let mut messages = vec![Self::system_message(&request.system)];
        messages.extend(request.messages.iter().flat_map(Self::convert_message));

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|td| ChatCompletionTool {
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionObject {
                            name: td.name.clone(),
                            description: Some(td.description.clone()),
                            parameters: Some(td.input_schema.clone()),
                            strict: None,
                        },
                    })
                    .collect(),
            )
        };
        let tool_choice = tools.as_ref().map(|_| ChatCompletionToolChoiceOption::Auto);

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_completion_tokens: request.max_tokens,
            tools,
            tool_choice,
            ..Default::default()
        }
    }

    /// Parses tool-call arguments, falling back to an empty mapping.
    fn parse_arguments(tool: &str, raw: &str) -> Map<String, Value> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            _ => {
                warn!(tool, "tool arguments are not a JSON object, using empty mapping");
                Map::new()
            }
        }
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("client", &"<async-openai::Client>")
            .finish()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn chat(&self, request: &ModelRequest) -> Result<ModelResponse, AgentError> {
        let openai_request = Self::build_request(request);

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| AgentError::ApiRequest {
                message: e.to_string(),
                status: None,
            })?;

        let choice = response.choices.first();

        let mut content = Vec::new();
        if let Some(text) = choice
            .and_then(|c| c.message.content.as_ref())
            .filter(|t| !t.is_empty())
        {
            content.push(ContentBlock::text(text.clone()));
        }

        if let Some(tcs) = choice.and_then(|c| c.message.tool_calls.as_ref()) {
            content.extend(tcs.iter().map(|tc| {
                ContentBlock::tool_use(
                    tc.id.clone(),
                    tc.function.name.clone(),
                    Self::parse_arguments(&tc.function.name, &tc.function.arguments),
                )
            }));
        }

        let has_tool_use = content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }));
        let stop_reason = if has_tool_use {
            StopReason::ToolUse
        } else {
            choice
                .and_then(|c| c.finish_reason.as_ref())
                .map_or(StopReason::EndTurn, |fr| {
                    StopReason::parse(&format!("{fr:?}"))
                })
        };

        if content.is_empty() {
            content.push(ContentBlock::text(String::new()));
        }

        let usage = response
            .usage
            .map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            });

        debug!(
            stop_reason = %stop_reason,
            blocks = content.len(),
            total_tokens = usage.total_tokens,
            "model call complete"
        );

        Ok(ModelResponse {
            stop_reason,
            content,
            usage,
        })
    }
}
