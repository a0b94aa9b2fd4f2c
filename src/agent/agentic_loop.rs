//! Sequential, round-limited tool-calling loop.
//!
//! Drives the model ↔ tool round-trip: calls the model, executes the tools
//! it asks for one at a time in emission order, appends all results of the
//! round as a single user turn, and repeats. Once the round budget is spent
//! the model gets one last call without tools, so a run makes at most
//! `max_rounds + 1` model calls.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::executor::ToolExecutor;
use super::message::{ContentBlock, Conversation, ModelRequest, TokenUsage};
use super::provider::LlmProvider;
use super::synthesizer::{extract_text, fallback_text};
use super::tool::{ToolCatalog, is_tool_failure, tool_calls};
use crate::error::AgentError;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The model answered with text while tools were on offer.
    Text,
    /// No tool catalog was ever offered; the first answer was final.
    NoTools,
    /// The round budget ran out; a tool-free closing call produced the answer.
    MaxRounds,
    /// A tool raised or reported a failure; best-effort text was returned.
    ToolFailure,
}

impl Termination {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::NoTools => "no_tools",
            Self::MaxRounds => "max_rounds",
            Self::ToolFailure => "tool_failure",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    /// Final answer text.
    pub text: String,
    /// Terminal state.
    pub termination: Termination,
    /// Completed tool rounds.
    pub rounds: usize,
    /// Model calls made.
    pub model_calls: usize,
    /// Conversation turns at termination.
    pub turns: usize,
    /// Token usage summed over all model calls.
    pub usage: TokenUsage,
}

/// Per-call settings shared by every model request in a run.
#[derive(Debug, Clone, Copy)]
pub struct CallSettings<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// System context, built once per run.
    pub system: &'a str,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Maximum tokens per response.
    pub max_tokens: Option<u32>,
}

impl CallSettings<'_> {
    /// Builds a request from the current conversation snapshot.
    fn request(&self, conversation: &Conversation, tools: Option<&ToolCatalog>) -> ModelRequest {
        ModelRequest {
            model: self.model.to_string(),
            system: self.system.to_string(),
            messages: conversation.messages().to_vec(),
            tools: tools.map(|c| c.definitions().to_vec()).unwrap_or_default(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

enum LoopState {
    AwaitingModel,
    ExecutingTools { turn: Vec<ContentBlock> },
    Terminated { termination: Termination, text: String },
}

/// Executes every tool-use block of `turn` in order.
///
/// Returns the result blocks, or `None` as soon as one tool raises or
/// reports a failure.
fn execute_round(
    turn: &[ContentBlock],
    executor: &dyn ToolExecutor,
    round: usize,
) -> Option<Vec<ContentBlock>> {
    let calls = tool_calls(turn);
    let mut results = Vec::with_capacity(calls.len());

    for call in calls {
        match executor.execute(call.name, call.input) {
            Ok(content) if is_tool_failure(&content) => {
                warn!(round, tool = call.name, call_id = call.id, "tool reported failure");
                return None;
            }
            Ok(content) => {
                debug!(round, tool = call.name, call_id = call.id, bytes = content.len(), "tool executed");
                results.push(ContentBlock::tool_result(call.id, content));
            }
            Err(e) => {
                warn!(round, tool = call.name, call_id = call.id, error = %e, "tool execution failed");
                return None;
            }
        }
    }

    Some(results)
}

/// Runs the round controller over `conversation`.
///
/// Tools are offered only when both a non-empty catalog and an executor
/// are present and budget remains. A response that asks for tools the
/// caller cannot service ends the run with whatever text it carried.
///
/// # Errors
///
/// Propagates provider errors unchanged. Tool errors never escape; they
/// end the run with [`Termination::ToolFailure`].
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    settings: CallSettings<'_>,
    conversation: &mut Conversation,
    tools: Option<&ToolCatalog>,
    executor: Option<&dyn ToolExecutor>,
    max_rounds: usize,
) -> Result<Generation, AgentError> {
    let tools = tools.filter(|c| !c.is_empty());
    let mut rounds = 0;
    let mut model_calls = 0;
    let mut usage = TokenUsage::default();
    let mut tools_offered = false;
    let mut state = LoopState::AwaitingModel;

    loop {
        state = match state {
            LoopState::AwaitingModel => {
                let offer = match (tools, executor) {
                    (Some(catalog), Some(_)) if rounds < max_rounds => Some(catalog),
                    _ => None,
                };
                tools_offered |= offer.is_some();

                let response = provider.chat(&settings.request(conversation, offer)).await?;
                model_calls += 1;
                usage.accumulate(response.usage);
                debug!(
                    round = rounds,
                    stop_reason = %response.stop_reason,
                    tools_offered = offer.is_some(),
                    "model turn received"
                );

                let wants_tools =
                    response.requests_tools() && !tool_calls(&response.content).is_empty();

                if wants_tools && offer.is_some() {
                    conversation.push_assistant_blocks(response.content.clone());
                    LoopState::ExecutingTools {
                        turn: response.content,
                    }
                } else {
                    if wants_tools {
                        warn!("model requested tools that cannot be serviced");
                    }
                    LoopState::Terminated {
                        termination: if tools_offered {
                            Termination::Text
                        } else {
                            Termination::NoTools
                        },
                        text: extract_text(&response.content),
                    }
                }
            }
            LoopState::ExecutingTools { turn } => {
                // `offer` above guarantees an executor in this state.
                let Some(executor) = executor else {
                    return Err(AgentError::Orchestration {
                        message: "tool round without an executor".to_string(),
                    });
                };

                match execute_round(&turn, executor, rounds + 1) {
                    None => LoopState::Terminated {
                        termination: Termination::ToolFailure,
                        text: fallback_text(&turn),
                    },
                    Some(results) => {
                        conversation.push_tool_results(results);
                        rounds += 1;

                        if rounds >= max_rounds {
                            let response =
                                provider.chat(&settings.request(conversation, None)).await?;
                            model_calls += 1;
                            usage.accumulate(response.usage);
                            LoopState::Terminated {
                                termination: Termination::MaxRounds,
                                text: extract_text(&response.content),
                            }
                        } else {
                            LoopState::AwaitingModel
                        }
                    }
                }
            }
            LoopState::Terminated { termination, text } => {
                info!(
                    termination = %termination,
                    rounds,
                    model_calls,
                    total_tokens = usage.total_tokens,
                    "generation finished"
                );
                return Ok(Generation {
                    text,
                    termination,
                    rounds,
                    model_calls,
                    turns: conversation.len(),
                    usage,
                });
            }
        };
    }
}
