//! Sequential tool-calling orchestration.
//!
//! Mediates between a chat model and a set of retrieval tools so the model
//! can gather evidence over a bounded number of rounds before answering.
//!
//! # Architecture
//!
//! ```text
//! caller → Orchestrator::generate
//!   └── agentic_loop
//!       ├── LlmProvider::chat   (model turn)
//!       ├── ToolExecutor        (one tool at a time, emission order)
//!       ├── append results as one user turn, round += 1
//!       └── budget spent → final call without tools
//! ```
//!
//! # Feature Gate
//!
//! The OpenAI-compatible provider requires the `openai` feature, enabled
//! by default.

pub mod agentic_loop;
pub mod client;
pub mod config;
pub mod executor;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod synthesizer;
pub mod tool;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types
pub use agentic_loop::{Generation, Termination};
pub use client::create_provider;
pub use config::AgentConfig;
pub use executor::{Source, Tool, ToolExecutor, ToolManager};
pub use message::{ContentBlock, Conversation, Message, ModelRequest, ModelResponse, Role, StopReason, TokenUsage};
pub use orchestrator::{GenerateRequest, Orchestrator};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use tool::{ToolCatalog, ToolDefinition};
