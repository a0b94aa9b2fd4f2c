//! Pluggable LLM provider trait.
//!
//! Implementations translate provider-agnostic [`ModelRequest`]/[`ModelResponse`]
//! into provider-specific SDK calls. This keeps the orchestrator decoupled
//! from any particular LLM vendor.

use async_trait::async_trait;

use super::message::{ModelRequest, ModelResponse};
use crate::error::AgentError;

/// Trait for LLM provider backends (the model client).
///
/// Implementations own the transport layer, including any retry or
/// backoff policy. A shared provider must be safe to call from concurrent
/// `generate` invocations.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`).
    fn name(&self) -> &'static str;

    /// Executes one model call.
    ///
    /// A successful response always carries a stop reason and at least one
    /// content block.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] on transport or API failures.
    async fn chat(&self, request: &ModelRequest) -> Result<ModelResponse, AgentError>;
}
