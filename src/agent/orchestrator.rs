//! Public entry point for tool-assisted answer generation.
//!
//! The [`Orchestrator`] owns no per-query state: every [`generate`] call
//! builds its own conversation and round counter, so one instance can be
//! shared across concurrent callers.
//!
//! [`generate`]: Orchestrator::generate

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use super::agentic_loop::{CallSettings, Generation, agentic_loop};
use super::config::{AgentConfig, DEFAULT_MAX_ROUNDS};
use super::executor::ToolExecutor;
use super::message::Conversation;
use super::prompt::{PromptSet, build_system_context};
use super::provider::LlmProvider;
use super::tool::ToolCatalog;
use crate::error::AgentError;

/// Maximum accepted query length in bytes.
const MAX_QUERY_LEN: usize = 10_000;

/// Inputs of one [`Orchestrator::generate`] call.
#[derive(Clone, Copy)]
pub struct GenerateRequest<'a> {
    /// User query, sent as the first user turn.
    pub query: &'a str,
    /// Summary of earlier exchanges, appended to the system context.
    pub conversation_summary: Option<&'a str>,
    /// Tools offered to the model.
    pub tools: Option<&'a ToolCatalog>,
    /// Capability that runs the offered tools.
    pub executor: Option<&'a dyn ToolExecutor>,
    /// Tool-round budget.
    pub max_rounds: usize,
}

impl<'a> GenerateRequest<'a> {
    /// Creates a tool-free request with the default round budget.
    #[must_use]
    pub const fn new(query: &'a str) -> Self {
        Self {
            query,
            conversation_summary: None,
            tools: None,
            executor: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Attaches a prior-conversation summary.
    #[must_use]
    pub const fn with_summary(mut self, summary: Option<&'a str>) -> Self {
        self.conversation_summary = summary;
        self
    }

    /// Offers `catalog` to the model, executed through `executor`.
    #[must_use]
    pub const fn with_tools(
        mut self,
        catalog: &'a ToolCatalog,
        executor: &'a dyn ToolExecutor,
    ) -> Self {
        self.tools = Some(catalog);
        self.executor = Some(executor);
        self
    }

    /// Overrides the tool-round budget.
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

impl std::fmt::Debug for GenerateRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateRequest")
            .field("query", &self.query)
            .field("conversation_summary", &self.conversation_summary)
            .field("tools", &self.tools.map(ToolCatalog::names))
            .field("executor", &self.executor.is_some())
            .field("max_rounds", &self.max_rounds)
            .finish()
    }
}

/// Drives sequential tool-calling conversations against one provider.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    prompts: PromptSet,
}

impl Orchestrator {
    /// Creates a new orchestrator with the given provider and configuration.
    ///
    /// Loads the system instructions from [`AgentConfig::prompt_dir`],
    /// falling back to compiled-in defaults.
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Self {
            provider,
            config,
            prompts,
        }
    }

    /// Replaces the loaded prompt set.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Generates an answer and returns its text.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Orchestration`] for an empty or oversized
    /// query, and propagates provider failures. Tool failures are not
    /// errors; they produce a fallback answer.
    pub async fn generate(&self, request: GenerateRequest<'_>) -> Result<String, AgentError> {
        self.generate_detailed(request).await.map(|g| g.text)
    }

    /// Generates an answer and reports how the run ended.
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate).
    pub async fn generate_detailed(
        &self,
        request: GenerateRequest<'_>,
    ) -> Result<Generation, AgentError> {
        if request.query.trim().is_empty() {
            return Err(AgentError::Orchestration {
                message: "Query cannot be empty".to_string(),
            });
        }

        if request.query.len() > MAX_QUERY_LEN {
            return Err(AgentError::Orchestration {
                message: format!(
                    "Query exceeds maximum length ({} bytes, max {MAX_QUERY_LEN})",
                    request.query.len()
                ),
            });
        }

        let start = Instant::now();
        let system = build_system_context(
            &self.prompts.system,
            request.max_rounds,
            request.conversation_summary,
        );
        let settings = CallSettings {
            model: &self.config.model,
            system: &system,
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        };
        let mut conversation = Conversation::from_query(request.query);

        debug!(
            provider = self.provider.name(),
            model = %self.config.model,
            max_rounds = request.max_rounds,
            tools = request.tools.map_or(0, ToolCatalog::len),
            "starting generation"
        );

        let generation = agentic_loop(
            self.provider.as_ref(),
            settings,
            &mut conversation,
            request.tools,
            request.executor,
            request.max_rounds,
        )
        .await?;

        debug!(
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "generation complete"
        );
        Ok(generation)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("model", &self.config.model)
            .field("max_rounds", &self.config.max_rounds)
            .finish_non_exhaustive()
    }
}
