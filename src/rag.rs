//! Course Q&A facade.
//!
//! Wires the orchestrator to the retrieval tools and session history:
//! one [`RagSystem::query`] call is one user question answered.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::agent::client::create_provider;
use crate::agent::config::AgentConfig;
use crate::agent::executor::{Source, ToolManager};
use crate::agent::orchestrator::{GenerateRequest, Orchestrator};
use crate::agent::prompt::build_course_query;
use crate::agent::provider::LlmProvider;
use crate::agent::{Termination, ToolCatalog};
use crate::error::{AgentError, Result};
use crate::retrieval::{CourseOutlineTool, CourseSearchTool, CourseStore};
use crate::session::SessionManager;

/// Answer to one user question.
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    /// Final answer text.
    pub answer: String,
    /// Citations recorded by the tools while answering.
    pub sources: Vec<Source>,
    /// Session the exchange was recorded in.
    pub session_id: String,
    /// How the tool loop ended.
    pub termination: Termination,
}

/// Catalog statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseAnalytics {
    /// Number of courses in the store.
    pub total_courses: usize,
    /// Every course title.
    pub course_titles: Vec<String>,
}

/// Retrieval-augmented course assistant.
///
/// Tool sources live on the shared [`ToolManager`], so queries on one
/// system are answered one at a time; concurrent callers wait their turn.
pub struct RagSystem {
    orchestrator: Orchestrator,
    store: Arc<dyn CourseStore>,
    tools: ToolManager,
    catalog: ToolCatalog,
    sessions: SessionManager,
    use_tools: bool,
    in_flight: Mutex<()>,
}

impl RagSystem {
    /// Creates a system over `store` answering through `provider`.
    ///
    /// Registers the content search and course outline tools.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn CourseStore>,
        config: AgentConfig,
    ) -> Self {
        let mut tools = ToolManager::new();
        tools.register(Box::new(
            CourseSearchTool::new(Arc::clone(&store)).with_max_results(config.max_results),
        ));
        tools.register(Box::new(CourseOutlineTool::new(Arc::clone(&store))));
        let catalog = tools.definitions();
        let sessions = SessionManager::new(config.max_history);

        Self {
            orchestrator: Orchestrator::new(provider, config),
            store,
            tools,
            catalog,
            sessions,
            use_tools: true,
            in_flight: Mutex::new(()),
        }
    }

    /// Creates a system using the provider named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedProvider`] for unknown providers.
    pub fn from_config(config: AgentConfig, store: Arc<dyn CourseStore>) -> Result<Self> {
        let provider: Arc<dyn LlmProvider> = Arc::from(create_provider(&config)?);
        Ok(Self::new(provider, store, config))
    }

    /// Answers from the model's own knowledge, offering no tools.
    #[must_use]
    pub const fn without_tools(mut self) -> Self {
        self.use_tools = false;
        self
    }

    /// Session history store.
    #[must_use]
    pub const fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Answers `query`, continuing `session_id` or opening a new session.
    ///
    /// The whole generation is bounded by the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Agent`] on provider failures, invalid
    /// queries, or timeout.
    pub async fn query(&self, query: &str, session_id: Option<&str>) -> Result<QueryAnswer> {
        let _turn = self.in_flight.lock().await;
        let session_id = session_id.map_or_else(|| self.sessions.create_session(), str::to_string);
        let history = self.sessions.history(&session_id);
        let prompt = build_course_query(query);
        let config = self.orchestrator.config();

        let mut request = GenerateRequest::new(&prompt)
            .with_summary(history.as_deref())
            .with_max_rounds(config.max_rounds);
        if self.use_tools {
            request = request.with_tools(&self.catalog, &self.tools);
        }

        self.tools.reset_sources();
        let generation = tokio::time::timeout(
            config.timeout,
            self.orchestrator.generate_detailed(request),
        )
        .await
        .map_err(|_| AgentError::Orchestration {
            message: format!("generation timed out after {}s", config.timeout.as_secs()),
        })??;

        let sources = self.tools.last_sources();
        self.tools.reset_sources();
        self.sessions
            .add_exchange(&session_id, query, &generation.text);

        info!(
            session = %session_id,
            termination = %generation.termination,
            sources = sources.len(),
            "query answered"
        );

        Ok(QueryAnswer {
            answer: generation.text,
            sources,
            session_id,
            termination: generation.termination,
        })
    }

    /// Course count and titles.
    #[must_use]
    pub fn course_analytics(&self) -> CourseAnalytics {
        let course_titles = self.store.course_titles();
        CourseAnalytics {
            total_courses: course_titles.len(),
            course_titles,
        }
    }
}

impl std::fmt::Debug for RagSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagSystem")
            .field("orchestrator", &self.orchestrator)
            .field("tools", &self.tools)
            .field("use_tools", &self.use_tools)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::testing::{ScriptedProvider, text_response, tool_response};
    use crate::error::Error;
    use crate::retrieval::store::tests::store;
    use serde_json::json;

    fn system(provider: &Arc<ScriptedProvider>) -> RagSystem {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let provider: Arc<dyn LlmProvider> = provider.clone();
        RagSystem::new(provider, Arc::new(store()), config)
    }

    #[tokio::test]
    async fn test_query_collects_sources_and_records_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response("t1", "search_course_content", json!({"query": "tool use"})),
            text_response("Tool use lets the model call functions."),
        ]));
        let rag = system(&provider);

        let answer = rag
            .query("What is tool use?", None)
            .await
            .unwrap_or_else(|e| panic!("query failed: {e}"));

        assert_eq!(answer.answer, "Tool use lets the model call functions.");
        assert_eq!(answer.session_id, "session_1");
        assert!(!answer.sources.is_empty());
        assert!(answer.sources[0].label.starts_with("Building Towards Computer Use"));
        assert_eq!(
            rag.sessions().history("session_1").as_deref(),
            Some("User: What is tool use?\nAssistant: Tool use lets the model call functions.")
        );

        let first = &provider.requests()[0];
        assert_eq!(first.tools.len(), 2);
        assert_eq!(
            first.messages[0].content,
            crate::agent::message::MessageContent::Text(
                "Answer this question about course materials: What is tool use?".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_follow_up_carries_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("first answer"),
            text_response("second answer"),
        ]));
        let rag = system(&provider);

        let first = rag
            .query("first question", None)
            .await
            .unwrap_or_else(|e| panic!("query failed: {e}"));
        let _ = rag
            .query("second question", Some(&first.session_id))
            .await
            .unwrap_or_else(|e| panic!("query failed: {e}"));

        let requests = provider.requests();
        assert!(!requests[0].system.contains("Previous conversation"));
        assert!(
            requests[1]
                .system
                .ends_with("Previous conversation:\nUser: first question\nAssistant: first answer")
        );
    }

    #[tokio::test]
    async fn test_sources_do_not_leak_between_queries() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response("t1", "search_course_content", json!({"query": "server"})),
            text_response("with sources"),
            text_response("without sources"),
        ]));
        let rag = system(&provider);

        let first = rag
            .query("q1", None)
            .await
            .unwrap_or_else(|e| panic!("query failed: {e}"));
        let second = rag
            .query("q2", None)
            .await
            .unwrap_or_else(|e| panic!("query failed: {e}"));

        assert!(!first.sources.is_empty());
        assert!(second.sources.is_empty());
        assert_eq!(second.session_id, "session_2");
    }

    #[tokio::test]
    async fn test_without_tools_offers_no_catalog() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("plain")]));
        let rag = system(&provider).without_tools();

        let answer = rag
            .query("q", None)
            .await
            .unwrap_or_else(|e| panic!("query failed: {e}"));

        assert_eq!(answer.termination, Termination::NoTools);
        assert!(provider.requests()[0].tools.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_surfaces_as_agent_error() {
        let provider = Arc::new(ScriptedProvider::with_results(vec![Err(
            AgentError::ApiRequest {
                message: "rate limited".to_string(),
                status: Some(429),
            },
        )]));
        let rag = system(&provider);

        let result = rag.query("q", None).await;
        assert!(matches!(result, Err(Error::Agent(AgentError::ApiRequest { .. }))));
    }

    #[tokio::test]
    async fn test_concurrent_queries_keep_their_own_sources() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response("t1", "search_course_content", json!({"query": "server"})),
            text_response("with sources"),
            text_response("without sources"),
        ]));
        let rag = system(&provider);

        let (first, second) = tokio::join!(rag.query("q1", None), rag.query("q2", None));
        let first = first.unwrap_or_else(|e| panic!("query failed: {e}"));
        let second = second.unwrap_or_else(|e| panic!("query failed: {e}"));

        assert_eq!(first.answer, "with sources");
        assert!(!first.sources.is_empty());
        assert_eq!(second.answer, "without sources");
        assert!(second.sources.is_empty());
        assert_eq!(provider.call_count(), 3);
    }

    #[test]
    fn test_course_analytics() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let analytics = system(&provider).course_analytics();
        assert_eq!(analytics.total_courses, 2);
        assert_eq!(analytics.course_titles[1], "MCP: Build Rich-Context AI Apps");
    }
}
