//! Error types for rag-rs.
//!
//! Each layer gets its own `thiserror` enum; [`Error`] wraps them for
//! callers that cross layers (the CLI and the [`crate::rag::RagSystem`]
//! facade).

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Model, tool or orchestration failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Course store failure.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the agent layer (providers, tools, orchestrator).
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured.
    #[error("API key missing: set RAG_API_KEY or OPENAI_API_KEY")]
    ApiKeyMissing,

    /// The configured provider name is not known.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name as configured.
        name: String,
    },

    /// The model API call failed (transport, auth, rate limit, ...).
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error detail from the client.
        message: String,
        /// HTTP status when known.
        status: Option<u16>,
    },

    /// A tool ran but failed.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Tool name.
        name: String,
        /// Failure detail.
        message: String,
    },

    /// No tool is registered under the requested name.
    #[error("tool '{name}' not found")]
    ToolNotFound {
        /// Requested tool name.
        name: String,
    },

    /// Invalid input or inconsistent orchestration state.
    #[error("orchestration error: {message}")]
    Orchestration {
        /// Failure detail.
        message: String,
    },
}

/// Errors raised by the course store collaborator.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// No course matched the requested name.
    #[error("course not found: {name}")]
    CourseNotFound {
        /// Requested course name.
        name: String,
    },

    /// A course catalog file could not be read or parsed.
    #[error("invalid course catalog: {message}")]
    Catalog {
        /// Failure detail.
        message: String,
    },
}

/// Errors raised while executing CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not complete.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Output could not be rendered in the requested format.
    #[error("output format error: {0}")]
    OutputFormat(String),
}
