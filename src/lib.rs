//! rag-rs: retrieval-augmented question answering over course materials.
//!
//! The heart of the crate is [`agent::Orchestrator`], a bounded,
//! round-limited tool-calling loop: after every model turn it either
//! returns the answer, executes the requested retrieval tools and feeds
//! their results back, or forces a tool-free closing answer once the
//! round budget is spent.
//!
//! ```text
//! RagSystem::query
//!   └── Orchestrator::generate(query, history, catalog, executor, max_rounds)
//!         ├── LlmProvider::chat        (model turn)
//!         ├── ToolExecutor::execute    (course search / outline)
//!         └── synthesizer              (text extraction, fallback)
//! ```

pub mod agent;
pub mod cli;
pub mod error;
pub mod rag;
pub mod retrieval;
pub mod session;

pub use error::{AgentError, CommandError, Error, Result, RetrievalError};
pub use rag::{QueryAnswer, RagSystem};
