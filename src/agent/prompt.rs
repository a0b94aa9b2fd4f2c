//! System instructions and context builders.
//!
//! The static instructions are loaded once (from a template file or the
//! compiled-in default) and injected into the orchestrator. Each
//! `generate` call derives its own system context from them, the round
//! budget, and an optional summary of earlier exchanges.

use std::path::{Path, PathBuf};

/// Compiled-in instructions for the course assistant.
pub const SYSTEM_PROMPT: &str = r"You are an assistant for course materials and educational content. You can search lesson content and look up course outlines.

Tool Usage:
- search_course_content: questions about specific concepts, explanations or details taught in a course
- get_course_outline: questions about a course's structure, its lesson list or an overview
- Tools may be used in separate reasoning steps; after each tool result you may request another tool if it helps
- Combine content searches with outline lookups, or search again with different filters, when a single call is not enough
- Base answers on tool results. If the tools return nothing relevant, say so plainly and do not invent alternatives

Response Protocol:
- General knowledge questions: answer directly without tools
- Course content questions: search first, refine with a second search if needed
- Outline or structure questions: fetch the outline first, then search for specific content if needed
- Give the answer only. No reasoning narration, no description of the tools used, no classification of the question

When the gathered information is sufficient, answer without requesting more tools.

For outline answers include:
- the course title
- the course link, when available
- every lesson with its number and title

Every answer must be brief and focused, keep its instructional value, use plain language, and include an example when it makes the point clearer.
";

/// Directory (under the user's home) searched for prompt templates.
const DEFAULT_PROMPT_DIR: &str = ".config/rag-rs/prompts";
/// Filename for the system instruction template.
const SYSTEM_FILENAME: &str = "system.md";
/// Environment variable naming a prompt template directory.
const PROMPT_DIR_ENV: &str = "RAG_PROMPT_DIR";
/// Prefix the RAG layer adds to user questions.
const QUERY_PREFIX: &str = "Answer this question about course materials: ";

/// The static prompts used by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// System instructions shared by every model call.
    pub system: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for the directory:
    /// 1. Explicit `prompt_dir` argument
    /// 2. `RAG_PROMPT_DIR` environment variable
    /// 3. `~/.config/rag-rs/prompts/`
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var(PROMPT_DIR_ENV).ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        Self::load_from(resolved_dir.as_deref())
    }

    /// Loads prompts from exactly `dir` without consulting the environment.
    ///
    /// Missing or empty files fall back to their defaults.
    #[must_use]
    pub fn load_from(dir: Option<&Path>) -> Self {
        let system = dir
            .map(|d| d.join(SYSTEM_FILENAME))
            .and_then(|path| std::fs::read_to_string(path).ok())
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| SYSTEM_PROMPT.to_string());

        Self { system }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in templates to `dir`.
    ///
    /// Creates the directory if needed. Existing files are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        let path = dir.join(SYSTEM_FILENAME);
        if !path.exists() {
            std::fs::write(&path, SYSTEM_PROMPT)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Announces the tool-round budget to the model.
#[must_use]
pub fn round_guidance(max_rounds: usize) -> String {
    format!(
        "\nTool Round Limits: You have up to {max_rounds} opportunities to use tools in this \
         conversation. Use them strategically to gather the most relevant information."
    )
}

/// Builds the system context for one `generate` call.
///
/// The summary describes exchanges that happened before this call; it is
/// not updated with tool results gathered during the call.
#[must_use]
pub fn build_system_context(
    instructions: &str,
    max_rounds: usize,
    conversation_summary: Option<&str>,
) -> String {
    let guidance = round_guidance(max_rounds);
    match conversation_summary.filter(|s| !s.is_empty()) {
        Some(summary) => format!("{instructions}{guidance}\n\nPrevious conversation:\n{summary}"),
        None => format!("{instructions}{guidance}"),
    }
}

/// Wraps a user question for the course assistant.
#[must_use]
pub fn build_course_query(question: &str) -> String {
    format!("{QUERY_PREFIX}{question}")
}
