//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default course catalog file in the current directory.
pub const DEFAULT_CATALOG: &str = "courses.json";

/// rag-rs: tool-assisted question answering over course materials.
///
/// Answers questions by letting a chat model search a course catalog
/// over a bounded number of tool rounds.
#[derive(Parser, Debug)]
#[command(name = "rag-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the JSON course catalog.
    ///
    /// Defaults to `courses.json` in the current directory.
    #[arg(short, long, env = "RAG_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the catalog path, falling back to [`DEFAULT_CATALOG`].
    #[must_use]
    pub fn get_catalog_path(&self) -> PathBuf {
        self.catalog
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG))
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question about the course catalog.
    ///
    /// Requires `RAG_API_KEY` or `OPENAI_API_KEY`.
    #[command(after_help = r#"Examples:
  rag-rs ask "What does lesson 4 of the MCP course cover?"
  rag-rs ask "Compare the intro lessons" --max-rounds 3
  rag-rs ask "What is 2+2?" --no-tools
  rag-rs --format json ask "Who teaches MCP?" | jq '.sources'
"#)]
    Ask {
        /// The question.
        query: String,

        /// Maximum tool-calling rounds.
        #[arg(long)]
        max_rounds: Option<usize>,

        /// Model identifier.
        #[arg(short, long)]
        model: Option<String>,

        /// Directory holding `system.md`.
        #[arg(long)]
        prompt_dir: Option<PathBuf>,

        /// Answer without offering tools to the model.
        #[arg(long)]
        no_tools: bool,
    },

    /// List the courses in the catalog.
    Courses,

    /// Show one course outline.
    #[command(after_help = r#"Examples:
  rag-rs outline MCP
  rag-rs --format json outline "computer use"
"#)]
    Outline {
        /// Course title or part of it.
        course: String,
    },

    /// Write the default system prompt for customization.
    ///
    /// Existing files are left untouched.
    InitPrompts {
        /// Target directory (default: ~/.config/rag-rs/prompts).
        dir: Option<PathBuf>,
    },
}
