//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

// Allow certain patterns that improve readability in CLI output formatting
#![allow(clippy::format_push_string)]

use std::path::Path;
use std::sync::Arc;

use crate::agent::config::AgentConfig;
use crate::agent::prompt::PromptSet;
use crate::cli::output::{OutputFormat, format_analytics, format_answer, format_course};
use crate::cli::parser::{Cli, Commands};
use crate::error::{CommandError, Result};
use crate::rag::{CourseAnalytics, RagSystem};
use crate::retrieval::{CourseStore, MemoryCourseStore};

/// Parameters for the ask command.
#[derive(Debug, Clone, Default)]
pub struct AskParams<'a> {
    /// The question.
    pub query: &'a str,
    /// Maximum tool-calling rounds.
    pub max_rounds: Option<usize>,
    /// Model identifier.
    pub model: Option<&'a str>,
    /// Directory holding `system.md`.
    pub prompt_dir: Option<&'a Path>,
    /// Answer without tools.
    pub no_tools: bool,
}

/// Executes the parsed CLI command and returns its output.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let catalog = cli.get_catalog_path();

    match &cli.command {
        Commands::Ask {
            query,
            max_rounds,
            model,
            prompt_dir,
            no_tools,
        } => {
            let params = AskParams {
                query,
                max_rounds: *max_rounds,
                model: model.as_deref(),
                prompt_dir: prompt_dir.as_deref(),
                no_tools: *no_tools,
            };
            cmd_ask(&catalog, &params, format)
        }
        Commands::Courses => cmd_courses(&catalog, format),
        Commands::Outline { course } => cmd_outline(&catalog, course, format),
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

fn open_store(catalog: &Path) -> Result<MemoryCourseStore> {
    Ok(MemoryCourseStore::from_path(catalog)?)
}

fn cmd_ask(catalog: &Path, params: &AskParams<'_>, format: OutputFormat) -> Result<String> {
    // Build agent configuration from env + CLI overrides
    let mut builder = AgentConfig::builder().from_env();
    if let Some(rounds) = params.max_rounds {
        builder = builder.max_rounds(rounds);
    }
    if let Some(model) = params.model {
        builder = builder.model(model);
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }

    let config = builder.build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}"))
    })?;

    let store = open_store(catalog)?.with_max_results(config.max_results);
    let mut rag = RagSystem::from_config(config, Arc::new(store)).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;
    if params.no_tools {
        rag = rag.without_tools();
    }

    // Create tokio runtime as sync/async bridge
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;

    let answer = rt
        .block_on(rag.query(params.query, None))
        .map_err(|e| CommandError::ExecutionFailed(format!("Query failed: {e}")))?;

    match format {
        OutputFormat::Text => Ok(format_answer(&answer)),
        OutputFormat::Json => Ok(format.to_json(&answer)?),
    }
}

fn cmd_courses(catalog: &Path, format: OutputFormat) -> Result<String> {
    let store = open_store(catalog)?;
    let course_titles = store.course_titles();
    let analytics = CourseAnalytics {
        total_courses: course_titles.len(),
        course_titles,
    };

    match format {
        OutputFormat::Text => Ok(format_analytics(&analytics)),
        OutputFormat::Json => Ok(format.to_json(&analytics)?),
    }
}

fn cmd_outline(catalog: &Path, course: &str, format: OutputFormat) -> Result<String> {
    let store = open_store(catalog)?;
    let course = store.course(course)?;

    match format {
        OutputFormat::Text => Ok(format_course(course)),
        OutputFormat::Json => Ok(format.to_json(course)?),
    }
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(Path::to_path_buf)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ))
            } else {
                let mut output = format!(
                    "Wrote {} prompt template(s) to: {}\n",
                    written.len(),
                    target_dir.display()
                );
                for path in &written {
                    output.push_str(&format!(
                        "  {}\n",
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown")
                    ));
                }
                output.push_str("\nEdit these files to customize the assistant's instructions.\n");
                Ok(output)
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json)?)
        }
    }
}
