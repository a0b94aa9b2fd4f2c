//! CLI layer for rag-rs.
//!
//! Provides the command-line interface using clap, with commands for
//! asking questions and inspecting the course catalog.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
