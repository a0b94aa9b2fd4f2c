//! rag-rs command-line entry point.

use clap::Parser;
use rag_rs::cli::{Cli, execute};
use tracing_subscriber::EnvFilter;

#[allow(clippy::print_stdout)]
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise warn, or the loop trace with --verbose
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if cli.verbose {
                "info,rag_rs=debug"
            } else {
                "warn"
            })
        }))
        .with_writer(std::io::stderr)
        .init();

    let output = execute(&cli)?;
    print!("{output}");
    Ok(())
}
