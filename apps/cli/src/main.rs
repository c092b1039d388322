//! arxivcode CLI — daily arXiv papers-with-code digest generator.
//!
//! Fetches paper metadata for the configured categories, cross-references
//! each paper against paperswithcode, and regenerates the store and digest.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
