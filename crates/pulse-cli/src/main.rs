//! Pulse CLI - product-analytics question answering
//!
//! Usage:
//!   pulse query "How many users do we have?"   Ask a question
//!   pulse analyze                              Run the full analysis
//!   pulse outcome insight-1 --implemented      Report an outcome
//!   pulse serve --port 3000                    Start the web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Query { question } => commands::cmd_query(&question, cli.json),
        Commands::Analyze => commands::cmd_analyze(cli.json),
        Commands::Outcome {
            insight_id,
            implemented,
            improved,
        } => commands::cmd_outcome(&insight_id, implemented, improved, cli.json),
        Commands::Patterns => commands::cmd_patterns(cli.json),
        Commands::Serve {
            port,
            host,
            mcp_port,
        } => commands::cmd_serve(&host, port, mcp_port).await,
    }
}
