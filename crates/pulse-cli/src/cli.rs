//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use clap::{Parser, Subcommand};

/// Pulse - Answer business questions from product metrics
#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Keyword-driven product-analytics insight engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a question and show the synthesized insights
    Query {
        /// The question to ask, e.g. "How many users do we have?"
        question: String,
    },

    /// Run the full three-question analysis
    Analyze,

    /// Report an implementation outcome for an insight
    Outcome {
        /// Insight identifier (e.g. insight-1)
        insight_id: String,

        /// The recommendation was implemented
        #[arg(long)]
        implemented: bool,

        /// The tracked metric improved afterwards
        #[arg(long)]
        improved: bool,
    },

    /// List learned outcome patterns
    Patterns,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for MCP (Model Context Protocol) server
        ///
        /// When set, starts an MCP server for LLM tool access on the
        /// specified port. Example: --mcp-port 3001
        #[arg(long)]
        mcp_port: Option<u16>,
    },
}
