//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Query, analysis, outcome, and pattern commands
//! - `serve` - Web + MCP server command

pub mod core;
pub mod serve;

// Re-export command functions for main.rs
pub use core::*;
pub use serve::*;
