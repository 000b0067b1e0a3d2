//! Server command implementation

use std::sync::Arc;

use anyhow::Result;

use pulse_core::sink_from_env;
use pulse_server::{AppState, ServerConfig};

pub async fn cmd_serve(host: &str, port: u16, mcp_port: Option<u16>) -> Result<()> {
    println!("🚀 Starting Pulse server...");
    println!("   Listening: http://{}:{}", host, port);
    if let Some(mcp) = mcp_port {
        println!("   MCP server: http://{}:{}/mcp", host, mcp);
    }
    if std::env::var("PULSE_TELEMETRY_URL").is_ok() {
        println!("   Telemetry: enabled (PULSE_TELEMETRY_URL)");
    } else {
        println!("   Telemetry: disabled (set PULSE_TELEMETRY_URL to enable)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    // Parse allowed CORS origins from environment (comma-separated)
    let allowed_origins: Vec<String> = std::env::var("PULSE_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let state = Arc::new(AppState::new(sink_from_env()));
    let config = ServerConfig { allowed_origins };

    // Start MCP server if port specified
    if let Some(mcp) = mcp_port {
        let mcp_state = state.clone();
        let mcp_host = host.to_string();
        tokio::spawn(async move {
            if let Err(e) = pulse_server::mcp::start_mcp_server(mcp_state, &mcp_host, mcp).await {
                eprintln!("MCP server error: {}", e);
            }
        });
    }

    pulse_server::serve(state, host, port, config).await?;

    Ok(())
}
