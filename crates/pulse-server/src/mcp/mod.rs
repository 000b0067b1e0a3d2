//! MCP (Model Context Protocol) Server for Pulse
//!
//! Exposes the Pulse analysis engine to LLMs via MCP tools, mirroring the
//! REST bodies. Core errors surface as protocol-level internal errors
//! carrying the original message.
//!
//! # Architecture
//!
//! The MCP server runs on a separate port from the main REST API,
//! using HTTP/SSE (Streamable HTTP) transport for local network access.
//!
//! # Example
//!
//! ```bash
//! # Start Pulse with MCP enabled
//! pulse serve --port 3000 --mcp-port 3001
//! ```
//!
//! # Available Tools
//!
//! - `analyze_behavior` - Run the full three-question analysis
//! - `query_data` - Classify a free-text question and synthesize insights
//! - `track_outcome` - Report an implementation outcome for an insight
//! - `get_insights` - List stored insights with optional filters
//! - `get_metrics` - Aggregate product health metrics

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use pulse_core::{InsightFilter, InsightType};

/// Arguments for the query_data tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryDataParams {
    #[schemars(description = "Free-text business question to classify and answer")]
    pub question: String,
}

/// Arguments for the track_outcome tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TrackOutcomeParams {
    #[schemars(description = "Identifier of the insight the outcome applies to")]
    pub insight_id: String,
    #[schemars(description = "Whether the recommendation was implemented")]
    pub implemented: bool,
    #[schemars(description = "Whether the tracked metric improved after implementation")]
    pub improved: bool,
}

/// Arguments for the get_insights tool
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct GetInsightsParams {
    #[schemars(description = "Keep only insights at or above this confidence (0.0-1.0)")]
    pub min_confidence: Option<f64>,
    #[schemars(
        description = "Filter by insight type: user_growth, revenue_growth, retention_driver, onboarding_friction, feature_opportunity, product_health_risk, competitive_risk"
    )]
    pub insight_type: Option<String>,
}

/// Pulse MCP Server state
#[derive(Clone)]
pub struct PulseMcpServer {
    /// Shared application state (same components as the REST API)
    state: Arc<AppState>,
    /// Tool router for MCP operations
    tool_router: ToolRouter<Self>,
}

impl PulseMcpServer {
    /// Create a new MCP server over the shared application state
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    fn json_result(value: &impl serde::Serialize) -> Result<CallToolResult, McpError> {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }
}

#[tool_handler]
impl ServerHandler for PulseMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "pulse".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Pulse Product Analytics".to_string()),
                website_url: Some("https://github.com/pulse-analytics/pulse".to_string()),
                icons: None,
            },
            instructions: Some(
                "Pulse answers natural-language business questions from product metrics. \
                 Use query_data for ad-hoc questions, analyze_behavior for the full \
                 analysis, track_outcome to report what happened after implementing a \
                 recommendation, and get_insights/get_metrics to review results."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl PulseMcpServer {
    /// Run the full behavioral analysis
    #[tool(
        description = "Run the full three-question analysis. Returns insights, an executive summary, and aggregate health metrics."
    )]
    async fn analyze_behavior(&self) -> Result<CallToolResult, McpError> {
        let analysis = self.state.orchestrator.run_full_analysis();
        let stored = self.state.store.record(analysis.insights);
        Self::json_result(&serde_json::json!({
            "insights": stored,
            "summary": analysis.summary,
            "metrics": analysis.metrics,
        }))
    }

    /// Answer a free-text business question
    #[tool(
        description = "Classify a natural-language business question against the metrics catalog and synthesize insights from the matched record."
    )]
    async fn query_data(
        &self,
        Parameters(params): Parameters<QueryDataParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.state.classifier.classify(&params.question);
        let insights = self.state.synthesizer.synthesize(&result);
        Self::json_result(&serde_json::json!({
            "data": result,
            "insights": insights,
        }))
    }

    /// Report an implementation outcome
    #[tool(
        description = "Report whether an insight's recommendation was implemented and whether it improved the metric. Returns the updated learned confidence."
    )]
    async fn track_outcome(
        &self,
        Parameters(params): Parameters<TrackOutcomeParams>,
    ) -> Result<CallToolResult, McpError> {
        let confidence = self.state.tracker.report_outcome(
            &params.insight_id,
            params.implemented,
            params.improved,
        );
        Self::json_result(&serde_json::json!({
            "insight_id": params.insight_id,
            "confidence": confidence,
        }))
    }

    /// List stored insights
    #[tool(
        description = "List insights produced by previous analysis runs, optionally filtered by minimum confidence and insight type."
    )]
    async fn get_insights(
        &self,
        Parameters(params): Parameters<GetInsightsParams>,
    ) -> Result<CallToolResult, McpError> {
        let insight_type = match params.insight_type.as_deref() {
            Some(s) => Some(
                s.parse::<InsightType>()
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?,
            ),
            None => None,
        };
        let filter = InsightFilter {
            min_confidence: params.min_confidence,
            insight_type,
        };
        Self::json_result(&self.state.store.list(&filter))
    }

    /// Get aggregate health metrics
    #[tool(
        description = "Get the aggregate product health metrics: adoption health, retention strength, and onboarding efficiency."
    )]
    async fn get_metrics(&self) -> Result<CallToolResult, McpError> {
        let analysis = self.state.orchestrator.run_full_analysis();
        Self::json_result(&analysis.metrics)
    }
}

/// Start the MCP server on the given port
pub async fn start_mcp_server(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
    use rmcp::transport::streamable_http_server::StreamableHttpService;

    info!("Starting MCP server at http://{}:{}/mcp", host, port);

    let service = StreamableHttpService::new(
        move || Ok(PulseMcpServer::new(state.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("MCP server ready at http://{}/mcp", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            // Wait for shutdown signal
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
