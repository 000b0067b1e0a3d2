//! Pulse Web Server
//!
//! Axum-based REST API for the Pulse product-analytics engine.
//!
//! Design notes:
//! - Restrictive CORS policy and standard security headers
//! - Input validation at the transport boundary with descriptive errors
//!   (the core itself never validates - it operates on typed values)
//! - Sanitized error responses; full errors go to the log only

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use pulse_core::{
    AnalysisOrchestrator, DataCatalog, InsightStore, InsightSynthesizer, OutcomeTracker,
    QueryClassifier, SynthesizerConfig, TelemetrySink,
};

mod handlers;
pub mod mcp;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
///
/// The catalog is read-only; the tracker and the insight store are the only
/// mutable pieces and guard their own state internally, so handlers never
/// need additional locking.
pub struct AppState {
    pub classifier: QueryClassifier,
    pub synthesizer: InsightSynthesizer,
    pub tracker: OutcomeTracker,
    pub orchestrator: AnalysisOrchestrator,
    pub store: InsightStore,
}

impl AppState {
    /// Wire up the core components around one catalog and telemetry sink
    pub fn new(telemetry: Arc<dyn TelemetrySink>) -> Self {
        let catalog = Arc::new(DataCatalog::new());
        let config = SynthesizerConfig::default();

        // The orchestrator routes through the same classification path as
        // any other query, so it gets its own classifier over the shared
        // catalog
        let orchestrator = AnalysisOrchestrator::new(
            QueryClassifier::with_telemetry(catalog.clone(), telemetry.clone()),
            InsightSynthesizer::with_telemetry(config.clone(), telemetry.clone()),
        );

        Self {
            classifier: QueryClassifier::with_telemetry(catalog, telemetry.clone()),
            synthesizer: InsightSynthesizer::with_telemetry(config, telemetry.clone()),
            tracker: OutcomeTracker::with_telemetry(telemetry),
            orchestrator,
            store: InsightStore::new(),
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, config: ServerConfig) -> Router {
    let api_routes = Router::new()
        // Question answering
        .route("/query", post(handlers::post_query))
        // Outcome reporting
        .route("/outcomes", post(handlers::post_outcome))
        // Full analysis
        .route("/analysis", post(handlers::run_analysis))
        // Stored insights and learned patterns
        .route("/insights", get(handlers::list_insights))
        .route("/patterns", get(handlers::list_patterns));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Fixed JSON shape for unmatched routes, listing the available endpoints
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "available_endpoints": [
                "POST /api/query",
                "POST /api/outcomes",
                "POST /api/analysis",
                "GET /api/insights",
                "GET /api/patterns",
            ]
        })),
    )
}

/// Start the REST server
pub async fn serve(
    state: Arc<AppState>,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let app = create_router(state, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
