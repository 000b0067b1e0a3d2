//! Full-analysis handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;

use crate::{AppError, AppState};

/// POST /api/analysis - run the fixed three-question analysis
///
/// Produced insights are recorded in the store (ids assigned here) so the
/// listing endpoint and outcome reports can reference them.
pub async fn run_analysis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let analysis = state.orchestrator.run_full_analysis();
    let stored = state.store.record(analysis.insights);

    Ok(Json(serde_json::json!({
        "success": true,
        "insights": stored,
        "summary": analysis.summary,
        "metrics": analysis.metrics,
    })))
}
