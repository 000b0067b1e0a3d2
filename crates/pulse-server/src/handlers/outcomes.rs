//! Outcome-reporting handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;

use crate::{AppError, AppState};

/// POST /api/outcomes - report an implementation outcome for an insight
///
/// Requires `insight_id` (string), `implemented` (bool), `improved` (bool).
/// Field-level validation happens here; the core tracker only ever sees
/// typed values.
pub async fn post_outcome(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let insight_id = match body.get("insight_id") {
        None => return Err(AppError::bad_request("Missing required field: insight_id")),
        Some(Value::String(id)) => id.clone(),
        Some(_) => return Err(AppError::bad_request("Field 'insight_id' must be a string")),
    };
    let implemented = require_bool(&body, "implemented")?;
    let improved = require_bool(&body, "improved")?;

    let confidence = state
        .tracker
        .report_outcome(&insight_id, implemented, improved);

    Ok(Json(serde_json::json!({
        "success": true,
        "insight_id": insight_id,
        "confidence": confidence,
    })))
}

fn require_bool(body: &Value, field: &str) -> Result<bool, AppError> {
    match body.get(field) {
        None => Err(AppError::bad_request(&format!(
            "Missing required field: {field}"
        ))),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(AppError::bad_request(&format!(
            "Field '{field}' must be a boolean"
        ))),
    }
}
