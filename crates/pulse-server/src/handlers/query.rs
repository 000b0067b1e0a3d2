//! Question-answering handler

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::Value;

use crate::{AppError, AppState};

/// POST /api/query - classify a question and synthesize insights
///
/// Accepts a raw JSON body so missing or mistyped fields produce a
/// descriptive 400 instead of a generic deserialization rejection.
pub async fn post_query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let question = match body.get("question") {
        None => return Err(AppError::bad_request("Missing required field: question")),
        Some(Value::String(q)) => q.clone(),
        Some(_) => return Err(AppError::bad_request("Field 'question' must be a string")),
    };

    let result = state.classifier.classify(&question);
    let insights = state.synthesizer.synthesize(&result);
    let result_type = result.category.as_str();
    let insights_count = insights.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "question": question,
        "data": &result,
        "insights": &insights,
        "metadata": {
            "result_type": result_type,
            "insights_count": insights_count,
            "timestamp": Utc::now().to_rfc3339(),
        }
    })))
}
