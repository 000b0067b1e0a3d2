//! Stored-insight and pattern listing handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use pulse_core::{Insight, InsightFilter, InsightType, Pattern};

/// Query parameters for listing insights
#[derive(Debug, Default, Deserialize)]
pub struct InsightQuery {
    /// Keep only insights at or above this confidence
    pub min_confidence: Option<f64>,
    /// Filter by insight type (e.g. "retention_driver")
    pub insight_type: Option<String>,
}

/// GET /api/insights - list stored insights with optional filters
pub async fn list_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InsightQuery>,
) -> Result<Json<Vec<Insight>>, AppError> {
    let insight_type = params
        .insight_type
        .as_deref()
        .map(|s| {
            s.parse::<InsightType>()
                .map_err(|e| AppError::bad_request(&e.to_string()))
        })
        .transpose()?;

    let filter = InsightFilter {
        min_confidence: params.min_confidence,
        insight_type,
    };

    Ok(Json(state.store.list(&filter)))
}

/// One tracked pattern with its derived confidence
#[derive(Debug, Serialize)]
pub struct PatternEntry {
    pub insight_id: String,
    #[serde(flatten)]
    pub pattern: Pattern,
    pub confidence: f64,
}

/// GET /api/patterns - outcome counters and learned confidence per insight id
pub async fn list_patterns(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PatternEntry>>, AppError> {
    let entries = state
        .tracker
        .patterns()
        .into_iter()
        .map(|(insight_id, pattern)| PatternEntry {
            insight_id,
            confidence: pattern.confidence(),
            pattern,
        })
        .collect();

    Ok(Json(entries))
}
