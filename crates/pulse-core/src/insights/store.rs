//! In-memory insight store
//!
//! Holds insights produced by full-analysis runs for the listing endpoints.
//! Ids are assigned here, at the transport boundary, not by the synthesizer.
//! Nothing is persisted beyond process memory.

use std::sync::Mutex;

use serde::Deserialize;

use super::types::{Insight, InsightType};

/// Optional filters for listing stored insights
#[derive(Debug, Default, Clone, Deserialize)]
pub struct InsightFilter {
    pub min_confidence: Option<f64>,
    pub insight_type: Option<InsightType>,
}

struct StoreInner {
    next_id: u64,
    insights: Vec<Insight>,
}

/// Process-lifetime store of synthesized insights
pub struct InsightStore {
    inner: Mutex<StoreInner>,
}

impl InsightStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                next_id: 1,
                insights: vec![],
            }),
        }
    }

    /// Store insights, assigning sequential ids, and return them with ids set
    pub fn record(&self, insights: Vec<Insight>) -> Vec<Insight> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut stored = Vec::with_capacity(insights.len());
        for mut insight in insights {
            insight.id = Some(format!("insight-{}", inner.next_id));
            inner.next_id += 1;
            inner.insights.push(insight.clone());
            stored.push(insight);
        }
        stored
    }

    /// List stored insights matching the filter, in insertion order
    pub fn list(&self, filter: &InsightFilter) -> Vec<Insight> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .insights
            .iter()
            .filter(|i| {
                filter
                    .min_confidence
                    .map_or(true, |min| i.confidence >= min)
            })
            .filter(|i| {
                filter
                    .insight_type
                    .map_or(true, |t| i.insight_type == t)
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insights
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InsightStore {
    fn default() -> Self {
        Self::new()
    }
}
