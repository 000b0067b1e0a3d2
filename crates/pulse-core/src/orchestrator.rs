//! Analysis orchestrator - the fixed three-question full analysis
//!
//! Issues three canned questions through the normal classification path (no
//! shortcut around the classifier), merges the synthesized insights, and
//! derives an executive summary plus three aggregate health metrics.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::debug;

use crate::classifier::QueryClassifier;
use crate::insights::{
    ExecutiveSummary, FullAnalysis, FullQueryResults, HealthMetrics, Insight, InsightSynthesizer,
};

const ADOPTION_QUESTION: &str = "Which features have the highest adoption in first week?";
const RETENTION_QUESTION: &str = "What actions correlate with 30-day retention?";
const ONBOARDING_QUESTION: &str = "Where do users drop off in the onboarding flow?";

pub struct AnalysisOrchestrator {
    classifier: QueryClassifier,
    synthesizer: InsightSynthesizer,
}

impl AnalysisOrchestrator {
    pub fn new(classifier: QueryClassifier, synthesizer: InsightSynthesizer) -> Self {
        Self {
            classifier,
            synthesizer,
        }
    }

    /// Run the full three-question analysis
    pub fn run_full_analysis(&self) -> FullAnalysis {
        let results = FullQueryResults {
            feature_adoption: self.classifier.classify(ADOPTION_QUESTION),
            retention_drivers: self.classifier.classify(RETENTION_QUESTION),
            onboarding_dropoff: self.classifier.classify(ONBOARDING_QUESTION),
        };

        let insights = self.synthesizer.synthesize_all(&results);
        debug!(count = insights.len(), "Full analysis synthesized");

        let summary = summarize(&insights);
        let metrics = health_metrics(&results);

        FullAnalysis {
            insights,
            summary,
            metrics,
        }
    }
}

/// Build the executive summary from the merged insight list
///
/// The top pick sorts descending by confidence with original order preserved
/// among equal values, so the first-encountered insight wins ties. An empty
/// list short-circuits to a defined zero case instead of dividing by zero.
fn summarize(insights: &[Insight]) -> ExecutiveSummary {
    if insights.is_empty() {
        return ExecutiveSummary {
            total_insights: 0,
            average_confidence: "0%".to_string(),
            top_recommendation: None,
            critical_action: None,
            message: Some("no insights".to_string()),
        };
    }

    let average =
        insights.iter().map(|i| i.confidence).sum::<f64>() / insights.len() as f64;

    let mut ranked: Vec<&Insight> = insights.iter().collect();
    // Stable sort: equal confidences keep their relative order
    ranked.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    let top = ranked[0].recommendation.clone();

    ExecutiveSummary {
        total_insights: insights.len(),
        average_confidence: format!("{:.0}%", average * 100.0),
        top_recommendation: Some(top.clone()),
        critical_action: Some(top),
        message: None,
    }
}

/// Compute the three aggregate health metrics from the analysis records
fn health_metrics(results: &FullQueryResults) -> HealthMetrics {
    let adoption_health = results
        .feature_adoption
        .record
        .as_ref()
        .and_then(|r| r.get("top_features"))
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);

    let retention_strength = results
        .retention_drivers
        .record
        .as_ref()
        .and_then(|r| r.get("correlation_strength"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    // Missing drop-off is treated as zero drop-off
    let drop_off = results
        .onboarding_dropoff
        .record
        .as_ref()
        .and_then(|r| r.get("drop_off_rate"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    HealthMetrics {
        adoption_health,
        retention_strength,
        onboarding_efficiency: 1.0 - drop_off,
    }
}
