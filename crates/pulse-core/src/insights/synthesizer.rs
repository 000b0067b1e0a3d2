//! Insight synthesizer - threshold rules over classified records
//!
//! Each category has at most one rule, each rule produces at most one
//! insight, and every confidence is a fixed literal. A record missing its
//! triggering field yields an empty list, never an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::catalog::Category;
use crate::classifier::QueryResult;
use crate::telemetry::{EventProperties, NoopSink, TelemetrySink};

use super::types::{FullQueryResults, Insight, InsightType};

/// Confidence literals, one per rule
const USER_GROWTH_CONFIDENCE: f64 = 0.87;
const REVENUE_GROWTH_CONFIDENCE: f64 = 0.91;
const RETENTION_DRIVER_CONFIDENCE: f64 = 0.89;
const ONBOARDING_FRICTION_CONFIDENCE: f64 = 0.92;
const FEATURE_OPPORTUNITY_CONFIDENCE: f64 = 0.85;
const PRODUCT_HEALTH_CONFIDENCE: f64 = 0.88;
const COMPETITIVE_RISK_CONFIDENCE: f64 = 0.86;

/// Tunable thresholds for the synthesizer
///
/// The query path and the full-analysis path historically used different
/// drop-off literals. Both are explicit here rather than silently unified;
/// the defaults reproduce each call path's behavior.
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    /// Growth-rate floor above which a growth insight fires
    pub growth_threshold: f64,
    /// Drop-off threshold used when answering a direct onboarding query
    pub query_drop_off_threshold: f64,
    /// Drop-off threshold used by the full-analysis path
    pub analysis_drop_off_threshold: f64,
    /// NPS below this is flagged as a health risk
    pub nps_floor: f64,
    /// Win rate below this is flagged as a competitive risk
    pub win_rate_floor: f64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            growth_threshold: 0.10,
            query_drop_off_threshold: 0.3,
            analysis_drop_off_threshold: 0.35,
            nps_floor: 50.0,
            win_rate_floor: 0.4,
        }
    }
}

/// Applies per-category threshold rules to classified records
pub struct InsightSynthesizer {
    config: SynthesizerConfig,
    telemetry: Arc<dyn TelemetrySink>,
}

impl Default for InsightSynthesizer {
    fn default() -> Self {
        Self::new(SynthesizerConfig::default())
    }
}

impl InsightSynthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        Self {
            config,
            telemetry: Arc::new(NoopSink),
        }
    }

    pub fn with_telemetry(config: SynthesizerConfig, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self { config, telemetry }
    }

    /// Synthesize insights for one classified query result
    pub fn synthesize(&self, result: &QueryResult) -> Vec<Insight> {
        let mut insights = vec![];
        let Some(record) = result.record.as_ref() else {
            return insights;
        };

        match result.category {
            Category::UserMetrics => {
                if let Some(rate) = field_f64(record, "growth_rate") {
                    if rate > self.config.growth_threshold {
                        insights.push(Insight::new(
                            InsightType::UserGrowth,
                            format!(
                                "User base is growing {:.0}% month-over-month",
                                rate * 100.0
                            ),
                            USER_GROWTH_CONFIDENCE,
                            "Double down on the current acquisition channels while growth compounds",
                            "Sustained double-digit user growth",
                        ));
                    }
                }
            }
            Category::RevenueMetrics => {
                if let Some(rate) = field_f64(record, "revenue_growth") {
                    if rate > self.config.growth_threshold {
                        insights.push(Insight::new(
                            InsightType::RevenueGrowth,
                            format!("Revenue is growing {:.0}% month-over-month", rate * 100.0),
                            REVENUE_GROWTH_CONFIDENCE,
                            "Expand pricing experiments while revenue momentum holds",
                            "Accelerated MRR growth",
                        ));
                    }
                }
            }
            Category::RetentionMetrics => {
                if let Some(insight) = retention_driver_insight(record) {
                    insights.push(insight);
                }
            }
            Category::OnboardingMetrics => {
                if let Some(rate) = field_f64(record, "drop_off_rate") {
                    if rate > self.config.query_drop_off_threshold {
                        insights.push(onboarding_friction_insight(record, rate));
                    }
                }
            }
            Category::FeatureAdoption => {
                if let Some(insight) = feature_opportunity_insight(record) {
                    insights.push(insight);
                }
            }
            Category::ProductHealth => {
                if let Some(nps) = field_f64(record, "nps_score") {
                    if nps < self.config.nps_floor {
                        insights.push(Insight::new(
                            InsightType::ProductHealthRisk,
                            format!("NPS is {nps:.0}, below the healthy 50+ range"),
                            PRODUCT_HEALTH_CONFIDENCE,
                            "Interview recent detractors and prioritize their top complaint",
                            "NPS recovery toward the healthy range",
                        ));
                    }
                }
            }
            Category::CompetitiveMetrics => {
                if let Some(win_rate) = record
                    .get("win_loss_analysis")
                    .and_then(|w| w.get("win_rate"))
                    .and_then(Value::as_f64)
                {
                    if win_rate < self.config.win_rate_floor {
                        insights.push(Insight::new(
                            InsightType::CompetitiveRisk,
                            format!(
                                "Win rate is {:.0}% - losing more competitive deals than winning",
                                win_rate * 100.0
                            ),
                            COMPETITIVE_RISK_CONFIDENCE,
                            "Arm sales with battlecards for the top loss reason",
                            "Win rate back above 40%",
                        ));
                    }
                }
            }
            _ => {}
        }

        self.emit_synthesized(insights.len(), "query");
        insights
    }

    /// Synthesize insights for the full-analysis path
    ///
    /// Rule order is fixed: retention, then adoption, then onboarding. The
    /// onboarding rule here fires whenever the biggest-drop field exists,
    /// independent of the analysis drop-off threshold.
    pub fn synthesize_all(&self, results: &FullQueryResults) -> Vec<Insight> {
        let mut insights = vec![];

        if let Some(record) = results.retention_drivers.record.as_ref() {
            if let Some(insight) = retention_driver_insight(record) {
                insights.push(insight);
            }
        }

        if let Some(record) = results.feature_adoption.record.as_ref() {
            if let Some(insight) = feature_opportunity_insight(record) {
                insights.push(insight);
            }
        }

        if let Some(record) = results.onboarding_dropoff.record.as_ref() {
            if record.get("biggest_drop").is_some() {
                let rate = field_f64(record, "drop_off_rate").unwrap_or(0.0);
                insights.push(onboarding_friction_insight(record, rate));
            }
        }

        self.emit_synthesized(insights.len(), "full_analysis");
        insights
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    fn emit_synthesized(&self, count: usize, path: &str) {
        debug!(count, path, "Insights synthesized");
        self.telemetry.emit(
            "insights_synthesized",
            EventProperties::new()
                .with("count", count)
                .with("path", path),
        );
    }
}

fn field_f64(record: &Value, field: &str) -> Option<f64> {
    record.get(field).and_then(Value::as_f64)
}

fn field_str<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Retention rule: fires when a non-empty top action is present
fn retention_driver_insight(record: &Value) -> Option<Insight> {
    let top_action = field_str(record, "top_action")?;
    let lift = field_f64(record, "retention_lift").unwrap_or(0.0);
    Some(Insight::new(
        InsightType::RetentionDriver,
        format!("Users who {top_action} retain {lift:.1}x better at day 30"),
        RETENTION_DRIVER_CONFIDENCE,
        format!("Push every new user toward \"{top_action}\" in their first session"),
        "Higher 30-day retention",
    ))
}

/// Adoption rule: fires when an underused feature is present
fn feature_opportunity_insight(record: &Value) -> Option<Insight> {
    let underused = record.get("underused")?;
    let name = underused
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("a feature");
    let adoption = underused
        .get("adoption")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    Some(Insight::new(
        InsightType::FeatureOpportunity,
        format!(
            "{name} has high potential but only {:.0}% adoption",
            adoption * 100.0
        ),
        FEATURE_OPPORTUNITY_CONFIDENCE,
        format!("Surface {name} in onboarding and lifecycle emails"),
        "Adoption lift for an underused feature",
    ))
}

fn onboarding_friction_insight(record: &Value, rate: f64) -> Insight {
    let step = record
        .get("biggest_drop")
        .and_then(|b| b.get("step"))
        .and_then(Value::as_str)
        .unwrap_or("an onboarding step");
    Insight::new(
        InsightType::OnboardingFriction,
        format!(
            "{:.0}% of users drop out of onboarding, most at \"{step}\"",
            rate * 100.0
        ),
        ONBOARDING_FRICTION_CONFIDENCE,
        format!("Simplify or defer the \"{step}\" step"),
        "Higher onboarding completion",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataCatalog;
    use crate::classifier::QueryClassifier;
    use serde_json::json;

    fn result_for(category: Category, record: Value) -> QueryResult {
        QueryResult {
            category,
            record: Some(record),
            matched_via_search: false,
            help: None,
        }
    }

    #[test]
    fn test_user_growth_fires_above_threshold() {
        let synthesizer = InsightSynthesizer::default();
        let result = result_for(Category::UserMetrics, json!({"growth_rate": 0.15}));

        let insights = synthesizer.synthesize(&result);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].insight_type, InsightType::UserGrowth);
        assert_eq!(insights[0].confidence, 0.87);
        assert!(insights[0].discovery.contains("15%"));
        assert!(!insights[0].recommendation.is_empty());
    }

    #[test]
    fn test_user_growth_silent_below_threshold() {
        let synthesizer = InsightSynthesizer::default();
        let result = result_for(Category::UserMetrics, json!({"growth_rate": 0.05}));
        assert!(synthesizer.synthesize(&result).is_empty());
    }

    #[test]
    fn test_revenue_growth_confidence() {
        let synthesizer = InsightSynthesizer::default();
        let result = result_for(Category::RevenueMetrics, json!({"revenue_growth": 0.15}));

        let insights = synthesizer.synthesize(&result);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].confidence, 0.91);
    }

    #[test]
    fn test_retention_requires_top_action() {
        let synthesizer = InsightSynthesizer::default();

        let with_action = result_for(
            Category::RetentionMetrics,
            json!({"top_action": "created_first_report", "retention_lift": 2.4}),
        );
        let insights = synthesizer.synthesize(&with_action);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].confidence, 0.89);
        assert!(insights[0].discovery.contains("created_first_report"));
        assert!(insights[0].discovery.contains("2.4"));

        let empty_action = result_for(Category::RetentionMetrics, json!({"top_action": ""}));
        assert!(synthesizer.synthesize(&empty_action).is_empty());

        let no_action = result_for(Category::RetentionMetrics, json!({"day_30": 0.31}));
        assert!(synthesizer.synthesize(&no_action).is_empty());
    }

    #[test]
    fn test_onboarding_query_threshold_is_point_three() {
        let synthesizer = InsightSynthesizer::default();

        // 0.32 is above the query threshold (0.3) but below the analysis
        // threshold (0.35) - the query path must still fire
        let result = result_for(Category::OnboardingMetrics, json!({"drop_off_rate": 0.32}));
        let insights = synthesizer.synthesize(&result);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].confidence, 0.92);

        let result = result_for(Category::OnboardingMetrics, json!({"drop_off_rate": 0.25}));
        assert!(synthesizer.synthesize(&result).is_empty());
    }

    #[test]
    fn test_feature_adoption_requires_underused() {
        let synthesizer = InsightSynthesizer::default();

        let result = result_for(
            Category::FeatureAdoption,
            json!({"underused": {"name": "api_access", "adoption": 0.08}}),
        );
        let insights = synthesizer.synthesize(&result);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].confidence, 0.85);
        assert!(insights[0].discovery.contains("api_access"));

        let result = result_for(Category::FeatureAdoption, json!({"top_features": []}));
        assert!(synthesizer.synthesize(&result).is_empty());
    }

    #[test]
    fn test_product_health_nps_floor() {
        let synthesizer = InsightSynthesizer::default();

        let result = result_for(Category::ProductHealth, json!({"nps_score": 44}));
        let insights = synthesizer.synthesize(&result);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].confidence, 0.88);

        let result = result_for(Category::ProductHealth, json!({"nps_score": 62}));
        assert!(synthesizer.synthesize(&result).is_empty());
    }

    #[test]
    fn test_competitive_win_rate_floor() {
        let synthesizer = InsightSynthesizer::default();

        let result = result_for(
            Category::CompetitiveMetrics,
            json!({"win_loss_analysis": {"win_rate": 0.38}}),
        );
        let insights = synthesizer.synthesize(&result);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].confidence, 0.86);

        let result = result_for(
            Category::CompetitiveMetrics,
            json!({"win_loss_analysis": {"win_rate": 0.55}}),
        );
        assert!(synthesizer.synthesize(&result).is_empty());
    }

    #[test]
    fn test_unruled_categories_yield_nothing() {
        let synthesizer = InsightSynthesizer::default();
        let result = result_for(Category::SupportMetrics, json!({"open_tickets": 47}));
        assert!(synthesizer.synthesize(&result).is_empty());
    }

    #[test]
    fn test_sentinel_yields_nothing() {
        let synthesizer = InsightSynthesizer::default();
        let classifier = QueryClassifier::new(std::sync::Arc::new(DataCatalog::new()));
        let result = classifier.classify("xyzzy plugh");
        assert!(synthesizer.synthesize(&result).is_empty());
    }

    #[test]
    fn test_synthesize_all_order_and_gating() {
        let synthesizer = InsightSynthesizer::default();
        let classifier = QueryClassifier::new(std::sync::Arc::new(DataCatalog::new()));

        let results = FullQueryResults {
            feature_adoption: classifier.classify("Which features have the highest adoption in first week?"),
            retention_drivers: classifier.classify("What actions correlate with 30-day retention?"),
            onboarding_dropoff: classifier.classify("Where do users drop off in the onboarding flow?"),
        };

        let insights = synthesizer.synthesize_all(&results);
        assert_eq!(insights.len(), 3);
        // Fixed rule order: retention, adoption, onboarding
        assert_eq!(insights[0].insight_type, InsightType::RetentionDriver);
        assert_eq!(insights[0].confidence, 0.89);
        assert_eq!(insights[1].insight_type, InsightType::FeatureOpportunity);
        assert_eq!(insights[1].confidence, 0.85);
        assert_eq!(insights[2].insight_type, InsightType::OnboardingFriction);
        assert_eq!(insights[2].confidence, 0.92);
    }

    #[test]
    fn test_synthesize_all_onboarding_fires_on_presence_alone() {
        let synthesizer = InsightSynthesizer::default();
        // Drop-off below both thresholds, but biggest_drop exists - the
        // full-analysis rule fires on presence
        let results = FullQueryResults {
            feature_adoption: result_for(Category::FeatureAdoption, json!({})),
            retention_drivers: result_for(Category::RetentionMetrics, json!({})),
            onboarding_dropoff: result_for(
                Category::OnboardingMetrics,
                json!({"drop_off_rate": 0.1, "biggest_drop": {"step": "verify_email"}}),
            ),
        };

        let insights = synthesizer.synthesize_all(&results);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].insight_type, InsightType::OnboardingFriction);
    }

    #[test]
    fn test_synthesize_all_empty_when_fields_absent() {
        let synthesizer = InsightSynthesizer::default();
        let results = FullQueryResults {
            feature_adoption: result_for(Category::FeatureAdoption, json!({"top_features": []})),
            retention_drivers: result_for(Category::RetentionMetrics, json!({"day_30": 0.31})),
            onboarding_dropoff: result_for(
                Category::OnboardingMetrics,
                json!({"drop_off_rate": 0.45}),
            ),
        };
        assert!(synthesizer.synthesize_all(&results).is_empty());
    }
}
