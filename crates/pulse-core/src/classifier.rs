//! Query classifier - maps free-text questions to metric categories
//!
//! Classification is a pure function of the question text and the static
//! catalog: an ordered keyword-rule pass, then a catalog-wide token search,
//! then the `general_response` sentinel. Every input resolves to some
//! result; there is no error path.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::catalog::{Category, DataCatalog};
use crate::telemetry::{EventProperties, NoopSink, TelemetrySink};

/// How a keyword rule fires
enum Trigger {
    /// Fires if the question contains any of these substrings
    Any(&'static [&'static str]),
    /// Fires only if the question contains all of these substrings
    All(&'static [&'static str]),
}

/// Keyword rules in priority order - the first firing rule wins
const RULES: &[(Category, Trigger)] = &[
    (
        Category::UserMetrics,
        Trigger::Any(&["how many users", "user count", "total users"]),
    ),
    (
        Category::RevenueMetrics,
        Trigger::Any(&["revenue", "mrr", "money", "income"]),
    ),
    (
        Category::EngagementMetrics,
        Trigger::Any(&["engagement", "active", "usage"]),
    ),
    (
        Category::GrowthMetrics,
        Trigger::Any(&["growth", "growing", "trend"]),
    ),
    (
        Category::FeatureAdoption,
        Trigger::All(&["features", "adoption"]),
    ),
    (
        Category::RetentionMetrics,
        Trigger::Any(&["retention", "stay", "return"]),
    ),
    (
        Category::OnboardingMetrics,
        Trigger::Any(&["drop", "abandon", "onboarding", "leave"]),
    ),
    (
        Category::SupportMetrics,
        Trigger::Any(&["support", "help", "tickets", "issues"]),
    ),
    (
        Category::ConversionMetrics,
        Trigger::Any(&["convert", "upgrade", "paid", "trial"]),
    ),
    (
        Category::PerformanceMetrics,
        Trigger::Any(&["performance", "speed", "slow", "load"]),
    ),
    (
        Category::CompetitiveMetrics,
        Trigger::Any(&["competitor", "market", "competitive"]),
    ),
    (
        Category::ProductHealth,
        Trigger::Any(&["health", "nps", "satisfaction"]),
    ),
];

/// Static help payload returned for unmatched questions
#[derive(Debug, Clone, Serialize)]
pub struct HelpResponse {
    pub message: String,
    pub suggestions: Vec<String>,
}

impl HelpResponse {
    fn new() -> Self {
        Self {
            message: "I couldn't match that question to a metric. Try one of these:"
                .to_string(),
            suggestions: vec![
                "How many users do we have?".to_string(),
                "What is our revenue growth?".to_string(),
                "How engaged are our users?".to_string(),
                "Which features have the highest adoption?".to_string(),
                "What drives 30-day retention?".to_string(),
                "Where do users drop off in onboarding?".to_string(),
                "How fast are support tickets resolved?".to_string(),
                "What is our NPS score?".to_string(),
            ],
        }
    }
}

/// The outcome of classifying one question
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub category: Category,
    /// The matched catalog record, absent only for the sentinel
    pub record: Option<Value>,
    /// True when the category came from the catalog-wide fallback search
    pub matched_via_search: bool,
    /// Present only for the `general_response` sentinel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<HelpResponse>,
}

/// Keyword-rule engine mapping question text to a category
pub struct QueryClassifier {
    catalog: Arc<DataCatalog>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl QueryClassifier {
    pub fn new(catalog: Arc<DataCatalog>) -> Self {
        Self::with_telemetry(catalog, Arc::new(NoopSink))
    }

    pub fn with_telemetry(catalog: Arc<DataCatalog>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self { catalog, telemetry }
    }

    pub fn catalog(&self) -> &DataCatalog {
        &self.catalog
    }

    /// Classify a question, always producing a result
    ///
    /// Matching is case-insensitive. Rules are evaluated in priority order
    /// and the first firing rule wins; if none fires, the catalog search
    /// runs; if that also misses, the sentinel with its help payload is
    /// returned.
    pub fn classify(&self, question: &str) -> QueryResult {
        let lowered = question.to_lowercase();

        let result = if let Some(category) = match_rules(&lowered) {
            QueryResult {
                category,
                record: self.catalog.get(category).cloned(),
                matched_via_search: false,
                help: None,
            }
        } else if let Some(category) = self.catalog.search(&lowered) {
            QueryResult {
                category,
                record: self.catalog.get(category).cloned(),
                matched_via_search: true,
                help: None,
            }
        } else {
            QueryResult {
                category: Category::GeneralResponse,
                record: None,
                matched_via_search: false,
                help: Some(HelpResponse::new()),
            }
        };

        debug!(
            category = result.category.as_str(),
            via_search = result.matched_via_search,
            "Query classified"
        );
        self.telemetry.emit(
            "query_classified",
            EventProperties::new()
                .with("category", result.category.as_str())
                .with("matched_via_search", result.matched_via_search),
        );

        result
    }
}

/// Evaluate the ordered keyword rules against a lower-cased question
fn match_rules(lowered: &str) -> Option<Category> {
    for (category, trigger) in RULES {
        let fired = match trigger {
            Trigger::Any(keywords) => keywords.iter().any(|k| lowered.contains(k)),
            Trigger::All(keywords) => keywords.iter().all(|k| lowered.contains(k)),
        };
        if fired {
            return Some(*category);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::testing::RecordingSink;

    fn classifier() -> QueryClassifier {
        QueryClassifier::new(Arc::new(DataCatalog::new()))
    }

    #[test]
    fn test_each_rule_classifies() {
        let c = classifier();
        let cases = [
            ("How many users do we have?", Category::UserMetrics),
            ("What is our monthly revenue?", Category::RevenueMetrics),
            ("How engaged is the engagement cohort?", Category::EngagementMetrics),
            ("Are we growing?", Category::GrowthMetrics),
            (
                "Which features have the highest adoption?",
                Category::FeatureAdoption,
            ),
            ("What improves retention?", Category::RetentionMetrics),
            ("Where do people abandon the flow?", Category::OnboardingMetrics),
            ("How many open tickets?", Category::SupportMetrics),
            ("How many trial conversions?", Category::ConversionMetrics),
            ("Why is the app slow?", Category::PerformanceMetrics),
            ("Who is our biggest competitor?", Category::CompetitiveMetrics),
            ("What is our nps?", Category::ProductHealth),
        ];
        for (question, expected) in cases {
            let result = c.classify(question);
            assert_eq!(result.category, expected, "question: {question}");
            assert!(!result.matched_via_search, "question: {question}");
            assert!(result.record.is_some(), "question: {question}");
        }
    }

    #[test]
    fn test_priority_order() {
        let c = classifier();
        // Rule 1 (user_metrics) precedes rule 2 (revenue_metrics)
        let result = c.classify("How many users drive our revenue?");
        assert_eq!(result.category, Category::UserMetrics);
    }

    #[test]
    fn test_feature_adoption_requires_conjunction() {
        let c = classifier();
        // "adoption" alone falls through the rules to the catalog search,
        // which matches the category name instead
        let result = c.classify("adoption");
        assert!(result.matched_via_search);

        let result = c.classify("features adoption");
        assert_eq!(result.category, Category::FeatureAdoption);
        assert!(!result.matched_via_search);
    }

    #[test]
    fn test_case_insensitive() {
        let c = classifier();
        assert_eq!(
            c.classify("TOTAL USERS?").category,
            Category::UserMetrics
        );
    }

    #[test]
    fn test_unmatched_returns_sentinel_with_eight_suggestions() {
        let c = classifier();
        let result = c.classify("xyzzy plugh");
        assert_eq!(result.category, Category::GeneralResponse);
        assert!(result.record.is_none());
        let help = result.help.expect("sentinel carries help payload");
        assert!(!help.message.is_empty());
        assert_eq!(help.suggestions.len(), 8);
    }

    #[test]
    fn test_empty_input_is_total() {
        let c = classifier();
        let result = c.classify("");
        assert_eq!(result.category, Category::GeneralResponse);

        let result = c.classify("   \t  ");
        assert_eq!(result.category, Category::GeneralResponse);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let c = classifier();
        let a = c.classify("what drives retention?");
        let b = c.classify("what drives retention?");
        assert_eq!(a.category, b.category);
        assert_eq!(a.matched_via_search, b.matched_via_search);
    }

    #[test]
    fn test_emits_telemetry() {
        let sink = Arc::new(RecordingSink::new());
        let c = QueryClassifier::with_telemetry(Arc::new(DataCatalog::new()), sink.clone());
        c.classify("revenue this month");

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "query_classified");
        assert_eq!(
            events[0].1.get("category").unwrap(),
            "revenue_metrics"
        );
    }
}
