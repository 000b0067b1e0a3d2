//! Metrics catalog - the read-only keyed store of mock business metrics
//!
//! The catalog maps each [`Category`] to a static JSON record. Records are
//! loaded once at construction and never mutated; classification and insight
//! synthesis only ever read from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Error;

/// Business-metric categories that key the catalog
///
/// Twelve fixed topics plus the `general_response` sentinel returned for
/// questions that match nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    UserMetrics,
    RevenueMetrics,
    EngagementMetrics,
    GrowthMetrics,
    FeatureAdoption,
    RetentionMetrics,
    OnboardingMetrics,
    SupportMetrics,
    ConversionMetrics,
    PerformanceMetrics,
    CompetitiveMetrics,
    ProductHealth,
    /// Sentinel for unmatched questions - carries no record
    GeneralResponse,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::UserMetrics => "user_metrics",
            Category::RevenueMetrics => "revenue_metrics",
            Category::EngagementMetrics => "engagement_metrics",
            Category::GrowthMetrics => "growth_metrics",
            Category::FeatureAdoption => "feature_adoption",
            Category::RetentionMetrics => "retention_metrics",
            Category::OnboardingMetrics => "onboarding_metrics",
            Category::SupportMetrics => "support_metrics",
            Category::ConversionMetrics => "conversion_metrics",
            Category::PerformanceMetrics => "performance_metrics",
            Category::CompetitiveMetrics => "competitive_metrics",
            Category::ProductHealth => "product_health",
            Category::GeneralResponse => "general_response",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_metrics" => Ok(Category::UserMetrics),
            "revenue_metrics" => Ok(Category::RevenueMetrics),
            "engagement_metrics" => Ok(Category::EngagementMetrics),
            "growth_metrics" => Ok(Category::GrowthMetrics),
            "feature_adoption" => Ok(Category::FeatureAdoption),
            "retention_metrics" => Ok(Category::RetentionMetrics),
            "onboarding_metrics" => Ok(Category::OnboardingMetrics),
            "support_metrics" => Ok(Category::SupportMetrics),
            "conversion_metrics" => Ok(Category::ConversionMetrics),
            "performance_metrics" => Ok(Category::PerformanceMetrics),
            "competitive_metrics" => Ok(Category::CompetitiveMetrics),
            "product_health" => Ok(Category::ProductHealth),
            "general_response" => Ok(Category::GeneralResponse),
            _ => Err(Error::UnknownCategory(s.to_string())),
        }
    }
}

/// The in-memory catalog of metric records
///
/// Iteration order is fixed (catalog order) and matters for the classifier's
/// fallback search: the first category with a token match wins.
pub struct DataCatalog {
    entries: Vec<(Category, Value)>,
}

impl DataCatalog {
    /// Build the catalog with the fixed mock dataset
    pub fn new() -> Self {
        Self {
            entries: mock_entries(),
        }
    }

    /// Look up the record for a category
    pub fn get(&self, category: Category) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, record)| record)
    }

    /// Iterate categories and records in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &Value)> {
        self.entries.iter().map(|(c, r)| (*c, r))
    }

    /// Catalog-wide keyword search over category names and serialized records
    ///
    /// Splits the question on whitespace, lower-cases each token, and returns
    /// the first category (in catalog order) whose name or serialized record
    /// contains any token as a substring.
    pub fn search(&self, question: &str) -> Option<Category> {
        let tokens: Vec<String> = question
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if tokens.is_empty() {
            return None;
        }

        for (category, record) in &self.entries {
            let name = category.as_str();
            let serialized = record.to_string().to_lowercase();
            if tokens
                .iter()
                .any(|t| name.contains(t.as_str()) || serialized.contains(t.as_str()))
            {
                return Some(*category);
            }
        }
        None
    }
}

impl Default for DataCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// The static mock dataset, one record per category
fn mock_entries() -> Vec<(Category, Value)> {
    vec![
        (
            Category::UserMetrics,
            json!({
                "total_users": 45230,
                "active_today": 8934,
                "new_this_week": 1205,
                "growth_rate": 0.12,
            }),
        ),
        (
            Category::RevenueMetrics,
            json!({
                "mrr": 125400,
                "arr": 1504800,
                "revenue_growth": 0.15,
                "arpu": 42.50,
            }),
        ),
        (
            Category::EngagementMetrics,
            json!({
                "dau": 8934,
                "wau": 21450,
                "mau": 38200,
                "avg_session_minutes": 14.2,
                "stickiness": 0.23,
            }),
        ),
        (
            Category::GrowthMetrics,
            json!({
                "user_growth": 0.12,
                "revenue_growth": 0.15,
                "churn_rate": 0.045,
                "viral_coefficient": 0.8,
            }),
        ),
        (
            Category::FeatureAdoption,
            json!({
                "top_features": [
                    {"name": "dashboards", "adoption": 0.74},
                    {"name": "alerts", "adoption": 0.61},
                    {"name": "exports", "adoption": 0.52},
                ],
                "underused": {
                    "name": "api_access",
                    "adoption": 0.08,
                    "potential": "high",
                },
            }),
        ),
        (
            Category::RetentionMetrics,
            json!({
                "day_1": 0.68,
                "day_7": 0.42,
                "day_30": 0.31,
                "top_action": "created_first_report",
                "retention_lift": 2.4,
                "correlation_strength": 0.78,
            }),
        ),
        (
            Category::OnboardingMetrics,
            json!({
                "completion_rate": 0.55,
                "drop_off_rate": 0.45,
                "biggest_drop": {
                    "step": "connect_data_source",
                    "loss": 0.32,
                },
                "steps": ["signup", "verify_email", "connect_data_source", "first_report"],
            }),
        ),
        (
            Category::SupportMetrics,
            json!({
                "open_tickets": 47,
                "avg_response_hours": 3.2,
                "csat": 4.1,
                "top_topic": "billing",
            }),
        ),
        (
            Category::ConversionMetrics,
            json!({
                "trial_to_paid": 0.18,
                "visitor_to_signup": 0.034,
                "upgrade_rate": 0.07,
            }),
        ),
        (
            Category::PerformanceMetrics,
            json!({
                "p95_latency_ms": 420,
                "uptime": 0.9992,
                "error_rate": 0.004,
            }),
        ),
        (
            Category::CompetitiveMetrics,
            json!({
                "market_share": 0.07,
                "win_loss_analysis": {
                    "win_rate": 0.38,
                    "top_loss_reason": "pricing",
                },
            }),
        ),
        (
            Category::ProductHealth,
            json!({
                "nps_score": 44,
                "satisfaction": 0.71,
                "health_score": 72,
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        assert_eq!(Category::UserMetrics.as_str(), "user_metrics");
        assert_eq!(
            Category::from_str("retention_metrics").unwrap(),
            Category::RetentionMetrics
        );
        assert!(Category::from_str("bogus").is_err());
    }

    #[test]
    fn test_catalog_has_twelve_records() {
        let catalog = DataCatalog::new();
        assert_eq!(catalog.iter().count(), 12);
        assert!(catalog.get(Category::GeneralResponse).is_none());
    }

    #[test]
    fn test_search_matches_category_name() {
        let catalog = DataCatalog::new();
        // "adoption" is a substring of the feature_adoption category name
        assert_eq!(
            catalog.search("adoption"),
            Some(Category::FeatureAdoption)
        );
    }

    #[test]
    fn test_search_matches_record_body() {
        let catalog = DataCatalog::new();
        // "mrr" appears only inside the revenue record
        assert_eq!(catalog.search("mrr please"), Some(Category::RevenueMetrics));
    }

    #[test]
    fn test_search_no_match() {
        let catalog = DataCatalog::new();
        assert_eq!(catalog.search("xyzzy plugh"), None);
        assert_eq!(catalog.search("   "), None);
    }
}
