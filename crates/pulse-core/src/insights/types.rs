//! Core types for insight synthesis and analysis results

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classifier::QueryResult;
use crate::error::Error;

/// Types of insights that can be synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// User base growing faster than the baseline threshold
    UserGrowth,
    /// Revenue growing faster than the baseline threshold
    RevenueGrowth,
    /// An action correlated with retention worth promoting
    RetentionDriver,
    /// Onboarding losing too many users at a step
    OnboardingFriction,
    /// A high-potential feature with low adoption
    FeatureOpportunity,
    /// Product health indicator below the healthy range
    ProductHealthRisk,
    /// Losing more competitive deals than winning
    CompetitiveRisk,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::UserGrowth => "user_growth",
            InsightType::RevenueGrowth => "revenue_growth",
            InsightType::RetentionDriver => "retention_driver",
            InsightType::OnboardingFriction => "onboarding_friction",
            InsightType::FeatureOpportunity => "feature_opportunity",
            InsightType::ProductHealthRisk => "product_health_risk",
            InsightType::CompetitiveRisk => "competitive_risk",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_growth" => Ok(InsightType::UserGrowth),
            "revenue_growth" => Ok(InsightType::RevenueGrowth),
            "retention_driver" => Ok(InsightType::RetentionDriver),
            "onboarding_friction" => Ok(InsightType::OnboardingFriction),
            "feature_opportunity" => Ok(InsightType::FeatureOpportunity),
            "product_health_risk" => Ok(InsightType::ProductHealthRisk),
            "competitive_risk" => Ok(InsightType::CompetitiveRisk),
            _ => Err(Error::UnknownInsightType(s.to_string())),
        }
    }
}

/// A threshold-triggered recommendation derived from one record
///
/// Invariants: `discovery` and `recommendation` are always non-empty, and an
/// insight is only constructed when its triggering condition holds.
/// Confidence is a fixed literal per rule, never derived from the magnitude
/// of the observed deviation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    /// Assigned at the transport boundary when the insight is stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub insight_type: InsightType,
    pub discovery: String,
    pub confidence: f64,
    pub recommendation: String,
    pub expected_impact: String,
}

impl Insight {
    pub fn new(
        insight_type: InsightType,
        discovery: impl Into<String>,
        confidence: f64,
        recommendation: impl Into<String>,
        expected_impact: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            insight_type,
            discovery: discovery.into(),
            confidence,
            recommendation: recommendation.into(),
            expected_impact: expected_impact.into(),
        }
    }
}

/// The three classified results the orchestrator feeds to `synthesize_all`
pub struct FullQueryResults {
    pub feature_adoption: QueryResult,
    pub retention_drivers: QueryResult,
    pub onboarding_dropoff: QueryResult,
}

/// Derived summary of one full-analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub total_insights: usize,
    /// Mean confidence formatted as a percentage string, "0%" when empty
    pub average_confidence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_action: Option<String>,
    /// Set only for the degenerate zero-insight case
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregate health metrics computed from the three analysis records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// Number of entries in the feature-adoption top-features list
    pub adoption_health: usize,
    /// The retention record's correlation strength, 0 if absent
    pub retention_strength: f64,
    /// 1 - drop_off_rate; missing drop-off is treated as zero drop-off
    pub onboarding_efficiency: f64,
}

/// Result of `AnalysisOrchestrator::run_full_analysis`
#[derive(Debug, Clone, Serialize)]
pub struct FullAnalysis {
    pub insights: Vec<Insight>,
    pub summary: ExecutiveSummary,
    pub metrics: HealthMetrics,
}
