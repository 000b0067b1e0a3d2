//! Pulse Core Library
//!
//! Shared functionality for the Pulse product-analytics engine:
//! - Static metrics catalog (the read-only mock dataset)
//! - Keyword query classifier with ordered rules and fallback search
//! - Threshold-driven insight synthesizer with fixed confidences
//! - Outcome tracker deriving learned confidence per insight
//! - Full-analysis orchestrator (executive summary + health metrics)
//! - Injected telemetry collaborator with fire-and-forget emission

pub mod catalog;
pub mod classifier;
pub mod error;
pub mod insights;
pub mod orchestrator;
pub mod telemetry;
pub mod tracker;

pub use catalog::{Category, DataCatalog};
pub use classifier::{HelpResponse, QueryClassifier, QueryResult};
pub use error::{Error, Result};
pub use insights::{
    ExecutiveSummary, FullAnalysis, FullQueryResults, HealthMetrics, Insight, InsightFilter,
    InsightStore, InsightSynthesizer, InsightType, SynthesizerConfig,
};
pub use orchestrator::AnalysisOrchestrator;
pub use telemetry::{sink_from_env, EventProperties, HttpSink, NoopSink, TelemetrySink};
pub use tracker::{OutcomeTracker, Pattern};
