//! Insight synthesis: threshold rules, result types, and the in-memory store

mod store;
mod synthesizer;
mod types;

pub use store::{InsightFilter, InsightStore};
pub use synthesizer::{InsightSynthesizer, SynthesizerConfig};
pub use types::{
    ExecutiveSummary, FullAnalysis, FullQueryResults, HealthMetrics, Insight, InsightType,
};
