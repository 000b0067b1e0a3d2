//! HTTP handlers for the Pulse REST API

mod analysis;
mod insights;
mod outcomes;
mod query;

pub use analysis::run_analysis;
pub use insights::{list_insights, list_patterns};
pub use outcomes::post_outcome;
pub use query::post_query;
