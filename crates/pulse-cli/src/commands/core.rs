//! Core commands (query, analyze, outcome, patterns) and shared wiring

use std::sync::Arc;

use anyhow::Result;

use pulse_core::{
    sink_from_env, AnalysisOrchestrator, DataCatalog, Insight, InsightSynthesizer, OutcomeTracker,
    QueryClassifier, SynthesizerConfig,
};

/// Wire up the core components for a one-shot command
///
/// Telemetry comes from the environment (PULSE_TELEMETRY_URL); unconfigured
/// runs get a no-op sink.
pub fn build_classifier() -> (QueryClassifier, InsightSynthesizer) {
    let telemetry = sink_from_env();
    let catalog = Arc::new(DataCatalog::new());
    (
        QueryClassifier::with_telemetry(catalog, telemetry.clone()),
        InsightSynthesizer::with_telemetry(SynthesizerConfig::default(), telemetry),
    )
}

pub fn cmd_query(question: &str, json: bool) -> Result<()> {
    let (classifier, synthesizer) = build_classifier();

    let result = classifier.classify(question);
    let insights = synthesizer.synthesize(&result);

    if json {
        let payload = serde_json::json!({
            "data": &result,
            "insights": &insights,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Category: {}", result.category);
    if result.matched_via_search {
        println!("  (matched via catalog search)");
    }
    if let Some(record) = &result.record {
        println!("Data: {}", serde_json::to_string_pretty(record)?);
    }
    if let Some(help) = &result.help {
        println!("{}", help.message);
        for suggestion in &help.suggestions {
            println!("  - {}", suggestion);
        }
    }
    print_insights(&insights);

    Ok(())
}

pub fn cmd_analyze(json: bool) -> Result<()> {
    let telemetry = sink_from_env();
    let catalog = Arc::new(DataCatalog::new());
    let orchestrator = AnalysisOrchestrator::new(
        QueryClassifier::with_telemetry(catalog, telemetry.clone()),
        InsightSynthesizer::with_telemetry(SynthesizerConfig::default(), telemetry),
    );

    let analysis = orchestrator.run_full_analysis();

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("=== Full Analysis ===");
    print_insights(&analysis.insights);
    println!();
    println!("Summary:");
    println!("  Insights: {}", analysis.summary.total_insights);
    println!("  Average confidence: {}", analysis.summary.average_confidence);
    if let Some(top) = &analysis.summary.top_recommendation {
        println!("  Top recommendation: {}", top);
    }
    if let Some(message) = &analysis.summary.message {
        println!("  {}", message);
    }
    println!();
    println!("Metrics:");
    println!("  Adoption health: {}", analysis.metrics.adoption_health);
    println!(
        "  Retention strength: {:.2}",
        analysis.metrics.retention_strength
    );
    println!(
        "  Onboarding efficiency: {:.2}",
        analysis.metrics.onboarding_efficiency
    );

    Ok(())
}

pub fn cmd_outcome(insight_id: &str, implemented: bool, improved: bool, json: bool) -> Result<()> {
    let tracker = OutcomeTracker::with_telemetry(sink_from_env());
    let confidence = tracker.report_outcome(insight_id, implemented, improved);

    if json {
        println!(
            "{}",
            serde_json::json!({"insight_id": insight_id, "confidence": confidence})
        );
    } else {
        println!("Recorded outcome for {}", insight_id);
        println!("  implemented: {}, improved: {}", implemented, improved);
        println!("  confidence: {:.2}", confidence);
    }

    Ok(())
}

pub fn cmd_patterns(json: bool) -> Result<()> {
    // One-shot invocations hold no prior reports; this mirrors the REST
    // endpoint for a freshly started process
    let tracker = OutcomeTracker::new();
    let patterns = tracker.patterns();

    if json {
        let payload: Vec<_> = patterns
            .iter()
            .map(|(id, p)| {
                serde_json::json!({
                    "insight_id": id,
                    "suggested": p.suggested,
                    "implemented": p.implemented,
                    "successful": p.successful,
                    "confidence": p.confidence(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if patterns.is_empty() {
        println!("No outcome patterns recorded in this session.");
        println!("Use the server's /api/outcomes endpoint to accumulate patterns.");
    }
    for (id, pattern) in patterns {
        println!(
            "{}: suggested={} implemented={} successful={} confidence={:.2}",
            id,
            pattern.suggested,
            pattern.implemented,
            pattern.successful,
            pattern.confidence()
        );
    }

    Ok(())
}

fn print_insights(insights: &[Insight]) {
    if insights.is_empty() {
        println!("No insights triggered.");
        return;
    }
    println!("Insights:");
    for insight in insights {
        println!(
            "  [{}] {} (confidence {:.0}%)",
            insight.insight_type,
            insight.discovery,
            insight.confidence * 100.0
        );
        println!("      -> {}", insight.recommendation);
        println!("      expected impact: {}", insight.expected_impact);
    }
}
