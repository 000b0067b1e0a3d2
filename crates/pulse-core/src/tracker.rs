//! Outcome tracker - learned confidence from implementation outcomes
//!
//! The tracker is the only shared mutable state in the core. Each report is
//! a single read-modify-write of one identifier's counter triple, applied
//! under the map lock so concurrent reports never lose updates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::debug;

use crate::telemetry::{EventProperties, NoopSink, TelemetrySink};

/// Confidence returned before any implemented report exists
const DEFAULT_CONFIDENCE: f64 = 0.5;
/// Learned confidence never reaches absolute zero or absolute certainty
const CONFIDENCE_FLOOR: f64 = 0.1;
const CONFIDENCE_CEILING: f64 = 0.95;

/// Per-insight-identifier outcome counters
///
/// Counters only ever increase, and `successful <= implemented <= suggested`
/// holds by construction.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Pattern {
    pub suggested: u64,
    pub implemented: u64,
    pub successful: u64,
}

impl Pattern {
    /// Derive the learned confidence for these counters
    pub fn confidence(&self) -> f64 {
        if self.implemented == 0 {
            // No evidence yet - default midpoint, not an error
            return DEFAULT_CONFIDENCE;
        }
        let ratio = self.successful as f64 / self.implemented as f64;
        ratio.clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
    }
}

/// Tracks suggested/implemented/successful counts per insight identifier
pub struct OutcomeTracker {
    patterns: Mutex<HashMap<String, Pattern>>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl OutcomeTracker {
    pub fn new() -> Self {
        Self::with_telemetry(Arc::new(NoopSink))
    }

    pub fn with_telemetry(telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            patterns: Mutex::new(HashMap::new()),
            telemetry,
        }
    }

    /// Record an outcome report and return the updated confidence
    ///
    /// Unknown identifiers are created lazily with zeroed counters. The
    /// counter update and the confidence read happen under one lock
    /// acquisition.
    pub fn report_outcome(&self, id: &str, implemented: bool, improved: bool) -> f64 {
        let confidence = {
            // Counter bumps cannot corrupt the map, so a poisoned lock is
            // safe to recover
            let mut patterns = self.patterns.lock().unwrap_or_else(|e| e.into_inner());
            let pattern = patterns.entry(id.to_string()).or_default();
            pattern.suggested += 1;
            if implemented {
                pattern.implemented += 1;
                if improved {
                    pattern.successful += 1;
                }
            }
            pattern.confidence()
        };

        debug!(id, implemented, improved, confidence, "Outcome reported");
        self.telemetry.emit(
            "outcome_reported",
            EventProperties::new()
                .with("insight_id", id)
                .with("implemented", implemented)
                .with("improved", improved)
                .with("confidence", confidence),
        );

        confidence
    }

    /// Current confidence for an identifier (default for unknown ids)
    pub fn confidence(&self, id: &str) -> f64 {
        self.patterns
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .map(Pattern::confidence)
            .unwrap_or(DEFAULT_CONFIDENCE)
    }

    pub fn pattern(&self, id: &str) -> Option<Pattern> {
        self.patterns
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .copied()
    }

    /// Snapshot of all patterns, sorted by identifier for stable output
    pub fn patterns(&self) -> Vec<(String, Pattern)> {
        let patterns = self.patterns.lock().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<(String, Pattern)> =
            patterns.iter().map(|(k, v)| (k.clone(), *v)).collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

impl Default for OutcomeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unimplemented_reports_stay_at_default() {
        let tracker = OutcomeTracker::new();
        for _ in 0..5 {
            assert_eq!(tracker.report_outcome("x", false, false), 0.5);
        }
        let pattern = tracker.pattern("x").unwrap();
        assert_eq!(pattern.suggested, 5);
        assert_eq!(pattern.implemented, 0);
        assert_eq!(pattern.successful, 0);
    }

    #[test]
    fn test_mixed_outcomes() {
        let tracker = OutcomeTracker::new();
        let first = tracker.report_outcome("y", true, true);
        assert_eq!(first, 0.95); // 1/1 clamped to the ceiling

        let second = tracker.report_outcome("y", true, false);
        assert_eq!(second, 0.5); // 1/2, within the clamp bounds

        let pattern = tracker.pattern("y").unwrap();
        assert_eq!(pattern.suggested, 2);
        assert_eq!(pattern.implemented, 2);
        assert_eq!(pattern.successful, 1);
    }

    #[test]
    fn test_confidence_floor() {
        let tracker = OutcomeTracker::new();
        tracker.report_outcome("z", true, false);
        // 0/1 clamps up to the floor
        assert_eq!(tracker.confidence("z"), 0.1);
    }

    #[test]
    fn test_unknown_id_defaults() {
        let tracker = OutcomeTracker::new();
        assert_eq!(tracker.confidence("never-seen"), 0.5);
        assert!(tracker.pattern("never-seen").is_none());
    }

    #[test]
    fn test_improved_without_implemented_does_not_count() {
        let tracker = OutcomeTracker::new();
        tracker.report_outcome("w", false, true);
        let pattern = tracker.pattern("w").unwrap();
        assert_eq!(pattern.implemented, 0);
        assert_eq!(pattern.successful, 0);
    }

    #[test]
    fn test_concurrent_reports_lose_nothing() {
        let tracker = Arc::new(OutcomeTracker::new());
        let mut handles = vec![];

        // 16 threads x 25 reports: 10 of each 25 implemented, 4 of those improved
        for _ in 0..16 {
            let tracker = tracker.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..25 {
                    let implemented = i < 10;
                    let improved = i < 4;
                    tracker.report_outcome("shared", implemented, improved);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let pattern = tracker.pattern("shared").unwrap();
        assert_eq!(pattern.suggested, 16 * 25);
        assert_eq!(pattern.implemented, 16 * 10);
        assert_eq!(pattern.successful, 16 * 4);
    }

    #[test]
    fn test_patterns_snapshot_sorted() {
        let tracker = OutcomeTracker::new();
        tracker.report_outcome("b", false, false);
        tracker.report_outcome("a", true, true);

        let all = tracker.patterns();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "a");
        assert_eq!(all[1].0, "b");
    }
}
