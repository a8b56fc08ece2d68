//! Strategy selection
//!
//! Maps quick-scan output and text length onto one of the three execution
//! strategies. The boundary constants are cost/latency policy and therefore
//! live in a tunable struct rather than in the decision logic.

use tracing::debug;

use super::types::AnalysisStrategy;

/// Tunable boundaries for the strategy decision table
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyPolicy {
    /// Texts shorter than this (in characters) qualify for the fast path
    pub fast_path_max_text_len: usize,
    /// Aggregate confidence must strictly exceed this for the fast path
    pub fast_path_min_confidence: f32,
    /// Texts longer than this force the parallel hybrid strategy
    pub hybrid_min_text_len: usize,
    /// More detected services than this force the parallel hybrid strategy
    pub hybrid_min_services: usize,
}

impl Default for StrategyPolicy {
    fn default() -> Self {
        Self {
            fast_path_max_text_len: 2000,
            fast_path_min_confidence: 0.8,
            hybrid_min_text_len: 3000,
            hybrid_min_services: 5,
        }
    }
}

/// Picks the execution strategy for one request.
///
/// Evaluated in priority order: short unambiguous inputs resolve without an
/// external call, long or service-rich inputs get decomposed category
/// scanning plus one confirmatory call, everything else gets a single rich
/// call. `text_len` is measured in characters, not bytes.
pub fn select_strategy(
    text_len: usize,
    detected_count: usize,
    aggregate_confidence: f32,
    policy: &StrategyPolicy,
) -> AnalysisStrategy {
    let strategy = if detected_count > 0
        && aggregate_confidence > policy.fast_path_min_confidence
        && text_len < policy.fast_path_max_text_len
    {
        AnalysisStrategy::FastPath
    } else if text_len > policy.hybrid_min_text_len || detected_count > policy.hybrid_min_services {
        AnalysisStrategy::ParallelHybrid
    } else {
        AnalysisStrategy::AiEnhanced
    };

    debug!(
        text_len,
        detected_count, aggregate_confidence, strategy = %strategy, "selected strategy"
    );
    strategy
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        short_confident = { 100, 3, 0.9, AnalysisStrategy::FastPath },
        boundary_confidence_not_enough = { 100, 3, 0.8, AnalysisStrategy::AiEnhanced },
        boundary_length_not_fast = { 2000, 3, 0.9, AnalysisStrategy::AiEnhanced },
        just_under_length_boundary = { 1999, 1, 0.9, AnalysisStrategy::FastPath },
        nothing_detected = { 100, 0, 0.0, AnalysisStrategy::AiEnhanced },
        long_text = { 3001, 0, 0.0, AnalysisStrategy::ParallelHybrid },
        boundary_long_text = { 3000, 0, 0.0, AnalysisStrategy::AiEnhanced },
        many_services = { 100, 6, 0.5, AnalysisStrategy::ParallelHybrid },
        boundary_service_count = { 100, 5, 0.5, AnalysisStrategy::AiEnhanced },
        long_and_confident_still_hybrid = { 5000, 8, 0.95, AnalysisStrategy::ParallelHybrid },
        medium_everything = { 2500, 2, 0.6, AnalysisStrategy::AiEnhanced },
    )]
    fn test_decision_table(
        text_len: usize,
        detected_count: usize,
        aggregate_confidence: f32,
        expected: AnalysisStrategy,
    ) {
        let policy = StrategyPolicy::default();
        assert_eq!(
            select_strategy(text_len, detected_count, aggregate_confidence, &policy),
            expected
        );
    }

    #[test]
    fn test_fast_path_beats_hybrid_when_both_qualify() {
        // detected_count 6 also satisfies the hybrid row, but the fast-path
        // row is evaluated first
        let policy = StrategyPolicy::default();
        assert_eq!(
            select_strategy(500, 6, 0.9, &policy),
            AnalysisStrategy::FastPath
        );
    }

    #[test]
    fn test_policy_boundaries_are_tunable() {
        let policy = StrategyPolicy {
            fast_path_max_text_len: 10,
            ..StrategyPolicy::default()
        };
        assert_eq!(
            select_strategy(50, 3, 0.9, &policy),
            AnalysisStrategy::AiEnhanced
        );
    }
}
