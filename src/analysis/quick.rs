//! Quick pattern-based service detection
//!
//! One inexpensive pass of the pattern library over the whole text. The
//! result feeds strategy selection and seeds every execution path with a
//! baseline component list.

use tracing::debug;

use super::normalize::category_for;
use super::patterns::{PatternLibrary, HIGH_CONFIDENCE, MEDIUM_CONFIDENCE};
use super::types::{DetectedService, DetectionSource, QuickScan};

pub struct QuickDetector {
    library: PatternLibrary,
}

impl QuickDetector {
    pub fn new() -> Self {
        Self {
            library: PatternLibrary::new(),
        }
    }

    /// Scans the text with the high tier first, then the medium tier for
    /// canonical types the high tier did not match. The ordering is what
    /// guarantees a type found by both tiers keeps the higher confidence.
    pub fn scan(&self, text: &str) -> QuickScan {
        let lowered = text.to_lowercase();
        let mut services: Vec<DetectedService> = Vec::new();

        for entry in self.library.high_tier() {
            let count = entry.match_count(&lowered);
            if count > 0 {
                services.push(DetectedService::new(
                    entry.canonical_type,
                    category_for(entry.canonical_type),
                    HIGH_CONFIDENCE,
                    count,
                    DetectionSource::Pattern,
                ));
            }
        }

        for entry in self.library.medium_tier() {
            if services
                .iter()
                .any(|s| s.canonical_type == entry.canonical_type)
            {
                continue;
            }
            let count = entry.match_count(&lowered);
            if count > 0 {
                services.push(DetectedService::new(
                    entry.canonical_type,
                    category_for(entry.canonical_type),
                    MEDIUM_CONFIDENCE,
                    count,
                    DetectionSource::Pattern,
                ));
            }
        }

        let aggregate_confidence = if services.is_empty() {
            0.0
        } else {
            services.iter().map(|s| s.confidence).sum::<f32>() / services.len() as f32
        };

        let high_confidence_types: Vec<String> = services
            .iter()
            .filter(|s| s.confidence >= HIGH_CONFIDENCE)
            .map(|s| s.canonical_type.clone())
            .collect();

        debug!(
            detected = services.len(),
            aggregate_confidence, "quick pattern scan complete"
        );

        QuickScan {
            services,
            aggregate_confidence,
            high_confidence_types,
        }
    }
}

impl Default for QuickDetector {
    fn default() -> Self {
        Self::new()
    }
}
