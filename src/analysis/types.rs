//! Core data model for diagram analysis
//!
//! These types cross every stage boundary of the pipeline: inbound extracted
//! content, per-stage detections, the platform verdict, and the final
//! reconciled result handed to downstream consumers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of source document the text was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Xml,
    Svg,
    Pdf,
    Text,
    #[serde(other)]
    Unknown,
}

impl ContentKind {
    /// Maps a file extension (without dot, any case) to a content kind
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" => ContentKind::Image,
            "xml" | "drawio" => ContentKind::Xml,
            "svg" => ContentKind::Svg,
            "pdf" => ContentKind::Pdf,
            "txt" | "md" => ContentKind::Text,
            _ => ContentKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Image => "image",
            ContentKind::Xml => "xml",
            ContentKind::Svg => "svg",
            ContentKind::Pdf => "pdf",
            ContentKind::Text => "text",
            ContentKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata accompanying extracted content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentMetadata {
    #[serde(default)]
    pub filename: String,
}

/// Free-form text extracted from an uploaded diagram by the extraction layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub kind: ContentKind,
    pub text: String,
    #[serde(default)]
    pub metadata: ContentMetadata,
}

impl ExtractedContent {
    pub fn new(
        kind: ContentKind,
        text: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            metadata: ContentMetadata {
                filename: filename.into(),
            },
        }
    }

    pub fn filename(&self) -> &str {
        &self.metadata.filename
    }
}

/// Functional category a detected service belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Compute,
    Storage,
    Network,
    Database,
    Security,
    Monitoring,
    Integration,
    Analytics,
    Ai,
    Iot,
    Management,
    Other,
}

impl ServiceCategory {
    /// Parses a category string as emitted by AI responses; `None` for
    /// anything outside the closed set
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "compute" => Some(ServiceCategory::Compute),
            "storage" => Some(ServiceCategory::Storage),
            "network" | "networking" => Some(ServiceCategory::Network),
            "database" | "databases" => Some(ServiceCategory::Database),
            "security" => Some(ServiceCategory::Security),
            "monitoring" => Some(ServiceCategory::Monitoring),
            "integration" => Some(ServiceCategory::Integration),
            "analytics" => Some(ServiceCategory::Analytics),
            "ai" | "ml" => Some(ServiceCategory::Ai),
            "iot" => Some(ServiceCategory::Iot),
            "management" => Some(ServiceCategory::Management),
            "other" => Some(ServiceCategory::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Compute => "compute",
            ServiceCategory::Storage => "storage",
            ServiceCategory::Network => "network",
            ServiceCategory::Database => "database",
            ServiceCategory::Security => "security",
            ServiceCategory::Monitoring => "monitoring",
            ServiceCategory::Integration => "integration",
            ServiceCategory::Analytics => "analytics",
            ServiceCategory::Ai => "ai",
            ServiceCategory::Iot => "iot",
            ServiceCategory::Management => "management",
            ServiceCategory::Other => "other",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which stage of the pipeline produced a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    Pattern,
    CategoryAnalyzer,
    Ai,
}

/// Builds a human-readable display name from a canonical identifier
/// ("sql_database" becomes "Sql Database")
pub fn default_display_name(canonical_type: &str) -> String {
    canonical_type
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A single platform service identified in the diagram text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedService {
    /// Normalized identifier from the closed service vocabulary
    pub canonical_type: String,
    pub display_name: String,
    pub category: ServiceCategory,
    /// Heuristic trust in this detection, always within [0, 1]
    pub confidence: f32,
    pub match_count: u32,
    pub source: DetectionSource,
}

impl DetectedService {
    pub fn new(
        canonical_type: impl Into<String>,
        category: ServiceCategory,
        confidence: f32,
        match_count: u32,
        source: DetectionSource,
    ) -> Self {
        let canonical_type = canonical_type.into();
        let display_name = default_display_name(&canonical_type);
        Self {
            canonical_type,
            display_name,
            category,
            confidence,
            match_count,
            source,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// A directed link between two detected components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub source_name: String,
    pub target_name: String,
    pub relationship_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Relationship {
    pub fn new(
        source_name: impl Into<String>,
        target_name: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            target_name: target_name.into(),
            relationship_type: relationship_type.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Outcome of the platform gate; produced once per request and never revised
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub is_supported_platform: bool,
    pub confidence: f32,
    /// Competing platforms whose signals were found in the input
    #[serde(default)]
    pub detected_platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ValidationVerdict {
    pub fn accepted(confidence: f32) -> Self {
        Self {
            is_supported_platform: true,
            confidence,
            detected_platforms: Vec::new(),
            rejection_reason: None,
        }
    }

    pub fn rejected(
        confidence: f32,
        detected_platforms: Vec<String>,
        rejection_reason: impl Into<String>,
    ) -> Self {
        Self {
            is_supported_platform: false,
            confidence,
            detected_platforms,
            rejection_reason: Some(rejection_reason.into()),
        }
    }
}

/// Execution path chosen for one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStrategy {
    /// Pattern-only result, no external call
    FastPath,
    /// Concurrent category scan cross-checked by one confirmatory AI call
    ParallelHybrid,
    /// Single rich AI call merged with the quick scan
    AiEnhanced,
}

impl AnalysisStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStrategy::FastPath => "fast_path",
            AnalysisStrategy::ParallelHybrid => "parallel_hybrid",
            AnalysisStrategy::AiEnhanced => "ai_enhanced",
        }
    }
}

impl fmt::Display for AnalysisStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the quick pattern scan
#[derive(Debug, Clone, Default)]
pub struct QuickScan {
    /// One entry per canonical type, in pattern-table order
    pub services: Vec<DetectedService>,
    /// Mean of the per-type confidences, 0 when nothing matched
    pub aggregate_confidence: f32,
    /// Canonical types detected at high confidence
    pub high_confidence_types: Vec<String>,
}

impl QuickScan {
    pub fn detected_count(&self) -> usize {
        self.services.len()
    }

    pub fn contains(&self, canonical_type: &str) -> bool {
        self.services
            .iter()
            .any(|s| s.canonical_type == canonical_type)
    }
}

/// Finalized analysis for one request, unique per canonical type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub components: Vec<DetectedService>,
    pub relationships: Vec<Relationship>,
    pub strategy_used: AnalysisStrategy,
    /// Mean confidence across the final component list
    pub aggregate_confidence: f32,
    /// Share of components the system itself rates as high confidence
    pub accuracy_score: f32,
    pub tokens_consumed: u32,
    /// True when an AI reply was received but could not be parsed
    #[serde(default)]
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AnalysisResult {
    pub fn component(&self, canonical_type: &str) -> Option<&DetectedService> {
        self.components
            .iter()
            .find(|c| c.canonical_type == canonical_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_from_extension() {
        assert_eq!(ContentKind::from_extension("png"), ContentKind::Image);
        assert_eq!(ContentKind::from_extension("JPEG"), ContentKind::Image);
        assert_eq!(ContentKind::from_extension("drawio"), ContentKind::Xml);
        assert_eq!(ContentKind::from_extension("svg"), ContentKind::Svg);
        assert_eq!(ContentKind::from_extension("pdf"), ContentKind::Pdf);
        assert_eq!(ContentKind::from_extension("txt"), ContentKind::Text);
        assert_eq!(ContentKind::from_extension("exe"), ContentKind::Unknown);
    }

    #[test]
    fn test_default_display_name() {
        assert_eq!(default_display_name("sql_database"), "Sql Database");
        assert_eq!(default_display_name("app_service"), "App Service");
        assert_eq!(default_display_name("cdn"), "Cdn");
        assert_eq!(default_display_name(""), "");
    }

    #[test]
    fn test_detected_service_constructor() {
        let service = DetectedService::new(
            "storage_account",
            ServiceCategory::Storage,
            0.9,
            3,
            DetectionSource::Pattern,
        );

        assert_eq!(service.canonical_type, "storage_account");
        assert_eq!(service.display_name, "Storage Account");
        assert_eq!(service.category, ServiceCategory::Storage);
        assert_eq!(service.match_count, 3);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(ServiceCategory::parse("compute"), Some(ServiceCategory::Compute));
        assert_eq!(ServiceCategory::parse(" Networking "), Some(ServiceCategory::Network));
        assert_eq!(ServiceCategory::parse("ML"), Some(ServiceCategory::Ai));
        assert_eq!(ServiceCategory::parse("blockchain"), None);
    }

    #[test]
    fn test_category_json() {
        assert_eq!(
            serde_json::to_string(&ServiceCategory::Database).unwrap(),
            "\"database\""
        );
        assert_eq!(
            serde_json::to_string(&DetectionSource::CategoryAnalyzer).unwrap(),
            "\"category_analyzer\""
        );
        assert_eq!(
            serde_json::to_string(&AnalysisStrategy::ParallelHybrid).unwrap(),
            "\"parallel_hybrid\""
        );
    }

    #[test]
    fn test_verdict_constructors() {
        let ok = ValidationVerdict::accepted(0.7);
        assert!(ok.is_supported_platform);
        assert!(ok.detected_platforms.is_empty());
        assert!(ok.rejection_reason.is_none());

        let rejected =
            ValidationVerdict::rejected(0.9, vec!["AWS".to_string()], "wrong platform");
        assert!(!rejected.is_supported_platform);
        assert_eq!(rejected.detected_platforms, vec!["AWS".to_string()]);
        assert!(rejected.rejection_reason.is_some());
    }

    #[test]
    fn test_quick_scan_lookup() {
        let scan = QuickScan {
            services: vec![DetectedService::new(
                "app_service",
                ServiceCategory::Compute,
                0.9,
                1,
                DetectionSource::Pattern,
            )],
            aggregate_confidence: 0.9,
            high_confidence_types: vec!["app_service".to_string()],
        };

        assert_eq!(scan.detected_count(), 1);
        assert!(scan.contains("app_service"));
        assert!(!scan.contains("sql_database"));
    }

    #[test]
    fn test_extracted_content_round_trip() {
        let content = ExtractedContent::new(ContentKind::Pdf, "some text", "diagram.pdf");
        let json = serde_json::to_string(&content).unwrap();
        let back: ExtractedContent = serde_json::from_str(&json).unwrap();

        assert_eq!(back.kind, ContentKind::Pdf);
        assert_eq!(back.text, "some text");
        assert_eq!(back.filename(), "diagram.pdf");
    }

    #[test]
    fn test_extracted_content_tolerates_missing_metadata() {
        let back: ExtractedContent =
            serde_json::from_str(r#"{"kind": "text", "text": "hello"}"#).unwrap();
        assert_eq!(back.filename(), "");
    }
}
