//! Platform validation gate
//!
//! Decides whether extracted diagram content describes the supported platform
//! (Azure) or a competing one before any detection work is spent on it. Pure
//! classification: no retries, no external calls.

use tracing::debug;

use super::types::{ContentKind, ExtractedContent, ValidationVerdict};

/// Image text shorter than this (after trimming) is treated as sparse,
/// switching validation to filename heuristics
const SPARSE_TEXT_THRESHOLD: usize = 50;

/// Divisor converting platform keyword hits into an acceptance confidence
const PLATFORM_HIT_SCALE: f32 = 10.0;

const FOREIGN_IMAGE_REJECT_CONFIDENCE: f32 = 0.9;
const PLATFORM_FILENAME_CONFIDENCE: f32 = 0.7;
const AMBIGUOUS_IMAGE_CONFIDENCE: f32 = 0.5;
const EMPTY_TEXT_CONFIDENCE: f32 = 0.3;
const COMPETING_TEXT_REJECT_CONFIDENCE: f32 = 0.8;

/// Strong foreign-platform tokens checked against sparse image input.
/// Any hit in the filename or OCR text is grounds for rejection on its own.
const STRONG_FOREIGN_TOKENS: &[(&str, &str)] = &[
    ("aws", "AWS"),
    ("amazon web services", "AWS"),
    ("ec2", "AWS"),
    ("s3", "AWS"),
    ("dynamodb", "AWS"),
    ("cloudfront", "AWS"),
    ("route 53", "AWS"),
    ("elastic beanstalk", "AWS"),
    ("lambda function", "AWS"),
    ("gcp", "GCP"),
    ("google cloud", "GCP"),
    ("bigquery", "GCP"),
    ("app engine", "GCP"),
    ("compute engine", "GCP"),
    ("gke", "GCP"),
    ("firebase", "GCP"),
];

/// Filename fragments that mark a diagram as platform-native
const PLATFORM_FILENAME_INDICATORS: &[&str] = &["azure", "az-", "az_", "microsoft"];

/// Keywords counted on the platform side of the ratio check
const PLATFORM_KEYWORDS: &[&str] = &[
    "azure",
    "microsoft",
    "app service",
    "function app",
    "sql database",
    "cosmos",
    "storage account",
    "blob",
    "aks",
    "key vault",
    "active directory",
    "entra",
    "vnet",
    "virtual network",
    "resource group",
    "application gateway",
    "app insights",
    "application insights",
    "service bus",
    "event hub",
    "synapse",
    "front door",
];

/// Keywords counted on the competing side, with platform attribution
const COMPETING_KEYWORDS: &[(&str, &str)] = &[
    ("aws", "AWS"),
    ("amazon", "AWS"),
    ("ec2", "AWS"),
    ("s3 bucket", "AWS"),
    ("lambda", "AWS"),
    ("dynamodb", "AWS"),
    ("cloudfront", "AWS"),
    ("cloudformation", "AWS"),
    ("gcp", "GCP"),
    ("google cloud", "GCP"),
    ("bigquery", "GCP"),
    ("gke", "GCP"),
    ("app engine", "GCP"),
    ("firestore", "GCP"),
    ("pub/sub", "GCP"),
];

/// Classifies extracted content as supported-platform or foreign.
///
/// Sparse image input falls back to filename heuristics; everything else uses
/// a keyword-ratio check over the text. The verdict is terminal for the
/// request.
pub fn validate_content(content: &ExtractedContent) -> ValidationVerdict {
    let text = content.text.to_lowercase();
    let filename = content.metadata.filename.to_lowercase();

    if content.kind == ContentKind::Image && text.trim().chars().count() < SPARSE_TEXT_THRESHOLD {
        return validate_sparse_image(&text, &filename);
    }

    if text.trim().is_empty() {
        debug!("no text to validate, accepting permissively");
        return ValidationVerdict::accepted(EMPTY_TEXT_CONFIDENCE);
    }

    let platform_hits: u32 = PLATFORM_KEYWORDS
        .iter()
        .map(|keyword| text.matches(keyword).count() as u32)
        .sum();

    let mut competing_hits: u32 = 0;
    let mut competing_platforms: Vec<String> = Vec::new();
    for (keyword, platform) in COMPETING_KEYWORDS {
        let count = text.matches(keyword).count() as u32;
        if count > 0 {
            competing_hits += count;
            if !competing_platforms.iter().any(|p| p == platform) {
                competing_platforms.push((*platform).to_string());
            }
        }
    }

    debug!(
        platform_hits,
        competing_hits, "keyword ratio for platform validation"
    );

    if competing_hits > platform_hits && competing_hits > 0 {
        let reason = rejection_reason(&competing_platforms);
        return ValidationVerdict::rejected(
            COMPETING_TEXT_REJECT_CONFIDENCE,
            competing_platforms,
            reason,
        );
    }

    let confidence = (platform_hits as f32 / PLATFORM_HIT_SCALE).min(1.0);
    ValidationVerdict::accepted(confidence)
}

fn validate_sparse_image(text: &str, filename: &str) -> ValidationVerdict {
    let mut foreign_platforms: Vec<String> = Vec::new();
    for (token, platform) in STRONG_FOREIGN_TOKENS {
        if (filename.contains(token) || text.contains(token))
            && !foreign_platforms.iter().any(|p| p == platform)
        {
            foreign_platforms.push((*platform).to_string());
        }
    }

    if !foreign_platforms.is_empty() {
        debug!(?foreign_platforms, "foreign indicators in sparse image input");
        let reason = rejection_reason(&foreign_platforms);
        return ValidationVerdict::rejected(
            FOREIGN_IMAGE_REJECT_CONFIDENCE,
            foreign_platforms,
            reason,
        );
    }

    if PLATFORM_FILENAME_INDICATORS
        .iter()
        .any(|indicator| filename.contains(indicator))
    {
        return ValidationVerdict::accepted(PLATFORM_FILENAME_CONFIDENCE);
    }

    // Ambiguous image input is accepted, not rejected
    ValidationVerdict::accepted(AMBIGUOUS_IMAGE_CONFIDENCE)
}

fn rejection_reason(platforms: &[String]) -> String {
    format!(
        "Detected {} architecture content. This analyzer supports Azure \
         architecture diagrams; please upload an Azure version of the diagram.",
        platforms.join("/")
    )
}
