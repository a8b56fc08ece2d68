//! Output formatting for multiple formats
//!
//! This module provides formatters for different output formats including
//! JSON, YAML, and human-readable text. Each formatter implements consistent
//! styling and structure.
//!
//! # Example
//!
//! ```ignore
//! use archlens::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format_outcome(&outcome)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};

use crate::analysis::service::AnalysisOutcome;
use crate::analysis::types::{AnalysisResult, ValidationVerdict};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Output formatter for analysis outcomes and validation verdicts
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Creates a new output formatter with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats an analysis outcome according to the configured format
    pub fn format_outcome(&self, outcome: &AnalysisOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(outcome)
                .context("Failed to serialize analysis outcome to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(outcome)
                .context("Failed to serialize analysis outcome to YAML"),
            OutputFormat::Human => Ok(match outcome {
                AnalysisOutcome::Completed(result) => Self::format_result_human(result),
                AnalysisOutcome::Rejected(verdict) => Self::format_rejection_human(verdict),
            }),
        }
    }

    /// Formats a standalone validation verdict
    pub fn format_verdict(&self, verdict: &ValidationVerdict) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(verdict)
                .context("Failed to serialize validation verdict to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(verdict)
                .context("Failed to serialize validation verdict to YAML"),
            OutputFormat::Human => Ok(if verdict.is_supported_platform {
                Self::format_acceptance_human(verdict)
            } else {
                Self::format_rejection_human(verdict)
            }),
        }
    }

    fn header(title: &str) -> String {
        format!("{}\n{}\n\n", title, "\u{2501}".repeat(42))
    }

    fn format_result_human(result: &AnalysisResult) -> String {
        let mut output = String::new();

        if result.degraded {
            output.push_str(&Self::header(
                "\u{26A0} Architecture Analysis (Degraded - AI reply was unusable)",
            ));
        } else {
            output.push_str(&Self::header("\u{2713} Architecture Analysis"));
        }

        output.push_str(&format!("Strategy:     {}\n", result.strategy_used));
        output.push_str(&format!("Tokens Used:  {}\n\n", result.tokens_consumed));

        output.push_str("Components:\n");
        if result.components.is_empty() {
            output.push_str("\u{2514}\u{2500} (none detected)\n");
        } else {
            for (i, component) in result.components.iter().enumerate() {
                let connector = if i == result.components.len() - 1 {
                    "\u{2514}"
                } else {
                    "\u{251C}"
                };
                output.push_str(&format!(
                    "{}\u{2500} {:<24} {} / {}  {:.0}%\n",
                    connector,
                    component.display_name,
                    component.canonical_type,
                    component.category,
                    component.confidence * 100.0
                ));
            }
        }
        output.push('\n');

        output.push_str("Relationships:\n");
        if result.relationships.is_empty() {
            output.push_str("\u{2514}\u{2500} (none detected)\n");
        } else {
            for (i, rel) in result.relationships.iter().enumerate() {
                let connector = if i == result.relationships.len() - 1 {
                    "\u{2514}"
                } else {
                    "\u{251C}"
                };
                output.push_str(&format!(
                    "{}\u{2500} {} -> {}  [{}]\n",
                    connector, rel.source_name, rel.target_name, rel.relationship_type
                ));
            }
        }
        output.push('\n');

        if let Some(ref summary) = result.summary {
            output.push_str(&format!("Summary: {}\n\n", summary));
        }

        let confidence_pct = (result.aggregate_confidence * 100.0) as u8;
        let filled_blocks = ((result.aggregate_confidence * 10.0) as usize).min(10);
        let empty_blocks = 10 - filled_blocks;
        let confidence_bar =
            "\u{2588}".repeat(filled_blocks) + &"\u{2591}".repeat(empty_blocks);
        output.push_str(&format!(
            "Confidence: {} {}% (accuracy score {:.2})\n",
            confidence_bar, confidence_pct, result.accuracy_score
        ));

        output
    }

    fn format_rejection_human(verdict: &ValidationVerdict) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("\u{2717} Content Rejected"));

        if let Some(ref reason) = verdict.rejection_reason {
            output.push_str(&format!("Reason:     {}\n", reason));
        }
        if !verdict.detected_platforms.is_empty() {
            output.push_str(&format!(
                "Platforms:  {}\n",
                verdict.detected_platforms.join(", ")
            ));
        }
        output.push_str(&format!(
            "Confidence: {:.0}%\n",
            verdict.confidence * 100.0
        ));

        output
    }

    fn format_acceptance_human(verdict: &ValidationVerdict) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("\u{2713} Supported Platform"));
        output.push_str(&format!(
            "Confidence: {:.0}%\n",
            verdict.confidence * 100.0
        ));

        output
    }
}
