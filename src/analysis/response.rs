//! AI response parsing
//!
//! Turns free-form model output into an [`AiAnalysis`]. Models wrap JSON in
//! prose or markdown fences more often than not, so extraction is tolerant;
//! missing fields default instead of erroring. Only undecodable JSON is a
//! parse failure.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{DetectedService, DetectionSource, Relationship, ServiceCategory};

/// Confidence assigned to AI components that arrive without one
pub const AI_DEFAULT_CONFIDENCE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
}

/// Structured view of one model answer
#[derive(Debug, Clone, Default)]
pub struct AiAnalysis {
    pub components: Vec<DetectedService>,
    pub relationships: Vec<Relationship>,
    pub network_topology: Option<Value>,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    components: Vec<RawComponent>,
    #[serde(default)]
    relationships: Vec<RawRelationship>,
    #[serde(default)]
    network_topology: Option<Value>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    service_type: String,
    #[serde(default)]
    category: Option<String>,
    confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawRelationship {
    #[serde(default)]
    source: String,
    #[serde(default)]
    target: String,
    #[serde(rename = "type", default)]
    relationship_type: String,
    #[serde(default)]
    description: Option<String>,
}

pub fn parse_analysis_response(response: &str) -> Result<AiAnalysis, ParseError> {
    debug!("Parsing analysis response ({} chars)", response.len());

    let json_str = extract_json_from_response(response)?;

    let raw: RawAnalysis = serde_json::from_str(&json_str).map_err(|e| {
        warn!("JSON parse error: {}", e);
        ParseError::InvalidJson(format!(
            "{}: {}",
            e,
            json_str.chars().take(100).collect::<String>()
        ))
    })?;

    let components: Vec<DetectedService> = raw
        .components
        .into_iter()
        .filter(|c| !c.service_type.trim().is_empty())
        .map(convert_component)
        .collect();

    let relationships: Vec<Relationship> = raw
        .relationships
        .into_iter()
        .filter(|r| !r.source.trim().is_empty() && !r.target.trim().is_empty())
        .map(|r| {
            let rel = Relationship::new(r.source.trim(), r.target.trim(), &r.relationship_type);
            match r.description {
                Some(description) => rel.with_description(description),
                None => rel,
            }
        })
        .collect();

    debug!(
        components = components.len(),
        relationships = relationships.len(),
        "parsed analysis response"
    );

    Ok(AiAnalysis {
        components,
        relationships,
        network_topology: raw.network_topology,
        summary: raw.summary,
    })
}

fn convert_component(raw: RawComponent) -> DetectedService {
    let confidence_raw = raw.confidence.unwrap_or(AI_DEFAULT_CONFIDENCE);
    let confidence = confidence_raw.clamp(0.0, 1.0);
    if confidence != confidence_raw {
        warn!(
            "Confidence value {} was out of range, clamped to {}",
            confidence_raw, confidence
        );
    }

    let category = raw
        .category
        .as_deref()
        .and_then(ServiceCategory::parse)
        .unwrap_or(ServiceCategory::Other);

    let service = DetectedService::new(
        raw.service_type.trim(),
        category,
        confidence,
        1,
        DetectionSource::Ai,
    );
    if raw.name.trim().is_empty() {
        service
    } else {
        service.with_display_name(raw.name.trim())
    }
}

pub fn extract_json_from_response(response: &str) -> Result<String, ParseError> {
    let trimmed = response.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Ok(trimmed.to_string());
    }

    if trimmed.contains("```") {
        return extract_from_markdown_block(trimmed);
    }

    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            if start < end {
                return Ok(trimmed[start..=end].to_string());
            }
        }
    }

    Err(ParseError::InvalidJson(
        "No JSON object found in response".to_string(),
    ))
}

fn extract_from_markdown_block(text: &str) -> Result<String, ParseError> {
    let re = Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").unwrap();

    if let Some(captures) = re.captures(text) {
        if let Some(json_match) = captures.get(1) {
            let json = json_match.as_str().trim();
            if json.starts_with('{') && json.ends_with('}') {
                return Ok(json.to_string());
            }
        }
    }

    Err(ParseError::InvalidJson(
        "Could not extract JSON from markdown block".to_string(),
    ))
}
