//! Integration tests for the analysis pipeline
//!
//! These tests drive the complete workflow through the public service API
//! with scripted LLM replies, covering each execution strategy and the
//! fallback behavior when the model misbehaves.

use std::sync::Arc;

use archlens::analysis::service::AnalysisService;
use archlens::analysis::strategy::StrategyPolicy;
use archlens::analysis::types::{AnalysisStrategy, ContentKind, ExtractedContent};
use archlens::cache::DEFAULT_CACHE_CAPACITY;
use archlens::config::ArchlensConfig;
use archlens::llm::{BackendError, MockLLMClient, MockResponse};
use genai::adapter::AdapterKind;
use serde_json::json;

fn test_config() -> ArchlensConfig {
    let policy = StrategyPolicy::default();
    ArchlensConfig {
        provider: AdapterKind::Ollama,
        model: "qwen2.5-coder:7b".to_string(),
        llm_timeout_secs: 30,
        category_timeout_secs: 3,
        cache_capacity: DEFAULT_CACHE_CAPACITY,
        fast_path_max_text_len: policy.fast_path_max_text_len,
        fast_path_min_confidence: policy.fast_path_min_confidence,
        hybrid_min_text_len: policy.hybrid_min_text_len,
        hybrid_min_services: policy.hybrid_min_services,
        log_level: "info".to_string(),
    }
}

fn service_with(
    responses: impl IntoIterator<Item = MockResponse>,
) -> (Arc<MockLLMClient>, AnalysisService) {
    let mock = Arc::new(MockLLMClient::new());
    mock.add_responses(responses);
    let service = AnalysisService::with_client(mock.clone(), &test_config());
    (mock, service)
}

fn text_content(text: &str, filename: &str) -> ExtractedContent {
    ExtractedContent::new(ContentKind::Text, text, filename)
}

/// Ambiguous enough for the quick scan (one medium-tier hit) that the
/// service must fall through to the AI-enhanced strategy
const AMBIGUOUS_TEXT: &str = "The checkout frontend talks to a central database for persistence";

/// Scripted model reply for the AI-enhanced flow
fn enhanced_reply() -> serde_json::Value {
    json!({
        "components": [
            {
                "name": "Payment API",
                "type": "app_service",
                "category": "compute",
                "confidence": 0.85
            },
            {
                "name": "Orders DB",
                "type": "sql_database",
                "category": "database",
                "confidence": 0.9
            }
        ],
        "relationships": [
            {
                "source": "Payment API",
                "target": "Orders DB",
                "type": "data_connection",
                "description": "order reads and writes"
            }
        ],
        "network_topology": {"vnets": [], "subnets": []},
        "summary": "Two tier payment stack"
    })
}

/// Long diagram text that forces the parallel hybrid strategy
fn long_hybrid_text() -> String {
    let mut text = String::from(
        "The payment web app writes to a sql database and blob storage \
         behind an application gateway. ",
    );
    while text.chars().count() <= 3000 {
        text.push_str("Each request is metered and billed before settlement completes. ");
    }
    text
}

/// Full AI-enhanced flow:
/// 1. The quick scan finds only a vague database mention
/// 2. One rich analysis call returns components and a relationship
/// 3. Scan and model findings are reconciled into a single result
#[tokio::test]
async fn test_ai_enhanced_flow_merges_scan_and_model() {
    let (mock, service) = service_with(vec![MockResponse::text_with_tokens(
        enhanced_reply().to_string(),
        321,
    )]);

    let outcome = service
        .analyze(&text_content(AMBIGUOUS_TEXT, "checkout.txt"))
        .await
        .unwrap();
    let result = outcome.result().expect("analysis should complete");

    assert_eq!(result.strategy_used, AnalysisStrategy::AiEnhanced);
    assert_eq!(mock.call_count(), 1);
    assert_eq!(result.tokens_consumed, 321);
    assert!(!result.degraded);

    // the model's sql_database (0.9) wins over the medium-tier scan hit (0.6)
    assert_eq!(result.components.len(), 2);
    let db = result.component("sql_database").unwrap();
    assert_eq!(db.display_name, "Orders DB");
    assert!((db.confidence - 0.9).abs() < 1e-6);
    let api = result.component("app_service").unwrap();
    assert_eq!(api.display_name, "Payment API");

    assert_eq!(result.relationships.len(), 1);
    assert_eq!(result.relationships[0].relationship_type, "data_connection");
    assert_eq!(result.summary.as_deref(), Some("Two tier payment stack"));
    assert_eq!(result.accuracy_score, 1.0);
}

/// Hybrid flow:
/// 1. Long text triggers the parallel category analyzers
/// 2. The confirmation call is seeded with everything detected so far
/// 3. The model validates the list and contributes one new component
#[tokio::test]
async fn test_hybrid_flow_confirms_and_extends_detections() {
    let reply = json!({
        "components": [
            {
                "name": "Payment Frontend",
                "type": "app_service",
                "category": "compute",
                "confidence": 0.95
            },
            {
                "name": "Audit Log Store",
                "type": "cosmos_db",
                "category": "database",
                "confidence": 0.82
            }
        ],
        "relationships": [
            {
                "source": "Payment Frontend",
                "target": "Audit Log Store",
                "type": "data_connection"
            }
        ],
        "summary": "Payment platform with audit trail"
    });
    let (mock, service) =
        service_with(vec![MockResponse::text_with_tokens(reply.to_string(), 512)]);

    let outcome = service
        .analyze(&text_content(&long_hybrid_text(), "payment-platform.txt"))
        .await
        .unwrap();
    let result = outcome.result().expect("analysis should complete");

    assert_eq!(result.strategy_used, AnalysisStrategy::ParallelHybrid);
    assert_eq!(mock.call_count(), 1);
    assert_eq!(result.tokens_consumed, 512);

    // pattern hits survive, the model upgrade wins the app_service slot,
    // and the model-only cosmos_db is added
    assert_eq!(result.components.len(), 5);
    for canonical in [
        "app_service",
        "sql_database",
        "storage_account",
        "application_gateway",
        "cosmos_db",
    ] {
        assert!(
            result.component(canonical).is_some(),
            "{} missing from hybrid result",
            canonical
        );
    }
    let app = result.component("app_service").unwrap();
    assert_eq!(app.display_name, "Payment Frontend");
    assert!((app.confidence - 0.95).abs() < 1e-6);

    assert_eq!(result.relationships.len(), 1);
    assert_eq!(result.relationships[0].source_name, "Payment Frontend");

    // the confirmation prompt must carry the pre-detected component list
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].messages[0]
        .content
        .contains("validating and enhancing"));
    let user_prompt = &requests[0].messages[1].content;
    assert!(user_prompt.contains("DETECTED COMPONENTS:"));
    assert!(user_prompt.contains("(app_service)"));
    assert!(user_prompt.contains("(sql_database)"));
}

/// A reply that is prose instead of JSON marks the result degraded and
/// keeps the heuristic detections
#[tokio::test]
async fn test_unusable_reply_degrades_to_heuristics() {
    let (mock, service) = service_with(vec![MockResponse::text_with_tokens(
        "The diagram shows a classic three tier stack.",
        128,
    )]);

    let outcome = service
        .analyze(&text_content(AMBIGUOUS_TEXT, "checkout.txt"))
        .await
        .unwrap();
    let result = outcome.result().expect("analysis should complete");

    assert_eq!(mock.call_count(), 1);
    assert!(result.degraded);
    // tokens were billed even though the reply was unusable
    assert_eq!(result.tokens_consumed, 128);
    assert_eq!(result.components.len(), 1);
    assert!(result.component("sql_database").is_some());
    assert_eq!(result.accuracy_score, 0.0);
}

/// A transport failure is not a degradation: no tokens were billed and the
/// heuristic result stands on its own
#[tokio::test]
async fn test_transport_failure_keeps_heuristic_result() {
    let (mock, service) = service_with(vec![MockResponse::error(BackendError::TimeoutError {
        seconds: 30,
    })]);

    let outcome = service
        .analyze(&text_content(AMBIGUOUS_TEXT, "checkout.txt"))
        .await
        .unwrap();
    let result = outcome.result().expect("analysis should complete");

    assert_eq!(mock.call_count(), 1);
    assert!(!result.degraded);
    assert_eq!(result.tokens_consumed, 0);
    assert!(result.component("sql_database").is_some());
}

/// When the model returns components but no relationships, baseline wiring
/// is inferred from the final component list
#[tokio::test]
async fn test_relationship_backfill_when_model_offers_none() {
    let reply = json!({
        "components": [
            {"name": "Payment API", "type": "app_service", "confidence": 0.85},
            {"name": "Orders DB", "type": "sql_database", "confidence": 0.9}
        ],
        "relationships": []
    });
    let (_, service) = service_with(vec![MockResponse::text(reply.to_string())]);

    let outcome = service
        .analyze(&text_content(AMBIGUOUS_TEXT, "checkout.txt"))
        .await
        .unwrap();
    let result = outcome.result().expect("analysis should complete");

    assert_eq!(result.relationships.len(), 1);
    assert_eq!(result.relationships[0].relationship_type, "data_connection");
    assert_eq!(result.relationships[0].source_name, "Payment API");
    assert_eq!(result.relationships[0].target_name, "Orders DB");
}

/// Repeating a request must be answered from the cache without a second
/// model call
#[tokio::test]
async fn test_completed_analysis_is_cached_across_requests() {
    let (mock, service) = service_with(vec![MockResponse::text_with_tokens(
        enhanced_reply().to_string(),
        321,
    )]);
    let content = text_content(AMBIGUOUS_TEXT, "checkout.txt");

    let first = service.analyze(&content).await.unwrap();
    let second = service.analyze(&content).await.unwrap();

    assert_eq!(mock.call_count(), 1);
    let stats = service.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);

    let first = first.result().unwrap();
    let second = second.result().unwrap();
    assert_eq!(first.components.len(), second.components.len());
    assert_eq!(first.tokens_consumed, second.tokens_consumed);
}

/// The outcome serializes with a status tag so downstream consumers can
/// switch on it without inspecting the payload
#[tokio::test]
async fn test_outcome_wire_format() {
    let (_, service) = service_with(vec![MockResponse::text(enhanced_reply().to_string())]);

    let outcome = service
        .analyze(&text_content(AMBIGUOUS_TEXT, "checkout.txt"))
        .await
        .unwrap();
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["status"], "completed");
    assert_eq!(value["data"]["strategy_used"], "ai_enhanced");
    assert!(value["data"]["components"].is_array());

    let rejected = service
        .analyze(&text_content(
            "An AWS EC2 fleet persisting into DynamoDB behind CloudFront",
            "aws.txt",
        ))
        .await
        .unwrap();
    let value = serde_json::to_value(&rejected).unwrap();

    assert_eq!(value["status"], "rejected");
    assert_eq!(value["data"]["is_supported_platform"], false);
}
