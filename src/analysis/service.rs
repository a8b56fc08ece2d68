//! Analysis service orchestration
//!
//! This module provides the high-level `AnalysisService` that drives one
//! diagram analysis from extracted text to a reconciled result.
//!
//! # Architecture
//!
//! The service runs a fixed pipeline per request:
//! 1. Checks the result cache by content fingerprint
//! 2. Validates the content against the platform gate
//! 3. Runs the quick pattern scan and picks an execution strategy
//! 4. Executes the strategy (heuristics only, or heuristics plus one AI call)
//! 5. Reconciles all candidate detections into the final result
//!
//! ```text
//! AnalysisService
//!   ├── LruResultCache (fingerprint keyed, shared across requests)
//!   ├── QuickDetector (tiered pattern scan)
//!   ├── category dispatch (six concurrent analyzers, hybrid path only)
//!   └── LLMClient (one chat call at most per request)
//! ```
//!
//! # Thread Safety
//!
//! The service is thread-safe and can be shared across tasks using `Arc`.
//!
//! # Example
//!
//! ```no_run
//! use archlens::analysis::service::AnalysisService;
//! use archlens::analysis::types::{ContentKind, ExtractedContent};
//! use archlens::ArchlensConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ArchlensConfig::from_env()?;
//! let service = AnalysisService::new(&config).await?;
//!
//! let content = ExtractedContent::new(
//!     ContentKind::Text,
//!     "App Service connected to SQL Database",
//!     "diagram.txt",
//! );
//! let outcome = service.analyze(&content).await?;
//!
//! if let Some(result) = outcome.result() {
//!     println!("{} components found", result.components.len());
//! }
//! # Ok(())
//! # }
//! ```

use crate::cache::{fingerprint, CacheStats, LruResultCache, ResultCache};
use crate::config::ArchlensConfig;
use crate::llm::{ChatMessage, LLMClient, LLMRequest, LLMResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::dispatch::{dispatch_category_analyzers, flatten_category_results};
use super::normalize::reconcile;
use super::prompt::{
    build_analysis_prompt, build_hybrid_prompt, HYBRID_SYSTEM_PROMPT, SYSTEM_PROMPT,
};
use super::quick::QuickDetector;
use super::relationships::infer_relationships;
use super::response::{parse_analysis_response, AiAnalysis};
use super::strategy::{select_strategy, StrategyPolicy};
use super::types::{
    AnalysisResult, AnalysisStrategy, DetectedService, ExtractedContent, ValidationVerdict,
};
use super::validation::validate_content;

/// Sampling temperature for every analysis call
const ANALYSIS_TEMPERATURE: f32 = 0.1;

/// Completion token cap for the single-call enhanced analysis
const ANALYSIS_MAX_TOKENS: u32 = 2500;

/// Completion token cap for the hybrid confirmation call
const HYBRID_MAX_TOKENS: u32 = 2000;

/// Errors that can occur during analysis service operations
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Configuration or client setup failed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The extraction layer produced neither text nor a filename
    #[error("Nothing to analyze: extracted content has no text and no filename")]
    EmptyInput,
}

impl AnalysisError {
    /// Returns a user-friendly error message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            AnalysisError::ConfigError(msg) => {
                format!(
                    "Error: Configuration error\n\n\
                    Help: Configuration or LLM client setup failed. Try:\n\
                    - Check ARCHLENS_* environment variables\n\
                    - Verify provider credentials (OPENAI_API_KEY, ANTHROPIC_API_KEY, ...)\n\
                    - For Ollama, make sure the server is running: ollama serve\n\n\
                    Details: {}",
                    msg
                )
            }
            AnalysisError::EmptyInput => "Error: Nothing to analyze\n\n\
                Help: The extraction layer produced neither text nor a filename.\n\
                Check that the uploaded diagram is readable and was extracted correctly."
                .to_string(),
        }
    }
}

/// Outcome of one analysis request
///
/// A request that fails the platform gate is rejected with the verdict;
/// everything else completes with a reconciled result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The platform gate refused the content
    Rejected(ValidationVerdict),
    /// Analysis ran to completion
    Completed(AnalysisResult),
}

impl AnalysisOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, AnalysisOutcome::Rejected(_))
    }

    /// The completed result, if the content passed the platform gate
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisOutcome::Completed(result) => Some(result),
            AnalysisOutcome::Rejected(_) => None,
        }
    }
}

/// High-level service that orchestrates the analysis workflow
pub struct AnalysisService {
    /// LLM client for the AI-assisted strategies
    client: Arc<dyn LLMClient>,
    /// Result cache keyed by content fingerprint
    cache: Arc<dyn ResultCache>,
    /// Tiered pattern detector shared across requests
    detector: QuickDetector,
    /// Strategy selection thresholds
    policy: StrategyPolicy,
    /// Deadline for each category analyzer task
    category_timeout: Duration,
}

impl std::fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisService")
            .field("client", &self.client.name())
            .finish()
    }
}

impl AnalysisService {
    /// Creates a new analysis service from configuration
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::ConfigError` if the LLM client cannot be
    /// initialized from the configuration.
    pub async fn new(config: &ArchlensConfig) -> Result<Self, AnalysisError> {
        info!("Initializing analysis service");

        let client = config
            .create_client()
            .await
            .map_err(|e| AnalysisError::ConfigError(e.to_string()))?;

        info!(
            "Analysis service initialized with provider: {}",
            client.name()
        );

        Ok(Self::with_client(client, config))
    }

    /// Creates a new analysis service with a pre-configured LLM client
    ///
    /// Useful for testing with mock clients and for custom client setups.
    pub fn with_client(client: Arc<dyn LLMClient>, config: &ArchlensConfig) -> Self {
        let cache = Arc::new(LruResultCache::new(config.cache_capacity));
        Self::with_parts(client, cache, config)
    }

    /// Creates a new analysis service with explicit client and cache
    /// implementations
    pub fn with_parts(
        client: Arc<dyn LLMClient>,
        cache: Arc<dyn ResultCache>,
        config: &ArchlensConfig,
    ) -> Self {
        Self {
            client,
            cache,
            detector: QuickDetector::new(),
            policy: config.strategy_policy(),
            category_timeout: config.category_timeout(),
        }
    }

    /// Analyzes one piece of extracted diagram content
    ///
    /// This is the main entry point. It consults the result cache, validates
    /// the platform, selects and executes a strategy, and reconciles the
    /// detections into the final result. Completed results are cached;
    /// rejections are not.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::EmptyInput` when the content carries neither
    /// text nor a filename. LLM transport and parse failures do not surface
    /// as errors; the analysis falls back to its heuristic result instead.
    pub async fn analyze(
        &self,
        content: &ExtractedContent,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let start = Instant::now();

        if content.text.trim().is_empty() && content.filename().trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let print = fingerprint(&content.text, content.filename());
        if let Some(hit) = self.cache.get(&print) {
            return Ok(AnalysisOutcome::Completed(hit));
        }

        let text_len = content.text.chars().count();
        info!(
            filename = content.filename(),
            kind = %content.kind,
            chars = text_len,
            "Starting diagram analysis"
        );

        let verdict = validate_content(content);
        if !verdict.is_supported_platform {
            info!(
                platforms = ?verdict.detected_platforms,
                "Content rejected by platform validation"
            );
            return Ok(AnalysisOutcome::Rejected(verdict));
        }

        let scan = self.detector.scan(&content.text);
        let strategy = select_strategy(
            text_len,
            scan.detected_count(),
            scan.aggregate_confidence,
            &self.policy,
        );

        let (candidates, relationships, tokens, degraded, summary) = match strategy {
            AnalysisStrategy::FastPath => (scan.services, Vec::new(), 0, false, None),
            AnalysisStrategy::AiEnhanced => {
                let (ai, tokens, degraded) = self.run_full_analysis(&content.text).await;
                let mut candidates = scan.services;
                candidates.extend(ai.components);
                (candidates, ai.relationships, tokens, degraded, ai.summary)
            }
            AnalysisStrategy::ParallelHybrid => {
                let per_category =
                    dispatch_category_analyzers(&content.text, self.category_timeout).await;
                let mut candidates = flatten_category_results(per_category);
                candidates.extend(scan.services);

                let (ai, tokens, degraded) =
                    self.run_hybrid_confirmation(&content.text, &candidates).await;
                candidates.extend(ai.components);
                (candidates, ai.relationships, tokens, degraded, ai.summary)
            }
        };

        let mut result = reconcile(candidates, relationships, strategy, tokens, degraded, summary);

        if result.relationships.is_empty() && !result.components.is_empty() {
            result.relationships = infer_relationships(&result.components);
            debug!(
                inferred = result.relationships.len(),
                "no usable relationships from the model, applied connection rules"
            );
        }

        self.cache.set(print, result.clone());

        let elapsed = start.elapsed();
        info!(
            "Analysis completed in {:.2}s: {} components via {} with {:.1}% confidence",
            elapsed.as_secs_f64(),
            result.components.len(),
            result.strategy_used,
            result.aggregate_confidence * 100.0
        );

        Ok(AnalysisOutcome::Completed(result))
    }

    /// Single rich analysis call used by the AI-enhanced strategy
    async fn run_full_analysis(&self, text: &str) -> (AiAnalysis, u32, bool) {
        let request = LLMRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_analysis_prompt(text)),
        ])
        .with_temperature(ANALYSIS_TEMPERATURE)
        .with_max_tokens(ANALYSIS_MAX_TOKENS);

        self.exchange(request).await
    }

    /// Confirmation call over pre-detected components, hybrid strategy only
    async fn run_hybrid_confirmation(
        &self,
        text: &str,
        detected: &[DetectedService],
    ) -> (AiAnalysis, u32, bool) {
        let request = LLMRequest::new(vec![
            ChatMessage::system(HYBRID_SYSTEM_PROMPT),
            ChatMessage::user(build_hybrid_prompt(text, detected)),
        ])
        .with_temperature(ANALYSIS_TEMPERATURE)
        .with_max_tokens(HYBRID_MAX_TOKENS);

        self.exchange(request).await
    }

    /// Executes one chat exchange and digests the reply.
    ///
    /// Returns the parsed analysis, the tokens billed, and whether the reply
    /// was received but unusable. A transport failure yields an empty
    /// analysis with zero tokens and no degraded flag.
    async fn exchange(&self, request: LLMRequest) -> (AiAnalysis, u32, bool) {
        match self.client.chat(request).await {
            Ok(reply) => Self::digest_reply(&reply),
            Err(e) => {
                warn!(
                    error = %e,
                    client = self.client.name(),
                    "LLM request failed, continuing with heuristic analysis only"
                );
                (AiAnalysis::default(), 0, false)
            }
        }
    }

    fn digest_reply(reply: &LLMResponse) -> (AiAnalysis, u32, bool) {
        let tokens = reply.tokens_used.unwrap_or(0);
        match parse_analysis_response(&reply.content) {
            Ok(analysis) => {
                if let Some(topology) = &analysis.network_topology {
                    debug!(%topology, "network topology reported by the model");
                }
                (analysis, tokens, false)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "unusable model reply, keeping heuristic components only"
                );
                (AiAnalysis::default(), tokens, true)
            }
        }
    }

    /// Returns the name of the LLM client being used
    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// Returns model information for the LLM client
    pub fn client_model_info(&self) -> Option<String> {
        self.client.model_info()
    }

    /// Hit and miss counters of the result cache
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
