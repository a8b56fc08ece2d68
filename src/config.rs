//! Configuration management for archlens
//!
//! This module provides a configuration system that loads settings from
//! environment variables with sensible defaults. Configuration covers LLM
//! provider selection, analysis strategy thresholds, caching, and timeouts.
//!
//! # Environment Variables
//!
//! ## Archlens Configuration
//! - `ARCHLENS_PROVIDER`: Provider selection (ollama|openai|anthropic|gemini|groq|xai) - default: "ollama"
//! - `ARCHLENS_MODEL`: Model name - default: "qwen2.5-coder:7b" for Ollama
//! - `ARCHLENS_API_BASE_URL`: Custom endpoint URL for OpenAI-compatible servers
//! - `ARCHLENS_LLM_TIMEOUT`: LLM request timeout in seconds - default: "30"
//! - `ARCHLENS_CATEGORY_TIMEOUT`: Per-category analyzer timeout in seconds - default: "3"
//! - `ARCHLENS_CACHE_CAPACITY`: Maximum cached analysis results - default: "200"
//! - `ARCHLENS_FAST_PATH_MAX_LEN`: Text length ceiling (chars) for fast-path analysis - default: "2000"
//! - `ARCHLENS_FAST_PATH_MIN_CONFIDENCE`: Confidence floor for fast-path analysis - default: "0.8"
//! - `ARCHLENS_HYBRID_MIN_LEN`: Text length (chars) that forces parallel hybrid analysis - default: "3000"
//! - `ARCHLENS_HYBRID_MIN_SERVICES`: Detected service count that forces parallel hybrid - default: "5"
//! - `ARCHLENS_LOG_LEVEL`: Logging level - default: "info"
//!
//! ## GenAI Provider Configuration
//! These environment variables are read directly by the genai library:
//! - **Ollama**: `OLLAMA_HOST` (default: http://localhost:11434)
//! - **OpenAI**: `OPENAI_API_KEY` (required)
//! - **Anthropic**: `ANTHROPIC_API_KEY` (required)
//! - **Gemini**: `GEMINI_API_KEY` (required)
//! - **Groq**: `GROQ_API_KEY` (required)
//! - **xAI**: `XAI_API_KEY` (required)
//!
//! # Example
//!
//! ```no_run
//! use archlens::ArchlensConfig;
//! use std::env;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! env::set_var("ARCHLENS_PROVIDER", "ollama");
//!
//! // Load configuration from environment with defaults
//! let config = ArchlensConfig::from_env()?;
//!
//! // Create the LLM client directly from configuration
//! let client = config.create_client().await?;
//! # Ok(())
//! # }
//! ```

use crate::analysis::strategy::StrategyPolicy;
use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::llm::{BackendError, GenAIClient};
use genai::adapter::AdapterKind;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default values for configuration
const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATEGORY_TIMEOUT_SECS: u64 = 3;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// LLM client initialization failed
    #[error("LLM client initialization failed: {0}")]
    ClientInitError(#[from] BackendError),
}

/// Main configuration structure for archlens
///
/// This struct holds all configuration parameters needed for archlens to
/// operate. It can be constructed using `Default::default()` which loads from
/// environment variables with sensible fallback defaults.
#[derive(Debug, Clone)]
pub struct ArchlensConfig {
    /// LLM provider (from genai)
    pub provider: AdapterKind,

    /// Model name to use for inference (provider-specific)
    pub model: String,

    /// LLM request timeout in seconds
    pub llm_timeout_secs: u64,

    /// Per-category analyzer task timeout in seconds
    pub category_timeout_secs: u64,

    /// Maximum number of cached analysis results
    pub cache_capacity: usize,

    /// Text length ceiling in chars for fast-path analysis
    pub fast_path_max_text_len: usize,

    /// Aggregate confidence a fast-path candidate must exceed
    pub fast_path_min_confidence: f32,

    /// Text length in chars that forces parallel hybrid analysis
    pub hybrid_min_text_len: usize,

    /// Detected service count that forces parallel hybrid analysis
    pub hybrid_min_services: usize,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ArchlensConfig {
    /// Creates a new configuration by loading from environment variables with defaults
    ///
    /// This will read ARCHLENS_* environment variables and fall back to sensible
    /// defaults for any missing or unparseable values. Provider credentials are
    /// read by genai through its standard environment variables (OLLAMA_HOST,
    /// OPENAI_API_KEY, etc.).
    fn default() -> Self {
        let provider = env::var("ARCHLENS_PROVIDER")
            .ok()
            .and_then(|s| AdapterKind::from_lower_str(&s.to_lowercase()))
            .unwrap_or(AdapterKind::Ollama);

        // Model configuration - provider-specific defaults
        let model = env::var("ARCHLENS_MODEL")
            .ok()
            .unwrap_or_else(|| match provider {
                AdapterKind::Ollama => DEFAULT_OLLAMA_MODEL.to_string(),
                _ => "default-model".to_string(),
            });

        let llm_timeout_secs = env::var("ARCHLENS_LLM_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS);

        let category_timeout_secs = env::var("ARCHLENS_CATEGORY_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CATEGORY_TIMEOUT_SECS);

        let cache_capacity = env::var("ARCHLENS_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CACHE_CAPACITY);

        // Strategy thresholds
        let policy = StrategyPolicy::default();

        let fast_path_max_text_len = env::var("ARCHLENS_FAST_PATH_MAX_LEN")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(policy.fast_path_max_text_len);

        let fast_path_min_confidence = env::var("ARCHLENS_FAST_PATH_MIN_CONFIDENCE")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(policy.fast_path_min_confidence);

        let hybrid_min_text_len = env::var("ARCHLENS_HYBRID_MIN_LEN")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(policy.hybrid_min_text_len);

        let hybrid_min_services = env::var("ARCHLENS_HYBRID_MIN_SERVICES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(policy.hybrid_min_services);

        // Logging configuration
        let log_level = env::var("ARCHLENS_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            llm_timeout_secs,
            category_timeout_secs,
            cache_capacity,
            fast_path_max_text_len,
            fast_path_min_confidence,
            hybrid_min_text_len,
            hybrid_min_services,
            log_level,
        }
    }
}

impl ArchlensConfig {
    /// Creates a configuration from environment variables and validates it
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    ///
    /// Checks that:
    /// - Numeric values are in valid ranges
    /// - Log level is valid
    ///
    /// Provider-specific validation (API keys, endpoints) is handled by genai
    /// when the client is initialized.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any validation fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name cannot be empty".to_string(),
            ));
        }

        // Validate timeouts are reasonable (at least 1 second, max 10 minutes)
        if self.llm_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "LLM timeout must be at least 1 second".to_string(),
            ));
        }
        if self.llm_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "LLM timeout cannot exceed 10 minutes".to_string(),
            ));
        }
        if self.category_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Category task timeout must be at least 1 second".to_string(),
            ));
        }
        if self.category_timeout_secs > 60 {
            return Err(ConfigError::ValidationFailed(
                "Category task timeout cannot exceed 1 minute".to_string(),
            ));
        }

        if self.cache_capacity == 0 {
            return Err(ConfigError::ValidationFailed(
                "Cache capacity must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.fast_path_min_confidence) {
            return Err(ConfigError::ValidationFailed(format!(
                "Fast-path confidence must be between 0.0 and 1.0, got {}",
                self.fast_path_min_confidence
            )));
        }

        if self.fast_path_max_text_len == 0 || self.hybrid_min_text_len == 0 {
            return Err(ConfigError::ValidationFailed(
                "Strategy text length thresholds must be at least 1".to_string(),
            ));
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Strategy thresholds bundled as a [`StrategyPolicy`]
    pub fn strategy_policy(&self) -> StrategyPolicy {
        StrategyPolicy {
            fast_path_max_text_len: self.fast_path_max_text_len,
            fast_path_min_confidence: self.fast_path_min_confidence,
            hybrid_min_text_len: self.hybrid_min_text_len,
            hybrid_min_services: self.hybrid_min_services,
        }
    }

    /// LLM request timeout as a [`Duration`]
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    /// Per-category analyzer task timeout as a [`Duration`]
    pub fn category_timeout(&self) -> Duration {
        Duration::from_secs(self.category_timeout_secs)
    }

    /// Creates an LLM client based on the configured provider
    ///
    /// Provider-specific configuration (API keys, endpoints) should be set via
    /// standard genai environment variables (OLLAMA_HOST, OPENAI_API_KEY,
    /// ANTHROPIC_API_KEY, etc.).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if client initialization fails
    pub async fn create_client(&self) -> Result<Arc<GenAIClient>, ConfigError> {
        let client =
            GenAIClient::new(self.provider, self.model.clone(), self.llm_timeout()).await?;

        Ok(Arc::new(client))
    }
}

impl fmt::Display for ArchlensConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Archlens Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider.as_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  LLM Timeout: {}s", self.llm_timeout_secs)?;
        writeln!(f, "  Category Task Timeout: {}s", self.category_timeout_secs)?;
        writeln!(f, "  Cache Capacity: {}", self.cache_capacity)?;
        writeln!(
            f,
            "  Fast Path: under {} chars, confidence above {:.2}",
            self.fast_path_max_text_len, self.fast_path_min_confidence
        )?;
        writeln!(
            f,
            "  Parallel Hybrid: over {} chars or more than {} services",
            self.hybrid_min_text_len, self.hybrid_min_services
        )?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
