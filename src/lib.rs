//! archlens - AI-assisted architecture diagram analysis
//!
//! This library turns text extracted from architecture diagrams into a
//! structured inventory of cloud components and their relationships. It
//! combines fast pattern matching with Large Language Model (LLM) analysis,
//! choosing between the two per request based on how much the patterns
//! already explain.
//!
//! # Core Concepts
//!
//! - **Platform Gate**: Content mentioning a competing cloud platform more
//!   strongly than the supported one is rejected before any LLM spend
//! - **Analysis Strategies**: `FastPath` (patterns only), `AiEnhanced`
//!   (single LLM call), and `ParallelHybrid` (concurrent category scans
//!   plus an LLM confirmation pass) selected per request
//! - **Reconciliation**: Pattern and LLM findings are merged, deduplicated
//!   by canonical component type, and scored into a single result
//!
//! # Example Usage
//!
//! ```ignore
//! use archlens::{AnalysisService, ArchlensConfig};
//! use archlens::analysis::types::{ContentKind, ExtractedContent};
//!
//! async fn analyze_diagram(text: String) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ArchlensConfig::from_env()?;
//!     let service = AnalysisService::new(&config).await?;
//!
//!     let content = ExtractedContent::new(ContentKind::Text, text, "diagram.txt");
//!     let outcome = service.analyze(&content).await?;
//!
//!     if let Some(result) = outcome.result() {
//!         for component in &result.components {
//!             println!("{} ({})", component.name, component.component_type);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`analysis`]: Validation, detection, strategy selection, and the
//!   analysis pipeline itself
//! - [`cache`]: Fingerprint-keyed LRU cache for completed results
//! - [`cli`]: Command-line argument parsing, handlers, and output formatting
//! - [`config`]: Environment-driven runtime configuration
//! - [`llm`]: LLM client abstraction and the genai-backed implementation
//! - [`util`]: Logging setup
//!
//! # Features
//!
//! - Multi-provider LLM support through a single client interface
//! - Tiered pattern detection with confidence scoring
//! - Concurrent per-category analysis with bounded timeouts
//! - Graceful degradation when the LLM reply is unusable
//! - Result caching keyed by content fingerprint

// Public modules
pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod llm;
pub mod util;

// Re-export key types for convenient access
pub use analysis::service::{AnalysisError, AnalysisOutcome, AnalysisService};
pub use analysis::types::{AnalysisResult, ContentKind, ExtractedContent, ValidationVerdict};
pub use cache::{fingerprint, CacheStats, LruResultCache, ResultCache};
pub use config::{ArchlensConfig, ConfigError};
pub use llm::{BackendError, GenAIClient, LLMClient};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
