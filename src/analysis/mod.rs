pub mod categories;
pub mod dispatch;
pub mod normalize;
pub mod patterns;
pub mod prompt;
pub mod quick;
pub mod relationships;
pub mod response;
pub mod service;
pub mod strategy;
pub mod types;
pub mod validation;

pub use service::{AnalysisError, AnalysisOutcome, AnalysisService};
pub use types::{
    AnalysisResult, AnalysisStrategy, ContentKind, DetectedService, ExtractedContent, Relationship,
    ServiceCategory, ValidationVerdict,
};
