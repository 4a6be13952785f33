pub mod ai_service;
pub mod models;

pub use ai_service::{AiProvider, EnrichmentService};
pub use models::{
    AiConfig, AiMessage, AiProviderResponse, Enrichment, GeminiAnalysis, ResponseFormat,
    SchemaNode,
};
