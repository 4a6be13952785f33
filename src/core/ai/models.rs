use serde::{Deserialize, Serialize};

/// Model used when `GEMINI_MODEL` isn't set.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiMessage {
    pub role: String,
    pub content: String,
}

impl AiMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Shape of a structured response, in provider-neutral terms. Providers
/// translate it into their own schema dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Array(Box<SchemaNode>),
    Object {
        properties: Vec<(String, SchemaNode)>,
        required: Vec<String>,
    },
}

/// What kind of output to ask the model for.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseFormat {
    /// Free text.
    #[default]
    Text,
    /// A JSON document constrained to the given schema.
    Json(SchemaNode),
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub response_format: ResponseFormat,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            response_format: ResponseFormat::Text,
        }
    }
}

/// Raw response from an AI provider.
#[derive(Debug, Clone, Default)]
pub struct AiProviderResponse {
    /// The generated text. For JSON requests this is the JSON document.
    pub content: String,
}

/// Per-file analysis shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiAnalysis {
    pub summary: String,
    pub tags: Vec<String>,
    pub professional_note: String,
}

impl GeminiAnalysis {
    /// Schema handed to the model so it answers in this exact shape.
    pub fn schema() -> SchemaNode {
        SchemaNode::Object {
            properties: vec![
                ("summary".to_string(), SchemaNode::String),
                (
                    "tags".to_string(),
                    SchemaNode::Array(Box::new(SchemaNode::String)),
                ),
                ("professionalNote".to_string(), SchemaNode::String),
            ],
            required: vec![
                "summary".to_string(),
                "tags".to_string(),
                "professionalNote".to_string(),
            ],
        }
    }
}

/// Why fixed text was used instead of model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No AI credential configured; no request was made.
    MissingCredential,
    /// Nothing to describe; no request was made.
    EmptyFolder,
    /// The provider call failed.
    Upstream(String),
    /// The provider answered, but not in the requested shape.
    MalformedResponse(String),
    /// The provider answered with no text.
    EmptyResponse,
}

/// Result of an AI enrichment. Both arms carry displayable content; callers
/// that care can tell generated text from the fixed fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    Enriched(T),
    Fallback { content: T, reason: FallbackReason },
}

impl<T> Enrichment<T> {
    pub fn fallback(content: T, reason: FallbackReason) -> Self {
        Enrichment::Fallback { content, reason }
    }

    pub fn content(&self) -> &T {
        match self {
            Enrichment::Enriched(content) | Enrichment::Fallback { content, .. } => content,
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, Enrichment::Enriched(_))
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Enrichment::Enriched(_) => None,
            Enrichment::Fallback { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_uses_camel_case_fields() {
        let analysis: GeminiAnalysis = serde_json::from_str(
            r#"{"summary":"Q3 report","tags":["finance"],"professionalNote":"Read before Friday."}"#,
        )
        .unwrap();

        assert_eq!(analysis.professional_note, "Read before Friday.");
        assert_eq!(analysis.tags, vec!["finance".to_string()]);
    }

    #[test]
    fn test_enrichment_accessors() {
        let enriched = Enrichment::Enriched("hello".to_string());
        assert!(enriched.is_enriched());
        assert_eq!(enriched.fallback_reason(), None);

        let fallback = Enrichment::fallback("hi".to_string(), FallbackReason::EmptyResponse);
        assert!(!fallback.is_enriched());
        assert_eq!(fallback.content(), "hi");
        assert_eq!(
            fallback.fallback_reason(),
            Some(&FallbackReason::EmptyResponse)
        );
    }
}
