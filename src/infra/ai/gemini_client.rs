// =============================================================================
// GEMINI CLIENT - Google AI Studio API Integration
// =============================================================================
//
// This module provides an implementation of the `AiProvider` trait that
// communicates with Google's Gemini API (https://ai.google.dev/gemini-api/docs).
//
// **Protocol notes:**
// - Authentication: API key is passed as a query parameter (`?key=API_KEY`).
// - Request format: Uses `contents[]` with nested `parts`, and `systemInstruction`
//   is a separate top-level field (not a message with role "system").
// - Structured output: `generationConfig.responseMimeType = "application/json"`
//   plus a `responseSchema` in Gemini's OpenAPI subset (upper-case type names).
// - Response format: Content is at `candidates[0].content.parts[*].text`.
//
// **Environment Variables:**
// - `GEMINI_API_KEY` - Your API key from https://aistudio.google.com/apikey
// - `GEMINI_MODEL`   - Model override (default `gemini-3-flash-preview`)

use crate::core::ai::{
    AiConfig, AiMessage, AiProvider, AiProviderResponse, ResponseFormat, SchemaNode,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

// =============================================================================
// GEMINI API DATA STRUCTURES
// =============================================================================
//
// These structs model the Gemini API request/response format.
// See: https://ai.google.dev/api/generate-content

/// A single part of content. Gemini uses a "parts" array to support
/// multimodal content; the portal only ever sends and reads text.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    /// Set on thought-summary parts when thinking output is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

/// Represents a message in the conversation. Maps to our `AiMessage` but
/// uses Gemini's expected format with `parts` array.
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    /// Role: "user" or "model" (Gemini uses "model" instead of "assistant")
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

/// Generation configuration options that control the model's output.
/// See: https://ai.google.dev/api/generate-content#generationconfig
#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    /// Controls randomness. Range: [0.0, 2.0]. Higher = more creative.
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate in the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,

    /// `application/json` for structured output; omitted for free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,

    /// Schema the JSON output must follow.
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

/// The request body sent to the Gemini generateContent endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,

    /// System instruction (optional). This is separate from the conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// A candidate response from the model.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,

    /// Why the model stopped generating (e.g., "STOP", "MAX_TOKENS", "SAFETY").
    finish_reason: Option<String>,
}

/// The response from the Gemini generateContent endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    /// List of candidate responses. Usually just one.
    candidates: Option<Vec<Candidate>>,
}

/// Error response from the Gemini API.
#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorDetail,
}

// =============================================================================
// GEMINI CLIENT IMPLEMENTATION
// =============================================================================

/// Client for interacting with Google's Gemini API.
///
/// # Example
/// ```ignore
/// let client = GeminiClient::new("your-api-key".to_string());
/// let messages = vec![AiMessage::user("Hello!")];
/// let response = client.chat_complete(&messages, &AiConfig::default()).await?;
/// ```
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    fn text_part(text: String) -> Part {
        Part {
            text: Some(text),
            thought: None,
        }
    }

    /// Converts our generic `AiMessage` to Gemini's `Content` format.
    ///
    /// Key transformations:
    /// - "assistant" role → "model" (Gemini's terminology)
    /// - "system" messages are filtered out (handled separately)
    fn convert_message(msg: &AiMessage) -> Content {
        let role = match msg.role.as_str() {
            "assistant" => "model".to_string(),
            other => other.to_string(),
        };

        Content {
            role,
            parts: vec![Self::text_part(msg.content.clone())],
        }
    }

    /// Translates a provider-neutral schema into Gemini's OpenAPI subset.
    fn convert_schema(schema: &SchemaNode) -> Value {
        match schema {
            SchemaNode::String => json!({ "type": "STRING" }),
            SchemaNode::Array(items) => json!({
                "type": "ARRAY",
                "items": Self::convert_schema(items),
            }),
            SchemaNode::Object {
                properties,
                required,
            } => {
                let props: serde_json::Map<String, Value> = properties
                    .iter()
                    .map(|(name, node)| (name.clone(), Self::convert_schema(node)))
                    .collect();
                let ordering: Vec<&str> = properties.iter().map(|(name, _)| name.as_str()).collect();

                json!({
                    "type": "OBJECT",
                    "properties": props,
                    "required": required,
                    "propertyOrdering": ordering,
                })
            }
        }
    }

    fn generation_config(config: &AiConfig) -> GenerationConfig {
        let (response_mime_type, response_schema) = match &config.response_format {
            ResponseFormat::Text => (None, None),
            ResponseFormat::Json(schema) => (
                Some("application/json".to_string()),
                Some(Self::convert_schema(schema)),
            ),
        };

        GenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_tokens,
            response_mime_type,
            response_schema,
        }
    }

    fn build_request(messages: &[AiMessage], config: &AiConfig) -> GenerateContentRequest {
        // Gemini handles system instructions separately from the conversation.
        let system_instruction: Option<Content> = messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| Content {
                role: "user".to_string(),
                parts: vec![Self::text_part(m.content.clone())],
            });

        let contents: Vec<Content> = messages
            .iter()
            .filter(|m| m.role != "system")
            .map(Self::convert_message)
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: Some(Self::generation_config(config)),
        }
    }

    /// Pulls the answer text out of a response, skipping thought parts.
    fn extract_text(
        response: GenerateContentResponse,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or(
                "No content in Gemini response - the model may have been blocked by safety filters",
            )?;

        let content = candidate.content.ok_or_else(|| {
            format!(
                "Gemini returned no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )
        })?;

        let text: String = content
            .parts
            .into_iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text)
            .collect();

        Ok(text)
    }
}

#[async_trait]
impl AiProvider for GeminiClient {
    /// Sends a generateContent request to the Gemini API.
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, config.model);
        let request = Self::build_request(messages, config);

        // Log request for debugging (be careful not to log the API key!)
        tracing::debug!(
            "Gemini request to model {}: {} messages, structured: {}",
            config.model,
            messages.len(),
            matches!(config.response_format, ResponseFormat::Json(_))
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.map_err(|e| e.without_url())?;

            // Try to parse as Gemini error response for better error messages
            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
                return Err(format!(
                    "Gemini API error ({}): {}",
                    status, error_response.error.message
                )
                .into());
            }

            return Err(format!("Gemini API error: {} - {}", status, error_text).into());
        }

        let response_json: GenerateContentResponse =
            response.json().await.map_err(|e| e.without_url())?;
        let content = Self::extract_text(response_json)?;

        tracing::debug!("Gemini response received: {} chars", content.len());

        Ok(AiProviderResponse { content })
    }
}

// =============================================================================
// TESTS
// =============================================================================
