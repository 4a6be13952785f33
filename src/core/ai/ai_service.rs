use super::models::{
    AiConfig, AiMessage, AiProviderResponse, Enrichment, FallbackReason, GeminiAnalysis,
    ResponseFormat,
};
use crate::core::drive::DriveFile;
use async_trait::async_trait;
use std::borrow::Borrow;
use std::error::Error;

/// How many file names go into the welcome prompt.
const WELCOME_PROMPT_FILE_LIMIT: usize = 10;

const ANALYST_SYSTEM_PROMPT: &str = "You are a professional project manager.";

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Sends a completion request to the AI provider.
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>>;
}

/// Adds AI-written text to the portal. Never fails: when the provider is
/// missing or misbehaves, callers get fixed text marked as a fallback.
pub struct EnrichmentService<P: AiProvider> {
    /// `None` runs in degraded mode (no credential configured).
    provider: Option<P>,
    config: AiConfig,
}

impl<P: AiProvider> EnrichmentService<P> {
    pub fn new(provider: Option<P>, config: AiConfig) -> Self {
        Self { provider, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Writes a one-line summary, tags and a note to the client for one file.
    pub async fn analyze_file(
        &self,
        file: &DriveFile,
        client_name: &str,
    ) -> Enrichment<GeminiAnalysis> {
        let Some(provider) = &self.provider else {
            return Enrichment::fallback(
                unavailable_analysis(),
                FallbackReason::MissingCredential,
            );
        };

        let messages = vec![
            AiMessage::system(ANALYST_SYSTEM_PROMPT),
            AiMessage::user(analysis_prompt(file, client_name)),
        ];
        let config = AiConfig {
            response_format: ResponseFormat::Json(GeminiAnalysis::schema()),
            ..self.config.clone()
        };

        tracing::debug!("Requesting AI analysis for file {}", file.id);

        let response = match provider.chat_complete(&messages, &config).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("AI analysis failed for file {}: {}", file.id, e);
                return Enrichment::fallback(
                    degraded_analysis(),
                    FallbackReason::Upstream(e.to_string()),
                );
            }
        };

        match parse_analysis(&response.content) {
            Ok(analysis) => Enrichment::Enriched(analysis),
            Err(reason) => {
                tracing::warn!("AI analysis for file {} was unusable: {:?}", file.id, reason);
                Enrichment::fallback(degraded_analysis(), reason)
            }
        }
    }

    /// Writes a short greeting for the dashboard based on what's in the folder.
    pub async fn welcome_message<F>(&self, client_name: &str, files: &[F]) -> Enrichment<String>
    where
        F: Borrow<DriveFile> + Sync,
    {
        let Some(provider) = &self.provider else {
            return Enrichment::fallback(
                default_welcome(client_name),
                FallbackReason::MissingCredential,
            );
        };
        if files.is_empty() {
            return Enrichment::fallback(default_welcome(client_name), FallbackReason::EmptyFolder);
        }

        let file_names: Vec<&str> = files
            .iter()
            .take(WELCOME_PROMPT_FILE_LIMIT)
            .map(|f| f.borrow().name.as_str())
            .collect();
        let messages = vec![AiMessage::user(welcome_prompt(client_name, &file_names))];
        let config = AiConfig {
            response_format: ResponseFormat::Text,
            ..self.config.clone()
        };

        match provider.chat_complete(&messages, &config).await {
            Ok(response) => {
                let text = response.content.trim();
                if text.is_empty() {
                    Enrichment::fallback(
                        fallback_welcome(client_name),
                        FallbackReason::EmptyResponse,
                    )
                } else {
                    Enrichment::Enriched(text.to_string())
                }
            }
            Err(e) => {
                tracing::warn!("AI welcome message failed: {}", e);
                Enrichment::fallback(
                    fallback_welcome(client_name),
                    FallbackReason::Upstream(e.to_string()),
                )
            }
        }
    }
}

fn analysis_prompt(file: &DriveFile, client_name: &str) -> String {
    // Drive's own value, not the display form.
    let size = file
        .size
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "Unknown".to_string());

    format!(
        "Analyze this file metadata for a client named \"{client}\".\n\
         \n\
         File Name: {name}\n\
         File Type: {mime}\n\
         Size: {size}\n\
         Created: {created}\n\
         \n\
         Task:\n\
         1. Write a 1-sentence summary of what this file likely contains based on its name and type.\n\
         2. Suggest 3 relevant tags.\n\
         3. Write a short, professional note to the client explaining why this file is important.",
        client = client_name,
        name = file.name,
        mime = file.mime_type,
        size = size,
        created = file.created_time.as_deref().unwrap_or("Unknown"),
    )
}

fn welcome_prompt(client_name: &str, file_names: &[&str]) -> String {
    format!(
        "Write a short, warm, and professional welcome message (max 2 sentences) for a client named \"{}\".\n\
         The shared folder contains: {}.\n\
         Focus on collaboration and ease of access.",
        client_name,
        file_names.join(", ")
    )
}

/// Checks model output against the analysis shape instead of trusting it.
fn parse_analysis(content: &str) -> Result<GeminiAnalysis, FallbackReason> {
    let json = strip_code_fence(content);
    if json.is_empty() {
        return Err(FallbackReason::EmptyResponse);
    }

    let analysis: GeminiAnalysis = serde_json::from_str(json)
        .map_err(|e| FallbackReason::MalformedResponse(e.to_string()))?;

    if analysis.summary.trim().is_empty() {
        return Err(FallbackReason::MalformedResponse("summary is empty".to_string()));
    }
    if analysis.professional_note.trim().is_empty() {
        return Err(FallbackReason::MalformedResponse(
            "professionalNote is empty".to_string(),
        ));
    }

    Ok(analysis)
}

/// Models sometimes wrap JSON in a ```json fence even when asked not to.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn unavailable_analysis() -> GeminiAnalysis {
    GeminiAnalysis {
        summary: "AI services unavailable (Missing API Key).".to_string(),
        tags: Vec::new(),
        professional_note: "Please view the file details below.".to_string(),
    }
}

fn degraded_analysis() -> GeminiAnalysis {
    GeminiAnalysis {
        summary: "Could not generate AI summary.".to_string(),
        tags: vec!["File".to_string()],
        professional_note: "Review the file content directly.".to_string(),
    }
}

fn default_welcome(client_name: &str) -> String {
    format!("Welcome, {}. Here are your shared files.", client_name)
}

fn fallback_welcome(client_name: &str) -> String {
    format!(
        "Welcome, {}. Please find your project files below.",
        client_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::drive::drive_models::FileSize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider that replays a canned answer and records what it was asked.
    struct ScriptedProvider {
        reply: Result<String, String>,
        calls: AtomicUsize,
        last_config: Mutex<Option<AiConfig>>,
        last_messages: Mutex<Vec<AiMessage>>,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Self {
            Self::with(Ok(text.to_string()))
        }

        fn failing(error: &str) -> Self {
            Self::with(Err(error.to_string()))
        }

        fn with(reply: Result<String, String>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_config: Mutex::new(None),
                last_messages: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AiProvider for ScriptedProvider {
        async fn chat_complete(
            &self,
            messages: &[AiMessage],
            config: &AiConfig,
        ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_config.lock().unwrap() = Some(config.clone());
            *self.last_messages.lock().unwrap() = messages.to_vec();
            match &self.reply {
                Ok(text) => Ok(AiProviderResponse {
                    content: text.clone(),
                }),
                Err(e) => Err(e.clone().into()),
            }
        }
    }

    fn file(name: &str) -> DriveFile {
        DriveFile {
            id: format!("id-{}", name),
            name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            thumbnail_link: None,
            icon_link: None,
            web_view_link: None,
            web_content_link: None,
            size: None,
            created_time: None,
            description: None,
        }
    }

    fn enabled(provider: ScriptedProvider) -> EnrichmentService<ScriptedProvider> {
        EnrichmentService::new(Some(provider), AiConfig::default())
    }

    fn disabled() -> EnrichmentService<ScriptedProvider> {
        EnrichmentService::new(None, AiConfig::default())
    }

    #[tokio::test]
    async fn test_analysis_without_credential_skips_provider() {
        let service = disabled();

        let result = service.analyze_file(&file("Brief.pdf"), "Acme").await;

        assert_eq!(
            result.fallback_reason(),
            Some(&FallbackReason::MissingCredential)
        );
        assert_eq!(
            result.content().summary,
            "AI services unavailable (Missing API Key)."
        );
        assert!(result.content().tags.is_empty());
    }

    #[tokio::test]
    async fn test_welcome_without_credential_is_templated() {
        let service = disabled();

        let result = service.welcome_message("Acme", &[file("a.pdf")]).await;

        assert_eq!(
            result,
            Enrichment::fallback(
                "Welcome, Acme. Here are your shared files.".to_string(),
                FallbackReason::MissingCredential
            )
        );
    }

    #[tokio::test]
    async fn test_welcome_for_empty_folder_makes_no_request() {
        let service = enabled(ScriptedProvider::replying("Hello!"));

        let result = service
            .welcome_message::<DriveFile>("Acme", &[])
            .await;

        assert_eq!(result.fallback_reason(), Some(&FallbackReason::EmptyFolder));
        assert_eq!(
            service.provider.as_ref().unwrap().calls.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_analysis_parses_structured_reply() {
        let reply = r#"{"summary":"A project brief.","tags":["brief","plan","q3"],"professionalNote":"Start here."}"#;
        let service = enabled(ScriptedProvider::replying(reply));

        let result = service.analyze_file(&file("Brief.pdf"), "Acme").await;

        assert_eq!(
            result,
            Enrichment::Enriched(GeminiAnalysis {
                summary: "A project brief.".to_string(),
                tags: vec!["brief".to_string(), "plan".to_string(), "q3".to_string()],
                professional_note: "Start here.".to_string(),
            })
        );

        let provider = service.provider.as_ref().unwrap();
        let config = provider.last_config.lock().unwrap().clone().unwrap();
        assert_eq!(
            config.response_format,
            ResponseFormat::Json(GeminiAnalysis::schema())
        );
        let messages = provider.last_messages.lock().unwrap();
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.contains("File Name: Brief.pdf"));
        assert!(messages[1].content.contains("client named \"Acme\""));
    }

    #[tokio::test]
    async fn test_analysis_accepts_fenced_json() {
        let reply = "```json\n{\"summary\":\"Photos.\",\"tags\":[],\"professionalNote\":\"Enjoy.\"}\n```";
        let service = enabled(ScriptedProvider::replying(reply));

        let result = service.analyze_file(&file("pics"), "Acme").await;

        assert!(result.is_enriched());
        assert_eq!(result.content().summary, "Photos.");
    }

    #[tokio::test]
    async fn test_analysis_schema_mismatch_falls_back() {
        let service = enabled(ScriptedProvider::replying(
            r#"{"summary":"Only a summary"}"#,
        ));

        let result = service.analyze_file(&file("Brief.pdf"), "Acme").await;

        assert!(matches!(
            result.fallback_reason(),
            Some(FallbackReason::MalformedResponse(_))
        ));
        assert_eq!(result.content(), &degraded_analysis());
    }

    #[tokio::test]
    async fn test_analysis_provider_error_falls_back() {
        let service = enabled(ScriptedProvider::failing("quota exceeded"));

        let result = service.analyze_file(&file("Brief.pdf"), "Acme").await;

        assert_eq!(
            result.fallback_reason(),
            Some(&FallbackReason::Upstream("quota exceeded".to_string()))
        );
        assert_eq!(result.content().summary, "Could not generate AI summary.");
        assert_eq!(result.content().tags, vec!["File".to_string()]);
        assert_eq!(
            result.content().professional_note,
            "Review the file content directly."
        );
    }

    #[tokio::test]
    async fn test_analysis_blank_reply_is_empty_response() {
        for reply in ["", "  \n ", "```json\n```"] {
            let service = enabled(ScriptedProvider::replying(reply));

            let result = service.analyze_file(&file("Brief.pdf"), "Acme").await;

            assert_eq!(result.fallback_reason(), Some(&FallbackReason::EmptyResponse));
            assert_eq!(result.content(), &degraded_analysis());
        }
    }

    #[tokio::test]
    async fn test_analysis_prompt_sends_drive_size() {
        let mut brief = file("Brief.pdf");
        brief.size = Some(FileSize::Text("2048".to_string()));
        let service = enabled(ScriptedProvider::replying("{}"));

        service.analyze_file(&brief, "Acme").await;
        service.analyze_file(&file("Notes.pdf"), "Acme").await;

        let messages = service.provider.as_ref().unwrap().last_messages.lock().unwrap().clone();
        assert!(messages[1].content.contains("Size: Unknown"));

        let prompt = analysis_prompt(&brief, "Acme");
        assert!(prompt.contains("Size: 2048\n"));
        assert!(!prompt.contains("KB"));
    }

    #[tokio::test]
    async fn test_welcome_prompt_lists_first_ten_files() {
        let files: Vec<DriveFile> = (0..12).map(|i| file(&format!("doc-{}.pdf", i))).collect();
        let service = enabled(ScriptedProvider::replying("  Welcome aboard, Acme!  "));

        let result = service.welcome_message("Acme", &files).await;

        assert_eq!(result, Enrichment::Enriched("Welcome aboard, Acme!".to_string()));

        let messages = service.provider.as_ref().unwrap().last_messages.lock().unwrap().clone();
        assert!(messages[0].content.contains("doc-9.pdf"));
        assert!(!messages[0].content.contains("doc-10.pdf"));
    }

    #[tokio::test]
    async fn test_welcome_failure_and_blank_reply_fall_back() {
        let failing = enabled(ScriptedProvider::failing("boom"));
        let result = failing.welcome_message("Acme", &[file("a.pdf")]).await;
        assert_eq!(
            result.content(),
            "Welcome, Acme. Please find your project files below."
        );

        let blank = enabled(ScriptedProvider::replying("   "));
        let result = blank.welcome_message("Acme", &[file("a.pdf")]).await;
        assert_eq!(result.fallback_reason(), Some(&FallbackReason::EmptyResponse));
    }
}
