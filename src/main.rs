// This is the entry point of the client portal.
//
// **Architecture Overview:**
// - `core/` = Portal logic (config codec, file classification, AI enrichment)
// - `infra/` = Implementations of core traits (Drive and Gemini HTTP clients)
// - `terminal/` = The interactive view (prompts, rendering, commands)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Resolve the portal config (share link, env, or the setup form)
// 4. Hand stdin/stdout to the terminal session

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "terminal/terminal_layer.rs"]
mod terminal;

use std::sync::Arc;

use anyhow::Context as _;
use tokio::io::BufReader;

use crate::core::ai::models::DEFAULT_MODEL;
use crate::core::ai::{AiConfig, EnrichmentService};
use crate::core::portal::{ConfigForm, PortalController};
use crate::infra::ai::GeminiClient;
use crate::infra::drive::DriveApiClient;
use crate::terminal::{resolve_startup_config, PortalSession};

const DEFAULT_PORTAL_BASE_URL: &str = "http://localhost:3000/";

/// Reads an env var, treating blank values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the portal on stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let drive_client = match env_var("DRIVE_API_BASE") {
        Some(base) => DriveApiClient::with_base_url(base),
        None => DriveApiClient::new(),
    };

    let gemini_key = env_var("GEMINI_API_KEY").or_else(|| env_var("API_KEY"));
    let ai_config = AiConfig {
        model: env_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        ..Default::default()
    };
    let enrichment = EnrichmentService::new(gemini_key.map(GeminiClient::new), ai_config);
    // No Gemini key means degraded mode: fixed text instead of AI output.
    if !enrichment.is_enabled() {
        tracing::warn!("GEMINI_API_KEY not set; AI summaries and greetings are disabled");
    }

    let controller = Arc::new(PortalController::new(drive_client, enrichment));

    // ========================================================================
    // PORTAL CONFIG
    // ========================================================================

    let prefill = ConfigForm {
        client_name: env_var("PORTAL_CLIENT_NAME").unwrap_or_default(),
        folder_url: env_var("DRIVE_FOLDER").unwrap_or_default(),
        drive_api_key: env_var("DRIVE_API_KEY").unwrap_or_default(),
    };
    let portal_link = env_var("PORTAL_LINK");
    let initial = resolve_startup_config(portal_link.as_deref(), &prefill);

    let base_url =
        env_var("PORTAL_BASE_URL").unwrap_or_else(|| DEFAULT_PORTAL_BASE_URL.to_string());

    tracing::info!("Starting client portal");

    PortalSession::new(
        controller,
        base_url,
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
    )
    .run(initial, prefill)
    .await
    .context("Terminal session failed")?;

    Ok(())
}
