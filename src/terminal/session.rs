// =============================================================================
// PORTAL SESSION - interactive terminal loop
// =============================================================================
//
// Reads the setup form and then commands line by line, drives the
// `PortalController`, and prints whatever `render` produces. The welcome
// message arrives on its own task; the loop waits on it alongside stdin so
// the file listing is usable before the AI has answered.

use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::task::JoinHandle;

use super::commands::{CommandParseError, PortalCommand, HELP_TEXT};
use super::render;
use crate::core::ai::AiProvider;
use crate::core::drive::DriveListing;
use crate::core::portal::{
    load_from_fragment, share_link, AppConfig, ConfigForm, LoadOutcome, PortalController,
    PortalError,
};

/// Picks the config to start with: a share link first, then form values
/// supplied up front. Returns `None` when the form has to be filled in.
pub fn resolve_startup_config(portal_link: Option<&str>, prefill: &ConfigForm) -> Option<AppConfig> {
    if let Some(config) = portal_link.and_then(load_from_fragment) {
        tracing::info!("Loaded portal config from share link");
        return Some(config);
    }

    if prefill.folder_url.trim().is_empty() && prefill.drive_api_key.trim().is_empty() {
        return None;
    }

    match prefill.validate() {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring pre-filled portal settings: {}", e);
            None
        }
    }
}

enum SessionEvent {
    Input(io::Result<Option<String>>),
    WelcomeReady,
}

async fn wait_for_welcome(pending: &mut Option<JoinHandle<()>>) {
    match pending {
        Some(handle) => {
            if let Err(e) = handle.await {
                tracing::warn!("Welcome message task failed: {}", e);
            }
        }
        None => std::future::pending().await,
    }
}

pub struct PortalSession<L, P, R, W>
where
    L: DriveListing + 'static,
    P: AiProvider + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    controller: Arc<PortalController<L, P>>,
    base_url: String,
    lines: Lines<R>,
    out: W,
    pending_welcome: Option<JoinHandle<()>>,
}

impl<L, P, R, W> PortalSession<L, P, R, W>
where
    L: DriveListing + 'static,
    P: AiProvider + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(
        controller: Arc<PortalController<L, P>>,
        base_url: impl Into<String>,
        input: R,
        out: W,
    ) -> Self {
        Self {
            controller,
            base_url: base_url.into(),
            lines: input.lines(),
            out,
            pending_welcome: None,
        }
    }

    /// Runs until `quit` or end of input.
    pub async fn run(mut self, initial: Option<AppConfig>, prefill: ConfigForm) -> io::Result<()> {
        let config = match initial {
            Some(config) => config,
            None => match self.prompt_form(prefill).await? {
                Some(config) => config,
                None => return Ok(()),
            },
        };

        let outcome = self.controller.configure(config).await;
        self.apply_outcome(outcome).await?;
        writeln!(self.out, "\nType `help` for commands.")?;

        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            let event = tokio::select! {
                _ = wait_for_welcome(&mut self.pending_welcome), if self.pending_welcome.is_some() => {
                    SessionEvent::WelcomeReady
                }
                line = self.lines.next_line() => SessionEvent::Input(line),
            };

            let line = match event {
                SessionEvent::WelcomeReady => {
                    self.pending_welcome = None;
                    self.print_welcome().await?;
                    continue;
                }
                SessionEvent::Input(line) => match line? {
                    Some(line) => line,
                    None => break,
                },
            };

            match line.parse::<PortalCommand>() {
                Ok(command) => {
                    if !self.handle(command).await? {
                        break;
                    }
                }
                Err(CommandParseError::Empty) => {}
                Err(e) => writeln!(self.out, "{}\n{}", e, HELP_TEXT)?,
            }
        }

        Ok(())
    }

    /// Returns `false` when the session should end.
    async fn handle(&mut self, command: PortalCommand) -> io::Result<bool> {
        match command {
            PortalCommand::View(mode) => {
                self.controller.set_view_mode(mode).await;
                self.print_portal().await?;
            }
            PortalCommand::Open(position) => self.open(position).await?,
            PortalCommand::Close => {
                self.controller.close_detail().await;
                self.print_portal().await?;
            }
            PortalCommand::Share => {
                let state = self.controller.snapshot().await;
                match &state.config {
                    Some(config) => writeln!(
                        self.out,
                        "Link ready! Send this URL to your client:\n{}",
                        share_link(&self.base_url, config)
                    )?,
                    None => writeln!(self.out, "Nothing to share yet.")?,
                }
            }
            PortalCommand::Reload => {
                self.pending_welcome = None;
                let outcome = self.controller.reload().await;
                self.apply_outcome(outcome).await?;
            }
            PortalCommand::Config => {
                let previous = self.controller.snapshot().await.config;
                self.controller.reset().await;
                self.pending_welcome = None;

                let prefill = previous
                    .map(|c| ConfigForm {
                        client_name: c.client_name().to_string(),
                        folder_url: c.folder_id().to_string(),
                        drive_api_key: c.drive_api_key().to_string(),
                    })
                    .unwrap_or_default();

                let Some(config) = self.prompt_form(prefill).await? else {
                    return Ok(false);
                };
                let outcome = self.controller.configure(config).await;
                self.apply_outcome(outcome).await?;
            }
            PortalCommand::Help => writeln!(self.out, "{}", HELP_TEXT)?,
            PortalCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    async fn open(&mut self, position: usize) -> io::Result<()> {
        let state = self.controller.snapshot().await;
        let Some(file) = state.files.get(position - 1) else {
            writeln!(self.out, "There is no file number {}.", position)?;
            return Ok(());
        };

        writeln!(self.out, "Opening {}...", file.name)?;
        match self.controller.open_file(&file.id).await {
            Ok(_) => {
                if let Some(detail) = self.controller.snapshot().await.detail {
                    writeln!(self.out, "\n{}", render::render_detail(&detail))?;
                }
            }
            Err(e) => writeln!(self.out, "{}", e)?,
        }
        Ok(())
    }

    async fn apply_outcome(&mut self, outcome: Result<LoadOutcome, PortalError>) -> io::Result<()> {
        match outcome {
            Ok(LoadOutcome::Loaded {
                file_count,
                welcome,
            }) => {
                tracing::debug!("Portal ready with {} item(s)", file_count);
                self.pending_welcome = Some(welcome);
            }
            Ok(LoadOutcome::Stale) => return Ok(()),
            // The controller records the failure; the banner shows it.
            Err(PortalError::Listing(_)) => {}
            Err(e) => {
                writeln!(self.out, "{}", e)?;
                return Ok(());
            }
        }
        self.print_portal().await
    }

    async fn print_portal(&mut self) -> io::Result<()> {
        let state = self.controller.snapshot().await;
        writeln!(self.out, "\n{}", render::render_portal(&state))
    }

    async fn print_welcome(&mut self) -> io::Result<()> {
        let state = self.controller.snapshot().await;
        if state.welcome.is_some() {
            writeln!(self.out, "\n{}", render::render_welcome(&state))?;
        }
        Ok(())
    }

    async fn prompt(&mut self, label: &str, current: &str, secret: bool) -> io::Result<Option<String>> {
        match (current.is_empty(), secret) {
            (true, _) => write!(self.out, "{}: ", label)?,
            (false, true) => write!(self.out, "{} [keep current]: ", label)?,
            (false, false) => write!(self.out, "{} [{}]: ", label, current)?,
        }
        self.out.flush()?;

        let Some(line) = self.lines.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        Ok(Some(if line.is_empty() {
            current.to_string()
        } else {
            line.to_string()
        }))
    }

    /// Asks for the three setup fields until they validate. Blank answers
    /// keep the value shown in brackets. `None` means input ended.
    async fn prompt_form(&mut self, mut form: ConfigForm) -> io::Result<Option<AppConfig>> {
        writeln!(self.out, "Client Portal Setup")?;

        loop {
            let Some(client_name) = self.prompt("Client Name (optional)", &form.client_name, false).await? else {
                return Ok(None);
            };
            let Some(folder_url) = self.prompt("Google Drive Folder URL", &form.folder_url, false).await? else {
                return Ok(None);
            };
            let Some(drive_api_key) = self.prompt("Google Drive API Key", &form.drive_api_key, true).await? else {
                return Ok(None);
            };

            form = ConfigForm {
                client_name,
                folder_url,
                drive_api_key,
            };

            match form.validate() {
                Ok(config) => return Ok(Some(config)),
                Err(e) => writeln!(self.out, "{}", e)?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ai::{AiConfig, AiMessage, AiProviderResponse, EnrichmentService};
    use crate::core::drive::{DriveError, DriveFile};
    use async_trait::async_trait;
    use std::error::Error;
    use tokio::io::BufReader;

    const FOLDER_ID: &str = "1A2b3C4d5E6f7G8h9I0";

    fn file(id: &str, name: &str, mime_type: &str) -> DriveFile {
        DriveFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            thumbnail_link: None,
            icon_link: None,
            web_view_link: None,
            web_content_link: None,
            size: None,
            created_time: None,
            description: None,
        }
    }

    struct StubListing(Result<Vec<DriveFile>, (u16, String)>);

    #[async_trait]
    impl DriveListing for StubListing {
        async fn list_files(
            &self,
            _folder_id: &str,
            _api_key: &str,
        ) -> Result<Vec<DriveFile>, DriveError> {
            self.0.clone().map_err(|(status, message)| DriveError::Api { status, message })
        }
    }

    struct NoAi;

    #[async_trait]
    impl AiProvider for NoAi {
        async fn chat_complete(
            &self,
            _messages: &[AiMessage],
            _config: &AiConfig,
        ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
            Err("not configured".into())
        }
    }

    fn controller(listing: StubListing) -> Arc<PortalController<StubListing, NoAi>> {
        Arc::new(PortalController::new(
            listing,
            EnrichmentService::new(None, AiConfig::default()),
        ))
    }

    fn sample_files() -> StubListing {
        StubListing(Ok(vec![
            file("d1", "Designs", "application/vnd.google-apps.folder"),
            file("f2", "Brief.pdf", "application/pdf"),
        ]))
    }

    fn config() -> AppConfig {
        AppConfig::new("Acme Corp", FOLDER_ID, "AIzaKey").unwrap()
    }

    async fn run_session(
        listing: StubListing,
        initial: Option<AppConfig>,
        input: &'static str,
    ) -> String {
        let mut output = Vec::new();
        let session = PortalSession::new(
            controller(listing),
            "http://localhost:3000/",
            BufReader::new(input.as_bytes()),
            &mut output,
        );
        session.run(initial, ConfigForm::default()).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_browse_open_and_share() {
        let output = run_session(
            sample_files(),
            Some(config()),
            "list\nopen 2\nclose\nshare\nquit\n",
        )
        .await;

        assert!(output.contains("Shared Resources for Acme Corp"));
        assert!(output.contains("  1. [DIR]"));
        assert!(output.contains("Opening Brief.pdf..."));
        assert!(output.contains("Brief.pdf (PDF)"));
        assert!(output.contains("AI services unavailable (Missing API Key)."));
        assert!(output.contains(&share_link("http://localhost:3000/", &config())));
    }

    #[tokio::test]
    async fn test_form_reprompts_until_valid() {
        let input = "Acme\n\nAIzaKey\n\nhttps://drive.google.com/drive/folders/1A2b3C4d5E6f7G8h9I0\n\nquit\n";

        let output = run_session(sample_files(), None, input).await;

        assert!(output.contains("Invalid Google Drive Folder URL or ID."));
        assert!(output.contains("Client Name (optional) [Acme]: "));
        assert!(output.contains("Google Drive API Key [keep current]: "));
        assert!(!output.contains("[AIzaKey]"));
        assert!(output.contains("Shared Resources for Acme"));
    }

    #[tokio::test]
    async fn test_missing_key_reported_first() {
        let output = run_session(sample_files(), None, "\nnot a folder\n\n").await;

        assert!(output.contains("Please enter a Google Drive API Key."));
        assert!(!output.contains("Shared Resources"));
    }

    #[tokio::test]
    async fn test_listing_failure_shows_banner() {
        let listing = StubListing(Err((403, "API key not valid".to_string())));

        let output = run_session(listing, Some(config()), "quit\n").await;

        assert!(output.contains("Access Error"));
        assert!(output.contains("API key not valid"));
        assert!(output.contains(render::RECONFIGURE_HINT));
    }

    #[tokio::test]
    async fn test_bad_input_keeps_loop_running() {
        let output = run_session(sample_files(), Some(config()), "dance\nopen 9\n\nhelp\nquit\n").await;

        assert!(output.contains("Unknown command `dance`."));
        assert!(output.contains("There is no file number 9."));
        assert!(output.matches("Commands:").count() >= 2);
    }

    #[tokio::test]
    async fn test_end_of_input_during_form() {
        let output = run_session(sample_files(), None, "").await;

        assert!(output.contains("Client Portal Setup"));
        assert!(!output.contains("Shared Resources"));
    }

    #[tokio::test]
    async fn test_config_command_reconfigures() {
        let input = "config\nGlobex\n\n\nquit\n";

        let output = run_session(sample_files(), Some(config()), input).await;

        assert!(output.contains("Shared Resources for Acme Corp"));
        assert!(output.contains(&format!("Google Drive Folder URL [{}]: ", FOLDER_ID)));
        assert!(output.contains("Shared Resources for Globex"));
    }

    #[test]
    fn test_startup_prefers_share_link() {
        let link = share_link("http://localhost:3000/", &config());
        let prefill = ConfigForm {
            client_name: "Other".to_string(),
            folder_url: "https://drive.google.com/drive/folders/abc".to_string(),
            drive_api_key: "other-key".to_string(),
        };

        let resolved = resolve_startup_config(Some(&link), &prefill).unwrap();
        assert_eq!(resolved, config());

        // A broken link falls back to the pre-filled form.
        let resolved = resolve_startup_config(Some("http://x/#config=%%%"), &prefill).unwrap();
        assert_eq!(resolved.client_name(), "Other");
        assert_eq!(resolved.folder_id(), "abc");
    }

    #[test]
    fn test_startup_without_settings_needs_form() {
        assert_eq!(resolve_startup_config(None, &ConfigForm::default()), None);

        let incomplete = ConfigForm {
            folder_url: FOLDER_ID.to_string(),
            ..Default::default()
        };
        assert_eq!(resolve_startup_config(None, &incomplete), None);
    }
}
