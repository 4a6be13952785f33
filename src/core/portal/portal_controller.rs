// =============================================================================
// PORTAL CONTROLLER
// =============================================================================
//
// Sequences the portal flow: accept a config -> list the folder -> ask the
// AI for a welcome message, plus the per-file detail view.
//
// **Staleness:** every flow takes a generation number when it starts. A
// reconfigure/reset bumps the folder generation; opening or closing the
// detail view bumps the detail generation. Async results are only applied
// while their generation is still current, and the check happens under the
// same write lock that bumps it, so a late answer for an old folder or a
// closed detail view is dropped instead of overwriting newer state.
//
// The welcome message is spawned as its own task once the listing is in, so
// the file grid is usable before the AI has answered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::portal_models::{AppConfig, ViewMode};
use crate::core::ai::{AiProvider, Enrichment, EnrichmentService, GeminiAnalysis};
use crate::core::drive::{DriveError, DriveFile, DriveListing};

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("No portal configuration loaded")]
    NotConfigured,
    #[error("No file with id {0} in this folder")]
    UnknownFile(String),
    #[error(transparent)]
    Listing(#[from] DriveError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PortalPhase {
    #[default]
    Unconfigured,
    Loading,
    Ready,
    /// The listing failed; holds the message to show.
    Failed(String),
}

/// The file open in the detail view. `analysis` is `None` while loading.
#[derive(Debug, Clone)]
pub struct FileDetail {
    pub file: Arc<DriveFile>,
    pub analysis: Option<Enrichment<GeminiAnalysis>>,
}

/// Everything the view needs to draw the portal.
#[derive(Debug, Clone, Default)]
pub struct PortalState {
    pub config: Option<AppConfig>,
    pub phase: PortalPhase,
    pub files: Vec<Arc<DriveFile>>,
    pub welcome: Option<Enrichment<String>>,
    pub welcome_loading: bool,
    pub view_mode: ViewMode,
    pub detail: Option<FileDetail>,
}

pub enum LoadOutcome {
    Loaded {
        file_count: usize,
        /// Resolves once the welcome message has been applied (or dropped).
        welcome: JoinHandle<()>,
    },
    /// The config changed while the listing was in flight; nothing was applied.
    Stale,
}

pub struct PortalController<L: DriveListing, P: AiProvider> {
    listing: L,
    enrichment: EnrichmentService<P>,
    state: RwLock<PortalState>,
    generation: AtomicU64,
    detail_generation: AtomicU64,
}

impl<L, P> PortalController<L, P>
where
    L: DriveListing + 'static,
    P: AiProvider + 'static,
{
    pub fn new(listing: L, enrichment: EnrichmentService<P>) -> Self {
        Self {
            listing,
            enrichment,
            state: RwLock::new(PortalState::default()),
            generation: AtomicU64::new(0),
            detail_generation: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> PortalState {
        self.state.read().await.clone()
    }

    /// Loads a folder. Replaces whatever was shown before.
    ///
    /// Listing failures put the portal in [`PortalPhase::Failed`] and are
    /// returned; they never take the process down.
    pub async fn configure(self: &Arc<Self>, config: AppConfig) -> Result<LoadOutcome, PortalError> {
        let generation = {
            let mut state = self.state.write().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.detail_generation.fetch_add(1, Ordering::SeqCst);
            let view_mode = state.view_mode;
            *state = PortalState {
                config: Some(config.clone()),
                phase: PortalPhase::Loading,
                view_mode,
                ..Default::default()
            };
            generation
        };

        tracing::info!(
            "Loading shared folder {} for {}",
            config.folder_id(),
            config.client_name()
        );

        let result = self
            .listing
            .list_files(config.folder_id(), config.drive_api_key())
            .await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding listing for superseded config (generation {})", generation);
            return Ok(LoadOutcome::Stale);
        }

        let files: Vec<Arc<DriveFile>> = match result {
            Ok(files) => files.into_iter().map(Arc::new).collect(),
            Err(e) => {
                tracing::error!("Failed to list folder {}: {}", config.folder_id(), e);
                state.phase = PortalPhase::Failed(e.message());
                return Err(e.into());
            }
        };

        let file_count = files.len();
        tracing::info!("Listed {} item(s) in folder {}", file_count, config.folder_id());

        state.files = files.clone();
        state.phase = PortalPhase::Ready;
        state.welcome_loading = true;
        drop(state);

        let controller = Arc::clone(self);
        let client_name = config.client_name().to_string();
        let welcome = tokio::spawn(async move {
            controller.apply_welcome(generation, client_name, files).await;
        });

        Ok(LoadOutcome::Loaded {
            file_count,
            welcome,
        })
    }

    async fn apply_welcome(&self, generation: u64, client_name: String, files: Vec<Arc<DriveFile>>) {
        let message = self.enrichment.welcome_message(&client_name, &files).await;
        if let Some(reason) = message.fallback_reason() {
            tracing::debug!("Using fixed welcome message: {:?}", reason);
        }

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding welcome message for generation {}", generation);
            return;
        }
        state.welcome = Some(message);
        state.welcome_loading = false;
    }

    /// Lists the current folder again.
    pub async fn reload(self: &Arc<Self>) -> Result<LoadOutcome, PortalError> {
        let config = self
            .state
            .read()
            .await
            .config
            .clone()
            .ok_or(PortalError::NotConfigured)?;
        self.configure(config).await
    }

    /// Drops the current config and everything derived from it. In-flight
    /// listing, welcome and analysis requests are discarded when they land.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.detail_generation.fetch_add(1, Ordering::SeqCst);
        let view_mode = state.view_mode;
        *state = PortalState {
            view_mode,
            ..Default::default()
        };
    }

    pub async fn set_view_mode(&self, mode: ViewMode) {
        self.state.write().await.view_mode = mode;
    }

    /// Opens the detail view for a listed file and fetches its analysis.
    ///
    /// Returns `Ok(None)` when the view was closed or switched to another file
    /// before the analysis arrived.
    pub async fn open_file(
        &self,
        file_id: &str,
    ) -> Result<Option<Enrichment<GeminiAnalysis>>, PortalError> {
        let (file, client_name, generation) = {
            let mut state = self.state.write().await;
            let client_name = state
                .config
                .as_ref()
                .ok_or(PortalError::NotConfigured)?
                .client_name()
                .to_string();
            let file = state
                .files
                .iter()
                .find(|f| f.id == file_id)
                .cloned()
                .ok_or_else(|| PortalError::UnknownFile(file_id.to_string()))?;

            let generation = self.detail_generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.detail = Some(FileDetail {
                file: Arc::clone(&file),
                analysis: None,
            });
            (file, client_name, generation)
        };

        tracing::debug!("Analyzing {} file {}", file.category(), file.id);
        let analysis = self.enrichment.analyze_file(&file, &client_name).await;

        let mut state = self.state.write().await;
        if self.detail_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding analysis for closed detail view of {}", file.id);
            return Ok(None);
        }
        if let Some(detail) = state.detail.as_mut() {
            detail.analysis = Some(analysis.clone());
        }
        Ok(Some(analysis))
    }

    pub async fn close_detail(&self) {
        let mut state = self.state.write().await;
        self.detail_generation.fetch_add(1, Ordering::SeqCst);
        state.detail = None;
    }
}
