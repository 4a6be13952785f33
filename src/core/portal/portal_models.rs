use serde::Serialize;
use thiserror::Error;

use super::folder_id::is_folder_id;

/// Client name used when the form leaves it blank.
pub const DEFAULT_CLIENT_NAME: &str = "Valued Client";

/// Problems with user-entered configuration. These block submission and never
/// reach the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a Google Drive API Key.")]
    MissingApiKey,
    #[error("Invalid Google Drive Folder URL or ID.")]
    InvalidFolder,
}

/// Everything the portal needs to show one shared folder.
///
/// Fields are private so a value can only exist once the folder ID has been
/// checked; use [`AppConfig::new`] or decode a share link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    drive_api_key: String,
    folder_id: String,
    client_name: String,
}

impl AppConfig {
    pub fn new(
        client_name: impl Into<String>,
        folder_id: impl Into<String>,
        drive_api_key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let drive_api_key = drive_api_key.into();
        let folder_id = folder_id.into();

        if drive_api_key.trim().is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        if !is_folder_id(&folder_id) {
            return Err(ValidationError::InvalidFolder);
        }

        Ok(Self {
            drive_api_key,
            folder_id,
            client_name: client_name.into(),
        })
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }

    pub fn drive_api_key(&self) -> &str {
        &self.drive_api_key
    }
}

/// How the file collection is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}
