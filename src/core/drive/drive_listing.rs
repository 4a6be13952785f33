use async_trait::async_trait;
use thiserror::Error;

use super::drive_models::DriveFile;

/// Message shown when the listing endpoint fails without saying why.
pub const GENERIC_LISTING_FAILURE: &str = "Failed to fetch Drive files";

/// Why a folder listing failed. Every variant is recoverable: the portal
/// shows it in a banner and offers the way back to configuration.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Non-success HTTP status. `message` is the upstream `error.message`
    /// when the body had one, otherwise [`GENERIC_LISTING_FAILURE`].
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never got a response.
    #[error("Could not reach Google Drive: {0}")]
    Network(String),

    /// A success status with a body that isn't a file listing.
    #[error("Unexpected response from Google Drive: {0}")]
    InvalidResponse(String),
}

impl DriveError {
    /// Text to put in front of the user.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Port for listing the direct children of a shared folder.
///
/// One request per call: no retries and no pagination. Folders larger than a
/// single page come back truncated. An empty `Vec` is a successful listing of
/// an empty folder, never an error.
#[async_trait]
pub trait DriveListing: Send + Sync {
    async fn list_files(&self, folder_id: &str, api_key: &str)
        -> Result<Vec<DriveFile>, DriveError>;
}
