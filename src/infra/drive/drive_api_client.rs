// =============================================================================
// GOOGLE DRIVE LISTING CLIENT
// =============================================================================
//
// Lists the children of a public Drive folder with the v3 REST API
// (https://developers.google.com/drive/api/reference/rest/v3/files/list).
//
// **Authentication:** API key only, passed as the `key` query parameter. This
// only works for folders shared as "Anyone with the link can view".
//
// **Request shape:**
// - `q`       = `'<folderId>' in parents and trashed = false`
// - `fields`  = fixed projection of the file attributes the portal shows
// - `orderBy` = `folder,name` (folders first, then by name)
//
// One page only. Drive's default page size applies and `nextPageToken` is
// ignored, so very large folders are truncated.

use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode};
use serde::Deserialize;

use crate::core::drive::{DriveError, DriveFile, DriveListing, GENERIC_LISTING_FAILURE};

pub const DRIVE_API_BASE: &str = "https://www.googleapis.com";

const LISTING_FIELDS: &str = "files(id, name, mimeType, thumbnailLink, iconLink, webViewLink, webContentLink, size, createdTime, description)";
const LISTING_ORDER: &str = "folder,name";

/// Success body of `files.list`.
#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Error body Google APIs send with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

pub struct DriveApiClient {
    client: Client,
    base_url: String,
}

impl DriveApiClient {
    pub fn new() -> Self {
        Self::with_base_url(DRIVE_API_BASE)
    }

    /// Points the client somewhere other than googleapis.com (proxies, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Drive search expression selecting the non-trashed children of a folder.
    pub fn folder_query(folder_id: &str) -> String {
        format!("'{}' in parents and trashed = false", folder_id)
    }

    fn listing_request(&self, folder_id: &str, api_key: &str) -> reqwest::Result<Request> {
        let query = Self::folder_query(folder_id);
        self.client
            .get(format!("{}/drive/v3/files", self.base_url))
            .query(&[
                ("q", query.as_str()),
                ("key", api_key),
                ("fields", LISTING_FIELDS),
                ("orderBy", LISTING_ORDER),
            ])
            .build()
    }

    /// Turns a status and body into a listing or the error to show.
    fn interpret_listing(status: StatusCode, body: &str) -> Result<Vec<DriveFile>, DriveError> {
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(body)
                .ok()
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_LISTING_FAILURE.to_string());

            return Err(DriveError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let listing: FileListResponse = serde_json::from_str(body)
            .map_err(|e| DriveError::InvalidResponse(e.to_string()))?;
        Ok(listing.files)
    }
}

impl Default for DriveApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DriveListing for DriveApiClient {
    async fn list_files(
        &self,
        folder_id: &str,
        api_key: &str,
    ) -> Result<Vec<DriveFile>, DriveError> {
        let request = self
            .listing_request(folder_id, api_key)
            .map_err(|e| DriveError::Network(e.to_string()))?;

        // Never log the request URL; it carries the API key.
        tracing::debug!("Listing Drive folder {}", folder_id);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| DriveError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DriveError::Network(e.without_url().to_string()))?;

        let result = Self::interpret_listing(status, &body);
        if let Err(e) = &result {
            tracing::warn!("Drive listing for folder {} failed ({}): {}", folder_id, status, e);
        }
        result
    }
}
