// =============================================================================
// SHARE LINK CODEC
// =============================================================================
//
// A portal is shared by putting its configuration in the URL fragment:
//
//     https://portal.example.com/#config=<token>
//
// `<token>` is base64 of the JSON object `{driveApiKey, folderId, clientName}`.
// Nothing leaves the browser/terminal; whoever has the link has the config.
//
// Encoding uses the standard alphabet with padding, which is what existing
// links use. Decoding is lenient about the alphabet (standard or URL-safe),
// padding, and percent-encoding picked up when links are pasted around, but
// strict about content: all three fields must be present and valid.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::Deserialize;
use thiserror::Error;

use super::portal_models::{AppConfig, ValidationError};

/// Marker that introduces the token inside the URL fragment.
pub const CONFIG_MARKER: &str = "config=";

/// A share token that can't be turned back into an [`AppConfig`]. Callers
/// treat this as "no configuration", never as fatal.
#[derive(Debug, Error)]
pub enum ConfigDecodeError {
    #[error("Config token is not valid base64: {0}")]
    Encoding(String),

    #[error("Config token does not contain a valid config object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config token carries an invalid value: {0}")]
    InvalidField(#[from] ValidationError),
}

/// Wire shape of the token payload. Every field is required so a token can
/// never produce a half-filled config.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigPayload {
    drive_api_key: String,
    folder_id: String,
    client_name: String,
}

/// Encodes a config into a share token.
pub fn encode_config(config: &AppConfig) -> String {
    // AppConfig only holds strings, so serialization can't fail.
    let json = serde_json::to_vec(config).unwrap_or_default();
    STANDARD.encode(json)
}

/// Decodes a share token produced by [`encode_config`].
pub fn decode_config(token: &str) -> Result<AppConfig, ConfigDecodeError> {
    let token = urlencoding::decode(token.trim())
        .map_err(|e| ConfigDecodeError::Encoding(e.to_string()))?;

    let bytes = decode_base64(&token)?;
    let payload: ConfigPayload = serde_json::from_slice(&bytes)?;

    Ok(AppConfig::new(
        payload.client_name,
        payload.folder_id,
        payload.drive_api_key,
    )?)
}

fn decode_base64(token: &str) -> Result<Vec<u8>, ConfigDecodeError> {
    if token.is_empty() {
        return Err(ConfigDecodeError::Encoding("empty token".to_string()));
    }

    match STANDARD.decode(token) {
        Ok(bytes) => Ok(bytes),
        Err(standard_err) => {
            let url_safe = token.replace('+', "-").replace('/', "_");
            URL_SAFE_NO_PAD
                .decode(url_safe.trim_end_matches('='))
                .map_err(|_| ConfigDecodeError::Encoding(standard_err.to_string()))
        }
    }
}

/// Reads a config out of a share link.
///
/// Accepts a full URL, a `#...` fragment, or the bare fragment body.
/// Returns `Ok(None)` when there's no config marker at all, and an error when
/// the marker is there but the token is bad.
pub fn config_from_fragment(url_or_fragment: &str) -> Result<Option<AppConfig>, ConfigDecodeError> {
    let fragment = match url_or_fragment.split_once('#') {
        Some((_, fragment)) => fragment,
        None => url_or_fragment,
    };

    match fragment.trim().strip_prefix(CONFIG_MARKER) {
        Some(token) => decode_config(token).map(Some),
        None => Ok(None),
    }
}

/// Like [`config_from_fragment`], but a bad token is logged and treated as
/// "not configured".
pub fn load_from_fragment(url_or_fragment: &str) -> Option<AppConfig> {
    match config_from_fragment(url_or_fragment) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config from share link: {}", e);
            None
        }
    }
}

/// Builds the link a portal owner sends to their client. Any query string or
/// fragment on `base_url` is dropped.
pub fn share_link(base_url: &str, config: &AppConfig) -> String {
    let base = base_url.split(['?', '#']).next().unwrap_or(base_url);
    format!("{}#{}{}", base, CONFIG_MARKER, encode_config(config))
}
