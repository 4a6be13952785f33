use super::folder_id::extract_folder_id;
use super::portal_models::{AppConfig, ValidationError, DEFAULT_CLIENT_NAME};

/// Raw values from the setup form, before any checking.
#[derive(Debug, Clone, Default)]
pub struct ConfigForm {
    pub client_name: String,
    pub folder_url: String,
    pub drive_api_key: String,
}

impl ConfigForm {
    /// Checks the form and builds the config it describes.
    ///
    /// The API key is checked before the folder, so a form with both problems
    /// reports the missing key.
    pub fn validate(&self) -> Result<AppConfig, ValidationError> {
        let drive_api_key = self.drive_api_key.trim();
        if drive_api_key.is_empty() {
            return Err(ValidationError::MissingApiKey);
        }

        let folder_id = extract_folder_id(&self.folder_url).ok_or(ValidationError::InvalidFolder)?;

        let client_name = match self.client_name.trim() {
            "" => DEFAULT_CLIENT_NAME,
            name => name,
        };

        AppConfig::new(client_name, folder_id, drive_api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(client: &str, folder: &str, key: &str) -> ConfigForm {
        ConfigForm {
            client_name: client.to_string(),
            folder_url: folder.to_string(),
            drive_api_key: key.to_string(),
        }
    }

    #[test]
    fn test_valid_form_trims_values() {
        let config = form(
            "  Acme Corp ",
            "https://drive.google.com/drive/folders/1A2b3C4d5E6f7G8h9I0",
            " AIzaKey ",
        )
        .validate()
        .unwrap();

        assert_eq!(config.client_name(), "Acme Corp");
        assert_eq!(config.folder_id(), "1A2b3C4d5E6f7G8h9I0");
        assert_eq!(config.drive_api_key(), "AIzaKey");
    }

    #[test]
    fn test_blank_client_name_gets_default() {
        let config = form("", "1A2b3C4d5E6f7G8h9I0", "AIzaKey")
            .validate()
            .unwrap();

        assert_eq!(config.client_name(), DEFAULT_CLIENT_NAME);
    }

    #[test]
    fn test_missing_key_reported_first() {
        assert_eq!(
            form("Acme", "short", "").validate(),
            Err(ValidationError::MissingApiKey)
        );
    }

    #[test]
    fn test_bad_folder_link() {
        let err = form("Acme", "https://example.com/nothing-here", "AIzaKey")
            .validate()
            .unwrap_err();

        assert_eq!(err, ValidationError::InvalidFolder);
        assert_eq!(err.to_string(), "Invalid Google Drive Folder URL or ID.");
    }
}
