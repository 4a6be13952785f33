use serde::{Deserialize, Serialize};

/// MIME type Drive assigns to folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// One entry of a shared folder, exactly as the listing endpoint returned it.
///
/// Records are read-only once received. The portal shares them behind an
/// `Arc` so selecting a file for the detail view never copies or alters it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_content_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<FileSize>,
    /// ISO 8601 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DriveFile {
    /// Size in bytes, if Drive reported one that parses as a byte count.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_ref().and_then(FileSize::bytes)
    }

    pub fn category(&self) -> FileCategory {
        FileCategory::from_mime_type(&self.mime_type)
    }
}

/// Drive v3 sends `size` as a decimal string (int64 in JSON), but numbers show
/// up too when records are produced by other tools. Anything else is kept as
/// `Other` so one odd record can't fail the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileSize {
    Bytes(u64),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl FileSize {
    /// The size as a byte count. Negative, fractional and non-numeric values
    /// are not byte counts and yield `None`.
    pub fn bytes(&self) -> Option<u64> {
        match self {
            FileSize::Bytes(n) => Some(*n),
            FileSize::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => {
                Some(*n as u64)
            }
            FileSize::Text(s) => s.trim().parse().ok(),
            FileSize::Number(_) | FileSize::Other(_) => None,
        }
    }
}

/// The value as Drive sent it.
impl std::fmt::Display for FileSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSize::Bytes(n) => write!(f, "{}", n),
            FileSize::Number(n) => write!(f, "{}", n),
            FileSize::Text(s) => f.write_str(s),
            FileSize::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Simplified display category for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Folder,
    Image,
    Pdf,
    Document,
    Other,
}

impl FileCategory {
    /// Maps a MIME type to a category.
    ///
    /// Checks run in a fixed order: exact folder type, `image/` prefix, exact
    /// PDF type, then "word"/"document" substrings. A PDF therefore never
    /// lands in `Document`.
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            FileCategory::Folder
        } else if mime_type.starts_with("image/") {
            FileCategory::Image
        } else if mime_type == "application/pdf" {
            FileCategory::Pdf
        } else if mime_type.contains("word") || mime_type.contains("document") {
            FileCategory::Document
        } else {
            FileCategory::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Folder => "folder",
            FileCategory::Image => "image",
            FileCategory::Pdf => "pdf",
            FileCategory::Document => "document",
            FileCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
