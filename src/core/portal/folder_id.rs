//! Turns whatever the user pasted (a folder link or a bare ID) into a Drive
//! folder ID.

use regex::Regex;
use std::sync::OnceLock;

/// Shortest string accepted as a bare folder ID. Real Drive IDs are much
/// longer; this only weeds out obvious typos.
pub const MIN_FOLDER_ID_LEN: usize = 15;

fn folder_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"folders/([a-zA-Z0-9_-]+)").expect("valid folder path regex"))
}

/// True when `candidate` only uses the characters Drive IDs are made of.
/// Says nothing about length; IDs captured from a folder link can be short.
pub fn is_folder_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// True when raw input is plausible as a bare folder ID on its own.
pub fn looks_like_bare_folder_id(candidate: &str) -> bool {
    candidate.len() >= MIN_FOLDER_ID_LEN && is_folder_id(candidate)
}

/// Extracts the folder ID from a Drive folder URL, or returns the input
/// itself when it already looks like an ID.
///
/// ```ignore
/// extract_folder_id("https://drive.google.com/drive/folders/1A2b3C4d5E6f7G8h9I0?usp=sharing")
///     == Some("1A2b3C4d5E6f7G8h9I0".to_string());
/// ```
pub fn extract_folder_id(input: &str) -> Option<String> {
    let input = input.trim();

    if let Some(id) = folder_path_regex()
        .captures(input)
        .and_then(|caps| caps.get(1))
    {
        return Some(id.as_str().to_string());
    }

    if looks_like_bare_folder_id(input) {
        return Some(input.to_string());
    }

    None
}
