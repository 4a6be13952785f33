//! Display helpers for listed files: human-readable sizes, created dates and
//! thumbnail links.

use chrono::{DateTime, Utc};

use super::drive_models::DriveFile;

/// Decimal places used when callers don't ask for a specific precision.
pub const DEFAULT_SIZE_DECIMALS: usize = 2;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const SIZE_BASE: u64 = 1024;

/// Formats a byte count with [`DEFAULT_SIZE_DECIMALS`].
pub fn format_size(bytes: Option<u64>) -> String {
    format_size_with(bytes, DEFAULT_SIZE_DECIMALS)
}

/// Formats a byte count using base-1024 units, e.g. `1536` -> `"1.5 KB"`.
///
/// Missing or zero input yields `"0 Bytes"`. Trailing zeros after rounding
/// are dropped, so `1024` is `"1 KB"` rather than `"1.00 KB"`. Anything past
/// terabytes is still expressed in TB.
pub fn format_size_with(bytes: Option<u64>, decimals: usize) -> String {
    let bytes = match bytes {
        Some(b) if b > 0 => b,
        _ => return "0 Bytes".to_string(),
    };

    let mut unit = 0;
    let mut divisor: u64 = 1;
    while unit + 1 < SIZE_UNITS.len() && bytes / divisor >= SIZE_BASE {
        divisor *= SIZE_BASE;
        unit += 1;
    }

    let value = bytes as f64 / divisor as f64;
    let mut text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }

    format!("{} {}", text, SIZE_UNITS[unit])
}

/// Convenience wrapper for a listed file's `size` field.
pub fn format_file_size(file: &DriveFile) -> String {
    format_size(file.size_bytes())
}

/// Renders Drive's RFC 3339 `createdTime` as a short date.
pub fn format_created(created_time: Option<&str>) -> String {
    created_time
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|dt| dt.with_timezone(&Utc).format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Drive thumbnails come back sized for 220px (`=s220`). The portal asks for
/// a 600px rendition instead.
pub fn large_thumbnail(file: &DriveFile) -> Option<String> {
    file.thumbnail_link
        .as_deref()
        .map(|link| link.replacen("s220", "s600", 1))
}
