//! Plain-text rendering of the portal state.
//!
//! Every function here is pure: it takes a snapshot and returns the text to
//! print, so the session loop owns all I/O.

use crate::core::ai::{Enrichment, GeminiAnalysis};
use crate::core::drive::file_format::{format_created, format_file_size, large_thumbnail};
use crate::core::drive::{DriveFile, FileCategory};
use crate::core::portal::{AppConfig, FileDetail, PortalPhase, PortalState, ViewMode};

const GRID_COLUMNS: usize = 3;
const CARD_WIDTH: usize = 28;
const LIST_NAME_WIDTH: usize = 40;

pub const RECONFIGURE_HINT: &str = "Type `config` to go back to configuration.";

/// Short label standing in for the file-type icon.
pub fn category_label(category: FileCategory) -> &'static str {
    match category {
        FileCategory::Folder => "[DIR]",
        FileCategory::Image => "[IMG]",
        FileCategory::Pdf => "[PDF]",
        FileCategory::Document => "[DOC]",
        FileCategory::Other => "[FILE]",
    }
}

/// Cuts `text` to at most `width` characters, marking the cut with `...`.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

/// Last segment of the MIME type, upper-cased (`application/pdf` -> `PDF`).
fn type_badge(file: &DriveFile) -> String {
    file.mime_type
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

pub fn render_header(config: &AppConfig) -> String {
    let title = format!("Shared Resources for {}", config.client_name());
    format!("{}\n{}", title, "=".repeat(title.chars().count()))
}

/// The welcome panel: the AI greeting (or a placeholder while it loads) and
/// the item count.
pub fn render_welcome(state: &PortalState) -> String {
    let message = match (&state.welcome, state.welcome_loading) {
        (Some(welcome), _) => welcome.content().clone(),
        (None, true) => "Preparing your welcome message...".to_string(),
        (None, false) => String::new(),
    };

    let source = match &state.welcome {
        Some(welcome) if welcome.is_enriched() => "Generated by Gemini AI | ",
        _ => "",
    };

    format!(
        "{}\n{}{} items available",
        message,
        source,
        state.files.len()
    )
}

pub fn render_error_banner(message: &str) -> String {
    format!("!! Access Error\n!! {}\n!! {}", message, RECONFIGURE_HINT)
}

fn render_card(position: usize, file: &DriveFile) -> Vec<String> {
    let inner = CARD_WIDTH - 4;
    let border = format!("+{}+", "-".repeat(CARD_WIDTH - 2));
    let row = |text: String| format!("| {:<width$} |", text, width = inner);

    vec![
        border.clone(),
        row(format!("{:>3} {}", position, category_label(file.category()))),
        row(truncate(&file.name, inner)),
        row(format_file_size(file)),
        border,
    ]
}

/// Files as cards, [`GRID_COLUMNS`] to a row.
pub fn render_grid(files: &[std::sync::Arc<DriveFile>]) -> String {
    let mut lines = Vec::new();

    for (chunk_index, chunk) in files.chunks(GRID_COLUMNS).enumerate() {
        let cards: Vec<Vec<String>> = chunk
            .iter()
            .enumerate()
            .map(|(i, file)| render_card(chunk_index * GRID_COLUMNS + i + 1, file))
            .collect();

        let height = cards.first().map(Vec::len).unwrap_or(0);
        for line in 0..height {
            let joined: Vec<&str> = cards.iter().map(|card| card[line].as_str()).collect();
            lines.push(joined.join(" "));
        }
    }

    lines.join("\n")
}

/// Files as rows of name, created date and size.
pub fn render_list(files: &[std::sync::Arc<DriveFile>]) -> String {
    files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            format!(
                "{:>3}. {:<6} {:<name_width$}  {:<12}  {:>10}",
                i + 1,
                category_label(file.category()),
                truncate(&file.name, LIST_NAME_WIDTH),
                format_created(file.created_time.as_deref()),
                format_file_size(file),
                name_width = LIST_NAME_WIDTH
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_analysis(analysis: Option<&Enrichment<GeminiAnalysis>>) -> String {
    let Some(analysis) = analysis else {
        return "Analyzing file...".to_string();
    };

    let insight = analysis.content();
    let mut text = format!("\"{}\"\n{}", insight.professional_note, insight.summary);
    if !insight.tags.is_empty() {
        let tags: Vec<String> = insight.tags.iter().map(|t| format!("#{}", t)).collect();
        text.push('\n');
        text.push_str(&tags.join(" "));
    }
    text
}

/// The open file: metadata, links and the AI insight.
pub fn render_detail(detail: &FileDetail) -> String {
    let file = &detail.file;
    let mut sections = vec![
        format!("{} ({})", file.name, type_badge(file)),
        format!(
            "Size: {}    Created: {}",
            format_file_size(file),
            format_created(file.created_time.as_deref())
        ),
    ];

    if file.category() == FileCategory::Image {
        if let Some(preview) = large_thumbnail(file) {
            sections.push(format!("Preview: {}", preview));
        }
    }

    sections.push(format!(
        "AI Insight\n{}",
        render_analysis(detail.analysis.as_ref())
    ));

    let mut links = Vec::new();
    if let Some(link) = &file.web_content_link {
        links.push(format!("Download File: {}", link));
    }
    if let Some(link) = &file.web_view_link {
        links.push(format!("Open in Drive: {}", link));
    }
    if !links.is_empty() {
        sections.push(links.join("\n"));
    }

    sections.push("Type `close` to return to the files.".to_string());
    sections.join("\n\n")
}

/// The whole portal page for the current snapshot. Returns an empty string
/// when nothing is configured.
pub fn render_portal(state: &PortalState) -> String {
    let Some(config) = &state.config else {
        return String::new();
    };

    let mut sections = vec![render_header(config)];

    match &state.phase {
        PortalPhase::Unconfigured => {}
        PortalPhase::Loading => sections.push("Loading files...".to_string()),
        PortalPhase::Failed(message) => sections.push(render_error_banner(message)),
        PortalPhase::Ready => {
            sections.push(render_welcome(state));
            if state.files.is_empty() {
                sections.push("This folder is empty.".to_string());
            } else {
                sections.push(match state.view_mode {
                    ViewMode::Grid => render_grid(&state.files),
                    ViewMode::List => render_list(&state.files),
                });
            }
        }
    }

    sections.push(
        "Secure Client Portal | Data transferred directly from Google Drive".to_string(),
    );
    sections.join("\n\n")
}
