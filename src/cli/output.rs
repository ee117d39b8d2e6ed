// Output formatting utilities

use std::io::IsTerminal;

use chrono::{DateTime, Local, Utc};

use crate::board::BoardSnapshot;
use crate::models::{PipelineEntry, Stage};

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

// ANSI foreground colors (standard 16-color palette)
const ANSI_FG_BLACK: &str = "\x1b[30m";
const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";
const ANSI_FG_BLUE: &str = "\x1b[34m";
const ANSI_FG_MAGENTA: &str = "\x1b[35m";
const ANSI_FG_CYAN: &str = "\x1b[36m";
const ANSI_FG_WHITE: &str = "\x1b[37m";
const ANSI_FG_BRIGHT_BLACK: &str = "\x1b[90m";
const ANSI_FG_BRIGHT_RED: &str = "\x1b[91m";
const ANSI_FG_BRIGHT_GREEN: &str = "\x1b[92m";
const ANSI_FG_BRIGHT_YELLOW: &str = "\x1b[93m";
const ANSI_FG_BRIGHT_BLUE: &str = "\x1b[94m";
const ANSI_FG_BRIGHT_MAGENTA: &str = "\x1b[95m";
const ANSI_FG_BRIGHT_CYAN: &str = "\x1b[96m";

// Color palette for stages that carry no color of their own (hash-based)
const CATEGORICAL_FG_PALETTE: &[&str] = &[
    ANSI_FG_BLUE,
    ANSI_FG_GREEN,
    ANSI_FG_CYAN,
    ANSI_FG_MAGENTA,
    ANSI_FG_YELLOW,
    ANSI_FG_BRIGHT_BLUE,
    ANSI_FG_BRIGHT_GREEN,
    ANSI_FG_BRIGHT_CYAN,
    ANSI_FG_BRIGHT_MAGENTA,
    ANSI_FG_BRIGHT_YELLOW,
];

/// Map a color name string to its ANSI foreground constant
fn color_name_to_fg(name: &str) -> Option<&'static str> {
    match name {
        "black" => Some(ANSI_FG_BLACK),
        "red" => Some(ANSI_FG_RED),
        "green" => Some(ANSI_FG_GREEN),
        "yellow" => Some(ANSI_FG_YELLOW),
        "blue" => Some(ANSI_FG_BLUE),
        "magenta" => Some(ANSI_FG_MAGENTA),
        "cyan" => Some(ANSI_FG_CYAN),
        "white" => Some(ANSI_FG_WHITE),
        "bright_black" => Some(ANSI_FG_BRIGHT_BLACK),
        "bright_red" => Some(ANSI_FG_BRIGHT_RED),
        "bright_green" => Some(ANSI_FG_BRIGHT_GREEN),
        "bright_yellow" => Some(ANSI_FG_BRIGHT_YELLOW),
        "bright_blue" => Some(ANSI_FG_BRIGHT_BLUE),
        "bright_magenta" => Some(ANSI_FG_BRIGHT_MAGENTA),
        "bright_cyan" => Some(ANSI_FG_BRIGHT_CYAN),
        "bright_white" => Some("\x1b[97m"),
        _ => None,
    }
}

/// Color for a stage: its configured color if the name is known, otherwise a
/// stable pick from the categorical palette so every tenant's stages still
/// read apart
fn stage_fg_color(stage: &Stage) -> &'static str {
    if let Some(ref name) = stage.color {
        if name == "none" {
            return "";
        }
        if let Some(code) = color_name_to_fg(name) {
            return code;
        }
    }
    let hash: usize = stage.key.bytes().map(|b| b as usize).sum();
    CATEGORICAL_FG_PALETTE[hash % CATEGORICAL_FG_PALETTE.len()]
}

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate for reliable detection, with fallback to
/// COLUMNS environment variable and a sensible default.
pub fn get_terminal_width() -> usize {
    // Try terminal_size crate first (most reliable, works after resize)
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    // Fallback to COLUMNS environment variable (set by most shells)
    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    // Default fallback - reasonable default for most terminals
    120
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Apply a foreground color if in TTY mode
fn color_if_tty(text: &str, color: &str, is_tty: bool) -> String {
    if is_tty && !color.is_empty() {
        format!("{}{}{}", color, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Truncate to a display width, appending an ellipsis when cut
fn truncate_text(text: &str, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= width {
        return text.to_string();
    }
    if width <= 1 {
        return chars.into_iter().take(width).collect();
    }
    let mut out: String = chars.into_iter().take(width - 1).collect();
    out.push('…');
    out
}

/// Pad (or truncate) to an exact display width
fn fit_text(text: &str, width: usize) -> String {
    let truncated = truncate_text(text, width);
    let len = truncated.chars().count();
    format!("{}{}", truncated, " ".repeat(width - len))
}

/// Format timestamp for display (local time)
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Format date for display (date only, no time)
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Format a past timestamp as relative time (e.g., "today", "3 days ago")
pub fn format_relative_date(ts: &DateTime<Utc>) -> String {
    let today = Local::now().date_naive();
    let then = ts.with_timezone(&Local).date_naive();
    let days_diff = (today - then).num_days();

    if days_diff <= 0 {
        "today".to_string()
    } else if days_diff == 1 {
        "yesterday".to_string()
    } else if days_diff <= 30 {
        format!("{} days ago", days_diff)
    } else {
        format_date(ts)
    }
}

/// Display options for entry tables
#[derive(Debug, Clone, Default)]
pub struct EntryListOptions {
    pub use_relative_time: bool,
}

const COLUMN_GUTTER: usize = 2;
const MIN_COLUMN_WIDTH: usize = 14;

/// Render the board as side-by-side stage columns, or stacked sections when
/// the terminal is too narrow to fit one column per stage
pub fn render_board(snapshot: &BoardSnapshot, term_width: usize, tty: bool) -> String {
    if snapshot.columns.is_empty() {
        return "No stages configured.".to_string();
    }

    let ncols = snapshot.columns.len();
    let needed = ncols * MIN_COLUMN_WIDTH + (ncols - 1) * COLUMN_GUTTER;
    if term_width < needed {
        return render_board_stacked(snapshot, tty);
    }

    let col_width = (term_width - (ncols - 1) * COLUMN_GUTTER) / ncols;
    let gutter = " ".repeat(COLUMN_GUTTER);
    let mut lines = Vec::new();

    // Header: stage label and count, colored per stage
    let headers: Vec<String> = snapshot
        .columns
        .iter()
        .map(|column| {
            let text = fit_text(
                &format!("{} ({})", column.stage.label, column.entries.len()),
                col_width,
            );
            bold_if_tty(&color_if_tty(&text, stage_fg_color(&column.stage), tty), tty)
        })
        .collect();
    lines.push(headers.join(&gutter));

    let separator: Vec<String> = (0..ncols).map(|_| "-".repeat(col_width)).collect();
    lines.push(separator.join(&gutter));

    // Cards, one row per rank across all columns
    let max_rows = snapshot
        .columns
        .iter()
        .map(|c| c.entries.len())
        .max()
        .unwrap_or(0);
    for row in 0..max_rows {
        let cells: Vec<String> = snapshot
            .columns
            .iter()
            .map(|column| match column.entries.get(row) {
                Some(entry) => fit_text(&card_text(entry), col_width),
                None => " ".repeat(col_width),
            })
            .collect();
        lines.push(cells.join(&gutter).trim_end().to_string());
    }

    if snapshot.orphaned > 0 {
        lines.push(String::new());
        lines.push(format!(
            "{} entries reference unknown stages and are not shown.",
            snapshot.orphaned
        ));
    }

    lines.join("\n")
}

fn card_text(entry: &PipelineEntry) -> String {
    format!("{} {}", entry.short_id(), entry.display_title())
}

/// One section per stage, for narrow terminals
fn render_board_stacked(snapshot: &BoardSnapshot, tty: bool) -> String {
    let mut lines = Vec::new();

    for column in &snapshot.columns {
        let icon = column
            .stage
            .icon
            .as_deref()
            .map(|i| format!("{} ", i))
            .unwrap_or_default();
        let header = format!("{}{} ({})", icon, column.stage.label, column.entries.len());
        lines.push(bold_if_tty(
            &color_if_tty(&header, stage_fg_color(&column.stage), tty),
            tty,
        ));

        for entry in &column.entries {
            lines.push(format!("  {:<10} {}", entry.short_id(), entry.display_title()));
        }
        lines.push(String::new());
    }

    if snapshot.orphaned > 0 {
        lines.push(format!(
            "{} entries reference unknown stages and are not shown.",
            snapshot.orphaned
        ));
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Render entries as a flat table, board order (stage by stage)
pub fn render_entry_list(snapshot: &BoardSnapshot, options: &EntryListOptions, tty: bool) -> String {
    let rows: Vec<(&PipelineEntry, &Stage)> = snapshot
        .columns
        .iter()
        .flat_map(|column| column.entries.iter().map(move |e| (e, &column.stage)))
        .collect();

    if rows.is_empty() {
        return "No entries on the board.".to_string();
    }

    let time_width = if options.use_relative_time { 11 } else { 16 };
    let id_width = rows
        .iter()
        .map(|(e, _)| e.id.chars().count())
        .max()
        .unwrap_or(2)
        .max(2);
    let stage_width = rows
        .iter()
        .map(|(_, s)| s.label.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);
    let title_width = rows
        .iter()
        .map(|(e, _)| e.display_title().chars().count())
        .max()
        .unwrap_or(5)
        .clamp(5, 40);

    let mut lines = Vec::new();
    let header = format!(
        "{}  {:<4}  {}  {}  {:<10}  {}",
        fit_text("ID", id_width),
        "KIND",
        fit_text("TITLE", title_width),
        fit_text("STAGE", stage_width),
        "ASSIGNED",
        "UPDATED"
    );
    lines.push(bold_if_tty(header.trim_end(), tty));

    for (entry, stage) in rows {
        let updated = if options.use_relative_time {
            format_relative_date(&entry.updated_at)
        } else {
            format_timestamp(&entry.updated_at)
        };
        let stage_cell = color_if_tty(
            &fit_text(&stage.label, stage_width),
            stage_fg_color(stage),
            tty,
        );
        let line = format!(
            "{}  {:<4}  {}  {}  {:<10}  {:<width$}",
            fit_text(&entry.id, id_width),
            entry.entry_type.as_str(),
            fit_text(entry.display_title(), title_width),
            stage_cell,
            entry.assigned_to.as_deref().unwrap_or("-"),
            updated,
            width = time_width,
        );
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

/// Render one entry in detail
pub fn render_entry_detail(entry: &PipelineEntry, stage: Option<&Stage>, tty: bool) -> String {
    let stage_text = match stage {
        Some(s) => format!("{} ({})", s.label, s.key),
        None => entry.status.clone(),
    };

    let mut lines = Vec::new();
    lines.push(format!("{}  {}", bold_if_tty("Entry", tty), entry.id));
    lines.push(format!("  Kind:      {}", entry.entry_type.as_str()));
    lines.push(format!("  Title:     {}", entry.display_title()));
    lines.push(format!("  Contact:   {}", entry.contact_id));
    lines.push(format!(
        "  Assigned:  {}",
        entry.assigned_to.as_deref().unwrap_or("-")
    ));
    lines.push(format!("  Stage:     {}", stage_text));
    lines.push(format!("  Created:   {}", format_timestamp(&entry.created_at)));
    lines.push(format!("  Updated:   {}", format_timestamp(&entry.updated_at)));
    lines.join("\n")
}

/// Render the stage table for the `stages` command
pub fn render_stage_table(stages: &[Stage], used_fallback: bool, tty: bool) -> String {
    let key_width = stages
        .iter()
        .map(|s| s.key.chars().count())
        .max()
        .unwrap_or(3)
        .max(3);
    let label_width = stages
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut lines = Vec::new();
    let header = format!(
        "{}  {}  {:<5}  {:<12}  ORDER",
        fit_text("KEY", key_width),
        fit_text("LABEL", label_width),
        "ICON",
        "COLOR"
    );
    lines.push(bold_if_tty(&header, tty));

    for stage in stages {
        let label_cell = color_if_tty(
            &fit_text(&stage.label, label_width),
            stage_fg_color(stage),
            tty,
        );
        lines.push(
            format!(
                "{}  {}  {:<5}  {:<12}  {}",
                fit_text(&stage.key, key_width),
                label_cell,
                stage.icon.as_deref().unwrap_or("-"),
                stage.color.as_deref().unwrap_or("-"),
                stage.sort_order
            )
            .trim_end()
            .to_string(),
        );
    }

    if used_fallback {
        lines.push(String::new());
        lines.push("No stages configured for this tenant; showing the built-in pipeline.".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardCache;
    use crate::models::{fallback_stages, EntryKind};

    fn entry(id: &str, status: &str, title: &str) -> PipelineEntry {
        PipelineEntry::new(id, status, EntryKind::Lead, "c-1").with_title(title)
    }

    fn snapshot_with(entries: Vec<PipelineEntry>) -> BoardSnapshot {
        BoardCache::new(fallback_stages(), entries).snapshot()
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a long title here", 8), "a long …");
        assert_eq!(truncate_text("ab", 1), "a");
        assert_eq!(truncate_text("héllo wörld", 6), "héllo…");
    }

    #[test]
    fn test_fit_text_pads_to_width() {
        let fitted = fit_text("ab", 5);
        assert_eq!(fitted.chars().count(), 5);
        assert!(fitted.starts_with("ab"));
    }

    #[test]
    fn test_render_board_contains_headers_and_cards() {
        let board = render_board(
            &snapshot_with(vec![entry("e-12", "lead", "Harwood roof")]),
            160,
            false,
        );
        assert!(board.contains("Lead (1)"));
        assert!(board.contains("Legal Review (0)"));
        assert!(board.contains("e-12"));
        assert!(board.contains("Harwood roof"));
        // Plain mode carries no escape codes
        assert!(!board.contains("\x1b["));
    }

    #[test]
    fn test_render_board_stacks_when_narrow() {
        let board = render_board(
            &snapshot_with(vec![entry("e-12", "lead", "Harwood roof")]),
            40,
            false,
        );
        // Stacked mode puts each stage on its own line
        assert!(board.contains("Lead (1)"));
        assert!(board.lines().any(|l| l.trim_start().starts_with("e-12")));
    }

    #[test]
    fn test_render_board_reports_orphans() {
        let mut entries = vec![entry("e-1", "lead", "A")];
        entries.push(entry("e-2", "demolition", "B"));
        let board = render_board(&snapshot_with(entries), 160, false);
        assert!(board.contains("1 entries reference unknown stages"));
        assert!(!board.contains("e-2"));
    }

    #[test]
    fn test_render_entry_list() {
        let listing = render_entry_list(
            &snapshot_with(vec![
                entry("e-1", "legal", "Reyes skylight"),
                entry("e-2", "lead", "Okafor gutters"),
            ]),
            &EntryListOptions::default(),
            false,
        );
        assert!(listing.contains("ID"));
        assert!(listing.contains("STAGE"));
        // Board order: lead column before legal
        let lead_pos = listing.find("Okafor gutters").unwrap();
        let legal_pos = listing.find("Reyes skylight").unwrap();
        assert!(lead_pos < legal_pos);
    }

    #[test]
    fn test_render_entry_list_empty() {
        let listing = render_entry_list(&snapshot_with(vec![]), &EntryListOptions::default(), false);
        assert_eq!(listing, "No entries on the board.");
    }

    #[test]
    fn test_render_entry_detail() {
        let e = entry("e-7", "legal", "Harwood roof").with_assignee("u-3");
        let stage = Stage::new("legal", "Legal Review", None, None, 3);
        let detail = render_entry_detail(&e, Some(&stage), false);
        assert!(detail.contains("e-7"));
        assert!(detail.contains("Legal Review (legal)"));
        assert!(detail.contains("Assigned:  u-3"));
    }

    #[test]
    fn test_render_stage_table_notes_fallback() {
        let table = render_stage_table(&fallback_stages(), true, false);
        assert!(table.contains("KEY"));
        assert!(table.contains("lead"));
        assert!(table.contains("built-in pipeline"));

        let table = render_stage_table(&fallback_stages(), false, false);
        assert!(!table.contains("built-in pipeline"));
    }

    #[test]
    fn test_relative_date() {
        assert_eq!(format_relative_date(&Utc::now()), "today");
        let yesterday = Utc::now() - chrono::Duration::days(1);
        assert_eq!(format_relative_date(&yesterday), "yesterday");
        let last_week = Utc::now() - chrono::Duration::days(7);
        assert_eq!(format_relative_date(&last_week), "7 days ago");
    }

    #[test]
    fn test_stage_color_prefers_configured_name() {
        let stage = Stage::new("lead", "Lead", Some("blue"), None, 1);
        assert_eq!(stage_fg_color(&stage), ANSI_FG_BLUE);

        // "none" disables coloring entirely
        let plain = Stage::new("lead", "Lead", Some("none"), None, 1);
        assert_eq!(stage_fg_color(&plain), "");

        // Unknown names fall back to the categorical palette, stably
        let odd = Stage::new("lead", "Lead", Some("chartreuse"), None, 1);
        assert_eq!(stage_fg_color(&odd), stage_fg_color(&odd));
        assert!(!stage_fg_color(&odd).is_empty());
    }
}
