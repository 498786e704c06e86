use anyhow::Error;
use chrono::{Local, TimeZone};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{BinderItem, FileType};

/// ASCII motif drawn on a card in place of an icon, one per content kind.
pub(crate) fn type_art(file_type: FileType) -> &'static [&'static str] {
    match file_type {
        FileType::Image => &["/\\/\\/", "\\/\\/\\"],
        FileType::Video => &["[>] ", " [>]"],
        FileType::Audio => &["~~  ", "  ~~"],
        FileType::Pdf => &["##  ", "  ##"],
        FileType::Doc => &["=--=", "--=="],
        FileType::Xls => &["|..|", ".||."],
        FileType::Ppt => &["[]__", "__[]"],
        FileType::Txt => &["::''", "''::"],
        FileType::Link => &["<>><", "><<>"],
    }
}

/// Plain-language name for a content kind.
pub(crate) fn kind_label(file_type: FileType) -> &'static str {
    match file_type {
        FileType::Image => "Image",
        FileType::Video => "Video",
        FileType::Audio => "Audio",
        FileType::Pdf => "PDF document",
        FileType::Doc => "Document",
        FileType::Xls => "Spreadsheet",
        FileType::Ppt => "Presentation",
        FileType::Txt => "Text note",
        FileType::Link => "Web link",
    }
}

/// Motif for items that carry their own thumbnail.
pub(crate) const THUMBNAIL_ART: &[&str] = &["oOo ", " OoO"];

/// Accent color per content kind.
pub(crate) fn type_color(file_type: FileType) -> Color {
    match file_type {
        FileType::Image => Color::Magenta,
        FileType::Video => Color::Red,
        FileType::Audio => Color::LightMagenta,
        FileType::Pdf => Color::LightRed,
        FileType::Doc => Color::Blue,
        FileType::Xls => Color::Green,
        FileType::Ppt => Color::Yellow,
        FileType::Txt => Color::Gray,
        FileType::Link => Color::Cyan,
    }
}

/// Repeat a short ASCII motif until it fills the requested width.
pub(crate) fn repeat_pattern_row(row: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if row.is_empty() {
        return " ".repeat(width);
    }
    let repeat_count = width / row.len() + 2;
    let mut repeated = row.repeat(repeat_count);
    repeated.truncate(width);
    repeated
}

/// Center a title within `width` columns, cutting it with an ellipsis when it
/// does not fit.
pub(crate) fn centered_label(label: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let trimmed = label.trim();
    let count = trimmed.chars().count();
    let shown: String = if count > width {
        let keep = width.saturating_sub(1);
        trimmed.chars().take(keep).chain(std::iter::once('…')).collect()
    } else {
        trimmed.to_string()
    };

    let padding = width.saturating_sub(shown.chars().count());
    let left = padding / 2;
    let right = padding - left;
    format!("{}{}{}", " ".repeat(left), shown, " ".repeat(right))
}

/// Build the lines inside an item card: the type motif on top and the title
/// underneath, bolded when the card is highlighted.
pub(crate) fn build_item_card_lines(
    item: &BinderItem,
    inner_width: u16,
    inner_height: u16,
    selected: bool,
) -> Vec<Line<'static>> {
    let width = inner_width as usize;
    let height = inner_height as usize;
    if width == 0 || height == 0 {
        return vec![Line::from("")];
    }

    let pattern = if item.thumbnail.is_some() {
        THUMBNAIL_ART
    } else {
        type_art(item.file_type)
    };
    let pattern_style = if selected {
        Style::default().fg(type_color(item.file_type))
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let label_lines = if height >= 2 { 2 } else { 1 };
    let pattern_height = height.saturating_sub(label_lines);
    let mut lines = Vec::with_capacity(height);
    for row_idx in 0..pattern_height {
        let row = repeat_pattern_row(pattern[row_idx % pattern.len()], width);
        lines.push(Line::from(Span::styled(row, pattern_style)));
    }
    if height >= 2 {
        lines.push(Line::from(" ".repeat(width)));
    }

    let label = centered_label(&item.title, width);
    if selected {
        lines.push(Line::from(Span::styled(
            label,
            Style::default().add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(label));
    }

    lines
}

/// Format a creation timestamp in local time.
pub(crate) fn format_timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Render a byte count the way file managers do.
pub(crate) fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
