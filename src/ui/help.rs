use ratatui::text::Line;

use super::style::{span_key, span_sep, span_text};

pub fn help_country() -> Line<'static> {
    Line::from(vec![
        span_key("↑/↓/Tab"), span_text(" Navigate"), span_sep(),
        span_key("Type"), span_text(" Filter"), span_sep(),
        span_key("Enter"), span_text(" Select"), span_sep(),
        span_key("Esc"), span_text(" Clear / Quit"), span_sep(),
        span_key("Ctrl+Q"), span_text(" Quit"),
    ])
}

pub fn help_menu() -> Line<'static> {
    Line::from(vec![
        span_key("↑/↓/Tab"), span_text(" Navigate"), span_sep(),
        span_key("Enter"), span_text(" Select"), span_sep(),
        span_key("Esc"), span_text(" Back"), span_sep(),
        span_key("Ctrl+Q"), span_text(" Quit"),
    ])
}

pub fn help_capture() -> Line<'static> {
    Line::from(vec![
        span_key("←/→/Tab"), span_text(" Move"), span_sep(),
        span_key("Enter/Space"), span_text(" Press button"), span_sep(),
        span_key("R"), span_text(" Retake"), span_sep(),
        span_key("Esc"), span_text(" Back"), span_sep(),
        span_key("Ctrl+Q"), span_text(" Quit"),
    ])
}
