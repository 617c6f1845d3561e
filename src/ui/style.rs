// style.rs
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};
use std::borrow::Cow;

pub fn span_key(s: &'static str) -> Span<'static> {
    Span::styled(s, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
}
pub fn span_sep() -> Span<'static> {
    Span::styled("  |  ", Style::default().fg(Color::DarkGray))
}
pub fn span_text(s: &'static str) -> Span<'static> {
    Span::raw(s)
}
pub fn span_label(s: &'static str) -> Span<'static> {
    Span::styled(s, Style::default().fg(Color::Yellow))
}

/* ---------- button helpers (Blue brackets, Red for selected, Blue for idle) ---------- */

const ACCENT_BRACKET: Color = Color::Blue;
const SELECTED_TEXT: Color = Color::Red;
const IDLE_TEXT: Color = Color::Blue;

/// Core painter: "< " + LABEL + " >"
pub fn button_spans<S: Into<Cow<'static, str>>>(label: S, selected: bool) -> Vec<Span<'static>> {
    let label = label.into();
    vec![
        Span::styled("< ", Style::default().fg(ACCENT_BRACKET).add_modifier(Modifier::BOLD)),
        Span::styled(
            label,
            Style::default()
                .fg(if selected { SELECTED_TEXT } else { IDLE_TEXT })
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" >", Style::default().fg(ACCENT_BRACKET).add_modifier(Modifier::BOLD)),
    ]
}

/// Same look, but visually "disabled"
pub fn button_spans_disabled<S: Into<Cow<'static, str>>>(label: S) -> Vec<Span<'static>> {
    let label = label.into();
    vec![
        Span::styled("< ", Style::default().fg(Color::DarkGray)),
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::styled(" >", Style::default().fg(Color::DarkGray)),
    ]
}

/// Row of buttons separated by three spaces; `focus` is the selected index.
pub fn button_row(labels: &[&'static str], focus: Option<usize>) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.extend(button_spans(*label, focus == Some(i)));
    }
    spans
}
