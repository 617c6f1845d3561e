use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

use crate::capture::{CaptureError, ErrorCategory};

/// Recovery buttons under an error. Both retake the photo.
pub const RECOVERY_ACTIONS: [&str; 2] = ["Retry", "Back"];

fn category_color(category: ErrorCategory) -> Color {
    match category {
        ErrorCategory::Validation => Color::Yellow,
        ErrorCategory::Network | ErrorCategory::Device => Color::Red,
    }
}

/// Title, message and tips of a capture error, wrapped to `width`.
pub fn error_lines(err: &CaptureError, width: usize) -> Vec<Line<'static>> {
    let width = width.max(10);
    let mut lines = vec![Line::from(Span::styled(
        err.title(),
        Style::default().fg(category_color(err.category)).add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::from(""));
    for seg in wrap(&err.message, width) {
        lines.push(Line::from(seg.to_string()));
    }
    lines.push(Line::from(""));
    for tip in &err.tips {
        for (i, seg) in wrap(tip, width.saturating_sub(2).max(8)).into_iter().enumerate() {
            let bullet = if i == 0 { "• " } else { "  " };
            lines.push(Line::from(vec![
                Span::styled(bullet, Style::default().fg(Color::Cyan)),
                Span::raw(seg.to_string()),
            ]));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_message_verbatim_with_tips() {
        let err = CaptureError::validation("Blurry image");
        let out = text(&error_lines(&err, 60));
        assert!(out.starts_with("Photo not accepted"));
        assert!(out.contains("\nBlurry image\n"));
        assert!(out.contains("• Avoid glare and reflections on the document"));
    }
}
