use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    prelude::Frame,
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use textwrap::wrap;

pub struct ThreeBox {
    pub top: Rect,
    pub middle: Rect,
    pub bottom: Rect,
    pub top_inner: Rect,
    pub middle_inner: Rect,
    pub bottom_inner: Rect,
}

pub struct Margins {
    pub page: u16,         // outer page margin (e.g., 2)
    pub inner_top: u16,    // inner margin for top box (e.g., 3)
    pub inner_middle: u16, // inner margin for middle box (e.g., 3)
    pub inner_bottom: u16, // inner margin for bottom box (e.g., 3)
}

impl Default for Margins {
    fn default() -> Self {
        Self { page: 2, inner_top: 3, inner_middle: 3, inner_bottom: 3 }
    }
}

pub fn three_box_layout(
    size: Rect,
    top_needed: u16,
    middle_needed: u16,
    footer_height: u16,
    margins: Margins,
) -> ThreeBox {
    let available_for_top_and_middle =
        size.height.saturating_sub(2 * margins.page).saturating_sub(footer_height);

    let top_min = 5;
    let top_cap = available_for_top_and_middle.saturating_sub(middle_needed);
    let top_height = top_needed.min(top_cap.max(top_min));
    let middle_height = available_for_top_and_middle.saturating_sub(top_height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(margins.page)
        .constraints([
            Constraint::Length(top_height),
            Constraint::Length(middle_height),
            Constraint::Length(footer_height),
        ])
        .split(size);

    let top_inner = chunks[0].inner(&Margin { horizontal: margins.inner_top, vertical: 1 });
    let middle_inner = chunks[1].inner(&Margin { horizontal: margins.inner_middle, vertical: 1 });
    let bottom_inner = chunks[2].inner(&Margin { horizontal: margins.inner_bottom, vertical: 1 });

    ThreeBox {
        top: chunks[0],
        middle: chunks[1],
        bottom: chunks[2],
        top_inner,
        middle_inner,
        bottom_inner,
    }
}

/// Standard wizard page: header + explanation on top, a bordered middle box
/// of `middle_rows` content rows, and a one-line footer legend.
///
/// Draws the top box, both borders and the footer; returns the regions so
/// the caller can fill `middle_inner`.
pub fn page(
    f: &mut Frame<'_>,
    size: Rect,
    header: &str,
    paras: &[&str],
    middle_rows: u16,
    footer: Line<'static>,
) -> ThreeBox {
    let top_inner_width = (size.width.saturating_sub(2 * 2 + 2 + 2 * 3) as usize).max(1);
    let header_lines = wrap(header, top_inner_width).len() as u16;

    let mut exp_lines = 0usize;
    for p in paras { exp_lines += wrap(p, top_inner_width).len(); }
    let explanation_lines = exp_lines as u16 + (paras.len().saturating_sub(1) as u16);
    let top_needed = 2 + 2 + header_lines + 1 + explanation_lines;

    let middle_needed = 2 + 2 + middle_rows;
    let footer_height = 3;

    let regions = three_box_layout(size, top_needed, middle_needed, footer_height, Margins::default());

    // TOP
    f.render_widget(Block::default().borders(Borders::ALL), regions.top);
    let top_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header_lines.max(1)), Constraint::Length(1), Constraint::Min(1)])
        .split(regions.top_inner);

    let header_para = Paragraph::new(header.to_string()).alignment(Alignment::Center).wrap(Wrap { trim: true });
    let mut expl_lines: Vec<Line> = Vec::new();
    for (i, p) in paras.iter().enumerate() {
        for seg in wrap(p, top_inner_width) { expl_lines.push(Line::from(seg.to_string())); }
        if i + 1 < paras.len() { expl_lines.push(Line::from("")); }
    }
    let explanation_para = Paragraph::new(expl_lines).alignment(Alignment::Left).wrap(Wrap { trim: true });

    f.render_widget(header_para, top_chunks[0]);
    f.render_widget(explanation_para, top_chunks[2]);

    // MIDDLE border
    f.render_widget(Block::default().borders(Borders::ALL), regions.middle);

    // FOOTER legend
    f.render_widget(Block::default().borders(Borders::ALL), regions.bottom);
    f.render_widget(Paragraph::new(footer).wrap(Wrap { trim: true }), regions.bottom_inner);

    regions
}

pub fn centered_rect_abs(width: u16, height: u16, r: Rect) -> Rect {
    let w = width.min(r.width.saturating_sub(2));
    let h = height.min(r.height.saturating_sub(2));
    let x = r.x + (r.width.saturating_sub(w)) / 2;
    let y = r.y + (r.height.saturating_sub(h)) / 2;
    Rect { x, y, width: w, height: h }
}
