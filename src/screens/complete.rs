use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    prelude::Frame,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppCtx, ScreenWidget, Transition};
use crate::ui::help::help_menu;
use crate::ui::layout::page;
use crate::ui::style::{button_row, span_label};

const ACTIONS: [&str; 2] = ["Start new verification", "Quit"];

pub struct CompleteScreen {
    focus: usize,
}

impl CompleteScreen {
    pub fn new() -> Self {
        Self { focus: 0 }
    }
}

/// Summary rows for the finished session.
fn summary_lines(ctx: &AppCtx) -> Vec<Line<'static>> {
    let w = &ctx.wizard;
    let mut lines = vec![
        Line::from(vec![span_label("Session:  "), Span::raw(w.session.to_string())]),
        Line::from(vec![
            span_label("Country:  "),
            Span::raw(w.country.as_ref().map(|c| c.country.clone()).unwrap_or_default()),
        ]),
        Line::from(vec![
            span_label("Document: "),
            Span::raw(w.document.map(|d| d.label()).unwrap_or("")),
        ]),
        Line::from(""),
    ];
    for side in &w.accepted {
        lines.push(Line::from(vec![
            Span::styled("✓ ", Style::default().fg(Color::Green)),
            Span::raw(format!("{}  (tracking {})", side.document_type.label(), side.tracking_id)),
        ]));
    }
    lines
}

#[async_trait]
impl ScreenWidget for CompleteScreen {
    fn title(&self) -> &str { "" }

    fn draw(&self, f: &mut Frame<'_>, size: Rect, ctx: &AppCtx) {
        let paras = [
            "All photos passed the quality check and were submitted for data extraction.",
            "You can start another verification or quit.",
        ];
        let lines = summary_lines(ctx);
        let rows = lines.len() as u16 + 2;
        let regions = page(f, size, "Verification Complete", &paras, rows, help_menu());

        let mut body = lines;
        body.push(Line::from(""));
        body.push(Line::from(button_row(&ACTIONS, Some(self.focus))));
        f.render_widget(Paragraph::new(body), regions.middle_inner);
    }

    async fn on_key(&mut self, k: KeyEvent, _ctx: &mut AppCtx) -> Result<Transition> {
        match k.code {
            KeyCode::Esc => return Ok(Transition::Pop),
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
                self.focus = 1 - self.focus;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                return Ok(if self.focus == 0 { Transition::Restart } else { Transition::Quit });
            }
            _ => {}
        }
        Ok(Transition::Stay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraSlot;
    use crate::capture::testing::MockVerifier;
    use crate::countries::CountryCatalog;
    use crate::types::{DocumentKind, DocumentType, VerificationSession};
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn ctx() -> AppCtx {
        let mut ctx = AppCtx::new(
            VerificationSession::new("sess-1"),
            CountryCatalog::bundled().unwrap(),
            Arc::new(MockVerifier::default()),
            CameraSlot::default(),
        );
        let de = ctx.catalog.find("DE").unwrap().clone();
        ctx.wizard.choose_country(de);
        ctx.wizard.choose_document(DocumentKind::Passport);
        ctx.wizard.record_accepted(DocumentType::Passport, "trk-9".into());
        ctx
    }

    fn flatten(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn summary_lists_session_and_accepted_sides() {
        let text = flatten(&summary_lines(&ctx()));
        assert!(text.contains("sess-1"));
        assert!(text.contains("Germany"));
        assert!(text.contains("tracking trk-9"));
    }

    #[tokio::test]
    async fn buttons_restart_or_quit() {
        let mut ctx = ctx();
        let mut screen = CompleteScreen::new();
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert!(matches!(screen.on_key(enter, &mut ctx).await.unwrap(), Transition::Restart));
        screen.on_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE), &mut ctx).await.unwrap();
        assert!(matches!(screen.on_key(enter, &mut ctx).await.unwrap(), Transition::Quit));
    }
}
