use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    prelude::Frame,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::{AppCtx, ScreenWidget, Transition};
use crate::ui::layout::centered_rect_abs;
use crate::ui::style; // centralized style

/// Modal quit confirmation. The screen underneath stays mounted.
pub struct ConfirmQuitScreen {
    selected: usize, // 0 = Stay, 1 = Quit
}

impl ConfirmQuitScreen {
    pub fn new() -> Self {
        Self { selected: 0 }
    }
}

#[async_trait]
impl ScreenWidget for ConfirmQuitScreen {
    fn title(&self) -> &str {
        " Quit "
    }

    fn is_overlay(&self) -> bool { true }

    fn draw(&self, f: &mut Frame<'_>, size: Rect, _ctx: &AppCtx) {
        let msg = "Quit now? The current verification will be abandoned.";
        let left_label = "Stay";
        let right_label = "Quit";

        let btn_len = |label: &str| 4 + label.len(); // "< " + label + " >"
        let buttons_len = btn_len(left_label) + 3 + btn_len(right_label);

        let inner_w_needed = msg.len().max(buttons_len) as u16;
        let inner_width = inner_w_needed.max(36);
        let inner_height = 4;

        let total_w = inner_width + 4;
        let total_h = inner_height + 3;

        let area = centered_rect_abs(total_w, total_h, size);
        let inner = area.inner(&Margin { horizontal: 2, vertical: 1 });

        let vchunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let msg_line = Paragraph::new(Line::from(vec![Span::raw(msg)])).alignment(Alignment::Center);

        let buttons = style::button_row(&[left_label, right_label], Some(self.selected));
        let buttons_line = Paragraph::new(Line::from(buttons)).alignment(Alignment::Center);

        f.render_widget(Clear, area);
        f.render_widget(Block::default().borders(Borders::ALL).title(self.title()), area);
        f.render_widget(msg_line, vchunks[1]);
        f.render_widget(buttons_line, vchunks[3]);
    }

    async fn on_key(&mut self, k: KeyEvent, _ctx: &mut AppCtx) -> Result<Transition> {
        match k.code {
            KeyCode::Esc => return Ok(Transition::Pop),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.selected = 1 - self.selected;
            }
            KeyCode::Char('y' | 'Y') => return Ok(Transition::Quit),
            KeyCode::Char('n' | 'N') => return Ok(Transition::Pop),
            KeyCode::Enter | KeyCode::Char(' ') => {
                return Ok(if self.selected == 1 {
                    Transition::Quit
                } else {
                    Transition::Pop
                });
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
    use crate::types::VerificationSession;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn defaults_to_staying() {
        let mut ctx = AppCtx::new(
            VerificationSession::new("sess"),
            CountryCatalog::bundled().unwrap(),
            Arc::new(MockVerifier::default()),
            CameraSlot::default(),
        );
        let mut screen = ConfirmQuitScreen::new();
        assert!(screen.is_overlay());
        assert!(matches!(screen.on_key(key(KeyCode::Enter), &mut ctx).await.unwrap(), Transition::Pop));
        screen.on_key(key(KeyCode::Right), &mut ctx).await.unwrap();
        assert!(matches!(screen.on_key(key(KeyCode::Enter), &mut ctx).await.unwrap(), Transition::Quit));
        assert!(matches!(screen.on_key(key(KeyCode::Char('n')), &mut ctx).await.unwrap(), Transition::Pop));
    }
}
