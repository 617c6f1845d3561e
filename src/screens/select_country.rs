use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};
use std::time::{Duration, Instant};

use crate::app::{AppCtx, ScreenWidget, Transition};
use crate::countries::{CountryCatalog, CountryRecord};
use crate::defaults::Defaults;
use crate::screens::screen_for;
use crate::ui::common_nav::tab_as_arrow;
use crate::ui::components::{field_line_text, TextField};
use crate::ui::help::help_country;
use crate::ui::layout::page;
use crate::wizard::{AutoAdvance, WizardStep};

pub struct SelectCountryScreen {
    filter: TextField,
    visible: Vec<CountryRecord>,
    list_index: usize,
    chosen: Option<String>,
    advance: AutoAdvance,
}

impl SelectCountryScreen {
    pub fn new(catalog: &CountryCatalog) -> Self {
        Self {
            filter: TextField::default(),
            visible: catalog.entries().to_vec(),
            list_index: 0,
            chosen: None,
            advance: AutoAdvance::new(Duration::from_millis(Defaults::COUNTRY_ADVANCE_DELAY_MS)),
        }
    }

    fn refilter(&mut self, catalog: &CountryCatalog) {
        self.visible = catalog.filter(&self.filter.text).into_iter().cloned().collect();
        self.list_index = 0;
    }

    fn tick_at(&mut self, now: Instant, ctx: &AppCtx) -> Transition {
        if self.advance.poll(now) {
            Transition::Push(screen_for(WizardStep::SelectDocument, ctx))
        } else {
            Transition::Stay
        }
    }
}

#[async_trait]
impl ScreenWidget for SelectCountryScreen {
    fn title(&self) -> &str { "" }

    fn draw(&self, f: &mut Frame<'_>, size: Rect, ctx: &AppCtx) {
        let session = format!("Verification session: {}", ctx.wizard.session);
        let paras = [
            "Choose the country that issued your identity document.",
            "Type to filter the list, then press Enter.",
            session.as_str(),
        ];
        let rows = (self.visible.len() as u16).saturating_add(2);
        let regions = page(f, size, "Select Country", &paras, rows, help_country());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(1)])
            .split(regions.middle_inner);

        f.render_widget(Paragraph::new(field_line_text("Filter", &self.filter, true)), chunks[0]);

        if self.visible.is_empty() {
            f.render_widget(Paragraph::new("No country matches the filter."), chunks[2]);
            return;
        }

        let items: Vec<ListItem> = self
            .visible
            .iter()
            .enumerate()
            .map(|(i, rec)| {
                let selected = i == self.list_index;
                let prefix = if selected { "▶ " } else { "  " };
                let mark = if self.chosen.as_deref() == Some(rec.country_code.as_str()) { "  ✓" } else { "" };
                ListItem::new(Line::from(vec![
                    Span::styled(prefix, Style::default().fg(Color::Cyan)),
                    Span::raw(format!("{} ({})", rec.country, rec.country_code)),
                    Span::styled(mark, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let mut state = ListState::default();
        state.select(Some(self.list_index));
        f.render_stateful_widget(list, chunks[2], &mut state);
    }

    fn on_unmount(&mut self, _ctx: &mut AppCtx) {
        self.advance.cancel();
    }

    async fn on_tick(&mut self, ctx: &mut AppCtx) -> Result<Transition> {
        Ok(self.tick_at(Instant::now(), ctx))
    }

    async fn on_key(&mut self, k: KeyEvent, ctx: &mut AppCtx) -> Result<Transition> {
        match tab_as_arrow(k) {
            KeyCode::Esc => {
                if self.filter.text.is_empty() {
                    return Ok(Transition::Push(Box::new(crate::screens::ConfirmQuitScreen::new())));
                }
                self.filter.clear();
                self.refilter(&ctx.catalog);
            }
            KeyCode::Up => {
                if self.list_index == 0 { self.list_index = self.visible.len().saturating_sub(1); }
                else { self.list_index -= 1; }
            }
            KeyCode::Down => {
                if !self.visible.is_empty() {
                    self.list_index = (self.list_index + 1) % self.visible.len();
                }
            }
            KeyCode::Enter => {
                if let Some(rec) = self.visible.get(self.list_index).cloned() {
                    self.chosen = Some(rec.country_code.clone());
                    ctx.wizard.choose_country(rec);
                    self.advance.arm(Instant::now());
                }
            }
            KeyCode::Backspace => { self.filter.backspace(); self.refilter(&ctx.catalog); }
            KeyCode::Delete => { self.filter.delete(); self.refilter(&ctx.catalog); }
            KeyCode::Left => self.filter.move_left(),
            KeyCode::Right => self.filter.move_right(),
            KeyCode::Home => self.filter.home(),
            KeyCode::End => self.filter.end(),
            KeyCode::Char(c) if !k.modifiers.contains(KeyModifiers::CONTROL) => {
                self.filter.insert_char(c);
                self.refilter(&ctx.catalog);
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
    use crate::types::VerificationSession;
    use std::sync::Arc;

    fn ctx() -> AppCtx {
        AppCtx::new(
            VerificationSession::new("sess"),
            CountryCatalog::bundled().unwrap(),
            Arc::new(MockVerifier::default()),
            CameraSlot::default(),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn selection_advances_once_after_delay() {
        let mut ctx = ctx();
        let mut screen = SelectCountryScreen::new(&ctx.catalog);
        for c in "germ".chars() {
            screen.on_key(key(KeyCode::Char(c)), &mut ctx).await.unwrap();
        }
        assert_eq!(screen.visible.len(), 1);

        let t0 = Instant::now();
        screen.on_key(key(KeyCode::Enter), &mut ctx).await.unwrap();
        assert_eq!(ctx.wizard.country.as_ref().unwrap().country_code, "DE");

        assert!(matches!(screen.tick_at(t0, &ctx), Transition::Stay));
        let fired = t0 + Duration::from_millis(Defaults::COUNTRY_ADVANCE_DELAY_MS + 50);
        assert!(matches!(screen.tick_at(fired, &ctx), Transition::Push(_)));
        assert!(matches!(screen.tick_at(fired + Duration::from_secs(1), &ctx), Transition::Stay));
    }

    #[tokio::test]
    async fn escape_clears_filter_before_offering_quit() {
        let mut ctx = ctx();
        let mut screen = SelectCountryScreen::new(&ctx.catalog);
        let total = screen.visible.len();
        screen.on_key(key(KeyCode::Char('z')), &mut ctx).await.unwrap();
        assert!(screen.visible.len() < total);

        assert!(matches!(screen.on_key(key(KeyCode::Esc), &mut ctx).await.unwrap(), Transition::Stay));
        assert_eq!(screen.visible.len(), total);
        assert!(matches!(screen.on_key(key(KeyCode::Esc), &mut ctx).await.unwrap(), Transition::Push(_)));
    }

    #[tokio::test]
    async fn enter_on_empty_result_does_nothing() {
        let mut ctx = ctx();
        let mut screen = SelectCountryScreen::new(&ctx.catalog);
        for c in "qqq".chars() {
            screen.on_key(key(KeyCode::Char(c)), &mut ctx).await.unwrap();
        }
        screen.on_key(key(KeyCode::Enter), &mut ctx).await.unwrap();
        assert!(ctx.wizard.country.is_none());
        assert!(!screen.advance.is_armed());
    }
}
