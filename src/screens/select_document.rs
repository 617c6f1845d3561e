use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    prelude::Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};

use crate::app::{AppCtx, ScreenWidget, Transition};
use crate::screens::screen_for;
use crate::types::DocumentKind;
use crate::ui::common_nav::{esc_to_back, tab_as_arrow};
use crate::ui::help::help_menu;
use crate::ui::layout::page;
use crate::ui::style::button_spans;
use crate::wizard::WizardStep;

pub struct SelectDocumentScreen {
    options: Vec<DocumentKind>,
    field_index: usize, // 0..options.len() = documents, options.len() = Back
}

impl SelectDocumentScreen {
    pub fn new(ctx: &AppCtx) -> Self {
        let options = match &ctx.wizard.country {
            Some(c) => ctx.catalog.documents_for(&c.country_code),
            None => DocumentKind::all().to_vec(),
        };
        Self { options, field_index: 0 }
    }

    fn back_index(&self) -> usize {
        self.options.len()
    }
}

#[async_trait]
impl ScreenWidget for SelectDocumentScreen {
    fn title(&self) -> &str { "" }

    fn draw(&self, f: &mut Frame<'_>, size: Rect, ctx: &AppCtx) {
        let country = ctx
            .wizard
            .country
            .as_ref()
            .map(|c| format!("Issuing country: {} ({})", c.country, c.country_code))
            .unwrap_or_else(|| "Issuing country: not selected".to_string());
        let paras = [
            country.as_str(),
            "Pick the document you will photograph. Two-sided documents are captured front first, then back.",
        ];
        let rows = self.options.len() as u16 + 3;
        let regions = page(f, size, "Select Document", &paras, rows, help_menu());

        let mut items: Vec<ListItem> = self
            .options
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let selected = i == self.field_index;
                let prefix = if selected { "▶ " } else { "  " };
                let sides = if kind.sides().len() > 1 { "front + back" } else { "one page" };
                ListItem::new(Line::from(vec![
                    Span::styled(prefix, Style::default().fg(Color::Cyan)),
                    Span::raw(kind.label()),
                    Span::styled(format!("  ({sides})"), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        items.push(ListItem::new(Line::from("")));
        items.push(ListItem::new(Line::from(button_spans("Back", self.field_index == self.back_index()))));

        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        f.render_widget(list, regions.middle_inner);
    }

    async fn on_key(&mut self, k: KeyEvent, ctx: &mut AppCtx) -> Result<Transition> {
        if let Some(t) = esc_to_back(k) { return Ok(t); }

        let count = self.back_index() + 1;
        match tab_as_arrow(k) {
            KeyCode::Up => {
                if self.field_index == 0 { self.field_index = count - 1; }
                else { self.field_index -= 1; }
            }
            KeyCode::Down => { self.field_index = (self.field_index + 1) % count; }
            KeyCode::Enter if self.field_index == self.back_index() => return Ok(Transition::Pop),
            KeyCode::Enter => {
                if let Some(kind) = self.options.get(self.field_index).copied() {
                    ctx.wizard.choose_document(kind);
                    let next = ctx.wizard.next_step(WizardStep::SelectDocument);
                    return Ok(Transition::Push(screen_for(next, ctx)));
                }
            }
            _ => {}
        }
        Ok(Transition::Stay)
    }
}
