use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use time::format_description::well_known::Rfc3339;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::api::ApiError;
use crate::app::{AppCtx, ScreenWidget, Transition};
use crate::capture::{dispatch_ocr, spawn_upload, CaptureFlow, CaptureState, FlowEvent, UploadOutcome};
use crate::screens::screen_for;
use crate::types::DocumentType;
use crate::ui::error_panel::{error_lines, RECOVERY_ACTIONS};
use crate::ui::help::help_capture;
use crate::ui::layout::page;
use crate::ui::style::{button_row, button_spans, button_spans_disabled, span_label};
use crate::wizard::WizardStep;

pub struct CaptureDocumentScreen {
    side: usize,
    document_type: DocumentType,
    flow: Option<CaptureFlow>,
    pending: Option<(u64, oneshot::Receiver<UploadOutcome>)>,
    focus: usize, // 0 = primary action, 1 = Back
}

impl CaptureDocumentScreen {
    pub fn new(side: usize, document_type: DocumentType) -> Self {
        Self { side, document_type, flow: None, pending: None, focus: 0 }
    }

    fn state(&self) -> Option<&CaptureState> {
        self.flow.as_ref().map(|f| f.state())
    }

    fn status_line(&self) -> Line<'static> {
        let (text, color) = match self.state() {
            None | Some(CaptureState::Idle) => ("Starting camera...", Color::Gray),
            Some(CaptureState::Streaming) => ("Camera live. Position the document and press Capture.", Color::Green),
            Some(CaptureState::Capturing) => ("Capturing...", Color::Yellow),
            Some(CaptureState::Uploading) => ("Checking image quality...", Color::Yellow),
            Some(CaptureState::Accepted) => ("Image accepted.", Color::Green),
            Some(CaptureState::Rejected(_)) => ("Capture failed.", Color::Red),
        };
        Line::from(vec![
            span_label("Status: "),
            Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    }

    fn buttons(&self) -> Line<'static> {
        match self.state() {
            Some(CaptureState::Rejected(_)) => Line::from(button_row(&RECOVERY_ACTIONS, Some(self.focus))),
            Some(CaptureState::Streaming) => Line::from(button_row(&["Capture", "Back"], Some(self.focus))),
            _ => {
                let mut spans = button_spans_disabled("Capture");
                spans.push(Span::raw("   "));
                spans.extend(button_spans("Back", self.focus == 1));
                Line::from(spans)
            }
        }
    }

    async fn press(&mut self, ctx: &mut AppCtx) -> Transition {
        let Some(flow) = self.flow.as_mut() else { return Transition::Stay };
        // Retry and Back under an error both retake
        if flow.error().is_some() {
            flow.retake().await;
            self.focus = 0;
            return Transition::Stay;
        }
        if self.focus == 1 {
            return Transition::Pop;
        }
        if let Some(ticket) = flow.capture() {
            let generation = ticket.generation;
            let rx = spawn_upload(ctx.verifier.clone(), ticket);
            self.pending = Some((generation, rx));
        }
        Transition::Stay
    }

    fn poll_upload(&mut self, ctx: &mut AppCtx) -> Transition {
        let Some((generation, rx)) = self.pending.as_mut() else { return Transition::Stay };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return Transition::Stay,
            Err(TryRecvError::Closed) => UploadOutcome { generation: *generation, result: Err(ApiError::Interrupted) },
        };
        self.pending = None;

        let Some(flow) = self.flow.as_mut() else { return Transition::Stay };
        match flow.finish_upload(outcome.generation, outcome.result) {
            FlowEvent::Advance(job) => {
                ctx.wizard.record_accepted(self.document_type, job.tracking_id.clone());
                // detached; the outcome is only logged
                drop(dispatch_ocr(ctx.verifier.clone(), job));
                let next = ctx.wizard.next_step(WizardStep::Capture(self.side));
                Transition::Push(screen_for(next, ctx))
            }
            FlowEvent::Rejected => {
                self.focus = 0;
                Transition::Stay
            }
            FlowEvent::Ignored => Transition::Stay,
        }
    }
}

#[async_trait]
impl ScreenWidget for CaptureDocumentScreen {
    fn title(&self) -> &str { "" }

    fn draw(&self, f: &mut Frame<'_>, size: Rect, ctx: &AppCtx) {
        let total = ctx.wizard.sides().len().max(1);
        let header = format!("{} (photo {} of {})", self.document_type.label(), self.side + 1, total);
        let paras = [
            "Place the document on a flat, dark surface so all four corners are visible.",
            "Capture freezes the current camera frame and sends it for a quality check.",
        ];
        let error = self.flow.as_ref().and_then(|f| f.error());
        let rows = if error.is_some() { 16 } else { 6 };
        let regions = page(f, size, &header, &paras, rows, help_capture());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
            .split(regions.middle_inner);

        let mut body = vec![self.status_line()];
        if let Some(img) = self.flow.as_ref().and_then(|f| f.current_image()) {
            let at = img.captured_at().format(&Rfc3339).unwrap_or_default();
            body.push(Line::from(vec![
                span_label("Last capture: "),
                Span::raw(format!("{} ({at})", img.preview().path().display())),
            ]));
        }
        if let Some(err) = error {
            body.push(Line::from(""));
            body.extend(error_lines(err, chunks[0].width as usize));
        }
        f.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), chunks[0]);
        f.render_widget(Paragraph::new(self.buttons()), chunks[2]);
    }

    async fn on_mount(&mut self, ctx: &mut AppCtx) {
        let mut flow = CaptureFlow::new(ctx.camera.take(), self.document_type, ctx.wizard.session.clone());
        flow.mount().await;
        self.focus = 0;
        self.flow = Some(flow);
    }

    fn on_unmount(&mut self, ctx: &mut AppCtx) {
        // dropping the receiver discards a late upload result
        self.pending = None;
        if let Some(mut flow) = self.flow.take() {
            if let Some(camera) = flow.unmount() {
                ctx.camera.put_back(camera);
            }
        }
    }

    async fn on_tick(&mut self, ctx: &mut AppCtx) -> Result<Transition> {
        Ok(self.poll_upload(ctx))
    }

    async fn on_key(&mut self, k: KeyEvent, ctx: &mut AppCtx) -> Result<Transition> {
        match k.code {
            KeyCode::Esc => return Ok(Transition::Pop),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.focus = 1 - self.focus;
            }
            KeyCode::Char('r' | 'R') => {
                if let Some(flow) = self.flow.as_mut() {
                    flow.retake().await;
                    self.focus = 0;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => return Ok(self.press(ctx).await),
            _ => {}
        }
        Ok(Transition::Stay)
    }
}
