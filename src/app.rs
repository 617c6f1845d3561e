use anyhow::Result;
use async_trait::async_trait;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    prelude::Frame,
    widgets::Clear,
    Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::api::Verifier;
use crate::camera::CameraSlot;
use crate::countries::CountryCatalog;
use crate::screens::{ConfirmQuitScreen, SelectCountryScreen};
use crate::types::VerificationSession;
use crate::wizard::Wizard;

const TICK: Duration = Duration::from_millis(100);

pub enum Transition {
    Stay,
    Push(Box<dyn ScreenWidget>),
    Pop,
    /// Drop every screen and begin a new verification session.
    Restart,
    Quit,
}

/// Everything the screens share for one run of the wizard.
pub struct AppCtx {
    pub wizard: Wizard,
    pub catalog: CountryCatalog,
    pub verifier: Arc<dyn Verifier>,
    /// The one camera; the capture screen on top holds it.
    pub camera: CameraSlot,
}

impl AppCtx {
    pub fn new(
        session: VerificationSession,
        catalog: CountryCatalog,
        verifier: Arc<dyn Verifier>,
        camera: CameraSlot,
    ) -> Self {
        Self { wizard: Wizard::new(session), catalog, verifier, camera }
    }
}

#[async_trait]
pub trait ScreenWidget: Send {
    fn title(&self) -> &str { "KYC Verification" }
    fn draw(&self, f: &mut Frame<'_>, area: Rect, ctx: &AppCtx);

    /// Modal popups leave the screen underneath mounted.
    fn is_overlay(&self) -> bool { false }

    /// Called when the screen becomes the active (top, non-overlaid) screen.
    async fn on_mount(&mut self, _ctx: &mut AppCtx) {}

    /// Called when the screen is removed or covered by a non-overlay screen.
    fn on_unmount(&mut self, _ctx: &mut AppCtx) {}

    /// Called every loop iteration while this screen is on top.
    async fn on_tick(&mut self, _ctx: &mut AppCtx) -> Result<Transition> {
        Ok(Transition::Stay)
    }

    async fn on_key(&mut self, key: KeyEvent, ctx: &mut AppCtx) -> Result<Transition>;
}

/// Screen stack with mount bookkeeping.
pub struct Router {
    stack: Vec<Box<dyn ScreenWidget>>,
}

impl Router {
    pub async fn start(first: Box<dyn ScreenWidget>, ctx: &mut AppCtx) -> Self {
        let mut router = Self { stack: Vec::new() };
        router.push(first, ctx).await;
        router
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    async fn push(&mut self, mut screen: Box<dyn ScreenWidget>, ctx: &mut AppCtx) {
        if !screen.is_overlay() {
            if let Some(below) = self.stack.last_mut() {
                below.on_unmount(ctx);
            }
            screen.on_mount(ctx).await;
        }
        self.stack.push(screen);
    }

    async fn pop(&mut self, ctx: &mut AppCtx) {
        if let Some(mut top) = self.stack.pop() {
            if !top.is_overlay() {
                top.on_unmount(ctx);
                if let Some(below) = self.stack.last_mut() {
                    below.on_mount(ctx).await;
                }
            }
        }
    }

    fn unmount_all(&mut self, ctx: &mut AppCtx) {
        while let Some(mut top) = self.stack.pop() {
            top.on_unmount(ctx);
        }
    }

    /// Apply a transition. Returns false once the app should exit.
    pub async fn apply(&mut self, t: Transition, ctx: &mut AppCtx) -> bool {
        match t {
            Transition::Stay => {}
            Transition::Push(s) => self.push(s, ctx).await,
            Transition::Pop => {
                self.pop(ctx).await;
                if self.stack.is_empty() {
                    return false;
                }
            }
            Transition::Restart => {
                self.unmount_all(ctx);
                ctx.wizard = Wizard::new(VerificationSession::generate());
                tracing::info!(session = %ctx.wizard.session, "starting new verification session");
                self.push(Box::new(SelectCountryScreen::new(&ctx.catalog)), ctx).await;
            }
            Transition::Quit => {
                self.unmount_all(ctx);
                return false;
            }
        }
        true
    }

    pub async fn on_key(&mut self, k: KeyEvent, ctx: &mut AppCtx) -> Result<bool> {
        // GLOBAL HOTKEY: Ctrl+Q shows confirm quit from anywhere
        if k.modifiers.contains(KeyModifiers::CONTROL) && matches!(k.code, KeyCode::Char('q' | 'Q')) {
            return Ok(self.apply(Transition::Push(Box::new(ConfirmQuitScreen::new())), ctx).await);
        }
        let t = match self.stack.last_mut() {
            Some(top) => top.on_key(k, ctx).await?,
            None => return Ok(false),
        };
        Ok(self.apply(t, ctx).await)
    }

    pub async fn on_tick(&mut self, ctx: &mut AppCtx) -> Result<bool> {
        // overlays freeze the screen underneath except for its tick
        let t = match self.stack.iter_mut().rev().find(|s| !s.is_overlay()) {
            Some(active) => active.on_tick(ctx).await?,
            None => return Ok(true),
        };
        match t {
            Transition::Stay => Ok(true),
            // a navigation decided underneath a popup closes the popup first
            other => {
                while self.stack.last().is_some_and(|s| s.is_overlay()) {
                    self.stack.pop();
                }
                Ok(self.apply(other, ctx).await)
            }
        }
    }

    pub fn draw(&self, f: &mut Frame<'_>, ctx: &AppCtx) {
        let size = f.size();
        let Some(top_idx) = self.stack.len().checked_sub(1) else {
            f.render_widget(Clear, size);
            return;
        };
        // draw the nearest full screen, then any overlays above it
        let base = self.stack.iter().rposition(|s| !s.is_overlay()).unwrap_or(top_idx);
        for screen in &self.stack[base..] {
            screen.draw(f, size, ctx);
        }
    }
}

/// Run the wizard until the user quits. Returns the state of the last session.
pub async fn run_wizard(mut ctx: AppCtx) -> Result<Wizard> {
    // terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?; // clean start

    let result = event_loop(&mut terminal, &mut ctx).await;

    // restore, even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result.map(|()| ctx.wizard)
}

async fn event_loop<B: Backend>(terminal: &mut Terminal<B>, ctx: &mut AppCtx) -> Result<()> {
    let first = Box::new(SelectCountryScreen::new(&ctx.catalog));
    let mut router = Router::start(first, ctx).await;

    loop {
        terminal.draw(|f| router.draw(f, ctx))?;

        if event::poll(TICK)? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press && !router.on_key(k, ctx).await? {
                    break;
                }
            }
        }

        if !router.on_tick(ctx).await? {
            break;
        }
    }

    router.unmount_all(ctx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::testing::{MockCamera, MockVerifier};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingScreen {
        mounts: Arc<AtomicUsize>,
        unmounts: Arc<AtomicUsize>,
        overlay: bool,
    }

    #[async_trait]
    impl ScreenWidget for CountingScreen {
        fn draw(&self, _f: &mut Frame<'_>, _area: Rect, _ctx: &AppCtx) {}
        fn is_overlay(&self) -> bool { self.overlay }
        async fn on_mount(&mut self, _ctx: &mut AppCtx) { self.mounts.fetch_add(1, Ordering::SeqCst); }
        fn on_unmount(&mut self, _ctx: &mut AppCtx) { self.unmounts.fetch_add(1, Ordering::SeqCst); }
        async fn on_key(&mut self, _k: KeyEvent, _ctx: &mut AppCtx) -> Result<Transition> {
            Ok(Transition::Stay)
        }
    }

    fn counting_screen(overlay: bool) -> (Box<CountingScreen>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let m = Arc::new(AtomicUsize::new(0));
        let u = Arc::new(AtomicUsize::new(0));
        (Box::new(CountingScreen { mounts: m.clone(), unmounts: u.clone(), overlay }), m, u)
    }

    fn ctx() -> AppCtx {
        let (cam, _log) = MockCamera::new();
        AppCtx::new(
            VerificationSession::new("sess"),
            CountryCatalog::bundled().unwrap(),
            Arc::new(MockVerifier::default()),
            CameraSlot::new(Box::new(cam)),
        )
    }

    #[tokio::test]
    async fn covering_screen_unmounts_and_pop_remounts() {
        let mut ctx = ctx();
        let (a, am, au) = counting_screen(false);
        let (b, bm, bu) = counting_screen(false);
        let mut router = Router::start(a, &mut ctx).await;
        assert_eq!(am.load(Ordering::SeqCst), 1);

        router.apply(Transition::Push(b), &mut ctx).await;
        assert_eq!(au.load(Ordering::SeqCst), 1);
        assert_eq!(bm.load(Ordering::SeqCst), 1);

        assert!(router.apply(Transition::Pop, &mut ctx).await);
        assert_eq!(bu.load(Ordering::SeqCst), 1);
        assert_eq!(am.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn overlays_do_not_unmount_the_screen_below() {
        let mut ctx = ctx();
        let (a, am, au) = counting_screen(false);
        let (o, om, _) = counting_screen(true);
        let mut router = Router::start(a, &mut ctx).await;
        router.apply(Transition::Push(o), &mut ctx).await;
        router.apply(Transition::Pop, &mut ctx).await;
        assert_eq!(am.load(Ordering::SeqCst), 1);
        assert_eq!(au.load(Ordering::SeqCst), 0);
        assert_eq!(om.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn popping_last_screen_exits() {
        let mut ctx = ctx();
        let (a, _, au) = counting_screen(false);
        let mut router = Router::start(a, &mut ctx).await;
        assert!(!router.apply(Transition::Pop, &mut ctx).await);
        assert_eq!(au.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn restart_begins_a_new_session() {
        let mut ctx = ctx();
        let (a, _, au) = counting_screen(false);
        let mut router = Router::start(a, &mut ctx).await;
        assert!(router.apply(Transition::Restart, &mut ctx).await);
        assert_eq!(au.load(Ordering::SeqCst), 1);
        assert_ne!(ctx.wizard.session.as_str(), "sess");
        assert_eq!(router.depth(), 1);
    }
}
