use crossterm::event::{KeyCode, KeyEvent};
use crate::app::Transition;

/// Return `Transition::Pop` on Esc so every wizard step gets "Back" for free.
pub fn esc_to_back(k: KeyEvent) -> Option<Transition> {
    if matches!(k.code, KeyCode::Esc) {
        Some(Transition::Pop)
    } else {
        None
    }
}

/// Tab behaves like Down, Shift+Tab like Up.
pub fn tab_as_arrow(k: KeyEvent) -> KeyCode {
    match k.code {
        KeyCode::Tab => KeyCode::Down,
        KeyCode::BackTab => KeyCode::Up,
        other => other,
    }
}
