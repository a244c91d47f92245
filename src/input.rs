//! Key bindings (normal and vim-style) and mouse → pointer edges.

use crate::canvas::TerminalViewport;
use crate::collab::{InputSource, ScreenPoint};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Restart,
    Back,
    Quit,
    None,
}

/// Map key event to an action. Supports both arrows and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Esc | KeyCode::Backspace => Action::Back,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        _ => Action::None,
    }
}

/// Key hints per screen as `(keys, what they do)`. The menu, the status bar,
/// the solved popup and `--help` all render from these tables.
pub const MENU_HINTS: [(&str, &str); 4] = [
    ("↑/↓ k/j", "picture"),
    ("←/→ h/l", "difficulty"),
    ("Enter", "start"),
    ("Q/Esc", "quit"),
];
pub const BOARD_HINTS: [(&str, &str); 4] = [
    ("mouse", "drag pieces"),
    ("R", "reshuffle"),
    ("Esc", "menu"),
    ("Q", "quit"),
];
pub const SOLVED_HINTS: [(&str, &str); 2] = [("Enter", "play again"), ("Q", "quit")];

/// `keys action · keys action · ...`
pub fn hint_line(hints: &[(&str, &str)]) -> String {
    hints
        .iter()
        .map(|(keys, action)| format!("{keys} {action}"))
        .collect::<Vec<_>>()
        .join(" · ")
}

/// Controls section of `--help`.
pub fn controls_help() -> String {
    format!(
        "CONTROLS (menu):\n  {}\n\nCONTROLS (board):\n  {}\n\nCONTROLS (solved):\n  {}",
        hint_line(&MENU_HINTS),
        hint_line(&BOARD_HINTS),
        hint_line(&SOLVED_HINTS),
    )
}

/// Left-button edges accumulated between two frames.
#[derive(Debug, Default)]
pub struct TerminalInput {
    position: Option<ScreenPoint>,
    pressed: bool,
    held: bool,
    released: bool,
}

impl TerminalInput {
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        self.position = Some(TerminalViewport::cell_center(event.column, event.row));
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = true;
                self.held = true;
            }
            MouseEventKind::Drag(MouseButton::Left) => self.held = true,
            MouseEventKind::Up(MouseButton::Left) => {
                self.released = true;
                self.held = false;
            }
            _ => {}
        }
    }

    /// Clear this frame's press / release edges. The held flag and position persist.
    pub fn end_step(&mut self) {
        self.pressed = false;
        self.released = false;
    }

    /// Forget everything, e.g. when leaving the board.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl InputSource for TerminalInput {
    fn current_pointer_position(&self) -> Option<ScreenPoint> {
        self.position
    }

    fn was_pressed_this_step(&self) -> bool {
        self.pressed
    }

    fn is_press_held(&self) -> bool {
        self.held
    }

    fn was_released_this_step(&self) -> bool {
        self.released
    }
}
