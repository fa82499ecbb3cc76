//! Mapping from terminal events to game input.

use crate::types::GameAction;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// A left-button press at a terminal cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tap {
    pub column: u16,
    pub row: u16,
}

/// One decoded piece of terminal input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Action(GameAction),
    Tap(Tap),
    Quit,
}

/// Map keyboard input to game actions.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(GameAction::CursorLeft)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(GameAction::CursorRight)
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(GameAction::CursorUp)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(GameAction::CursorDown)
        }

        KeyCode::Char(' ') | KeyCode::Enter => Some(GameAction::Select),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Restart),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Left-button presses become taps; everything else (drags, releases, wheel) is dropped.
pub fn handle_mouse_event(mouse: MouseEvent) -> Option<Tap> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Tap {
            column: mouse.column,
            row: mouse.row,
        }),
        _ => None,
    }
}

/// Decode any terminal event
///
/// Key releases and repeats are ignored so a held key acts once.
pub fn translate_event(event: &Event) -> Option<InputCommand> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if should_quit(*key) {
                Some(InputCommand::Quit)
            } else {
                handle_key_event(*key).map(InputCommand::Action)
            }
        }
        Event::Mouse(mouse) => handle_mouse_event(*mouse).map(InputCommand::Tap),
        _ => None,
    }
}
