//! Key bindings: WASD-style letters plus arrow keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Command from a key press. `Unrecognized` is an explicit no-op turn,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    Restart,
    Quit,
    Unrecognized,
}

/// Map a key event to a command. Letters are case-insensitive.
pub fn key_to_command(key: KeyEvent) -> Command {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Command::Unrecognized;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Command::Quit,
        KeyCode::Left | KeyCode::Char('a' | 'A') => Command::MoveLeft,
        KeyCode::Right | KeyCode::Char('d' | 'D') => Command::MoveRight,
        KeyCode::Up | KeyCode::Char('w' | 'W') => Command::Rotate,
        KeyCode::Down | KeyCode::Char('s' | 'S') => Command::SoftDrop,
        KeyCode::Enter | KeyCode::Char(' ') => Command::HardDrop,
        KeyCode::Char('r' | 'R') => Command::Restart,
        _ => Command::Unrecognized,
    }
}
