// keys.rs - Terminal key decoding

use conway::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Maps a key press to a command. Modified keys (Ctrl+C included) map to nothing.
pub fn decode(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }

    let command = match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Start,
        KeyCode::Char('c') | KeyCode::Char('C') => Command::Cancel,
        KeyCode::Char('s') | KeyCode::Char('S') => Command::Step,
        KeyCode::Char('u') | KeyCode::Char('U') => Command::Toggle,
        KeyCode::Char('e') | KeyCode::Char('E')
        | KeyCode::Char('q') | KeyCode::Esc     => Command::Exit,
        KeyCode::Up                             => Command::Move { d_row: -1, d_col: 0 },
        KeyCode::Down                           => Command::Move { d_row: 1, d_col: 0 },
        KeyCode::Left                           => Command::Move { d_row: 0, d_col: -1 },
        KeyCode::Right                          => Command::Move { d_row: 0, d_col: 1 },
        _ => return None,
    };
    Some(command)
}
