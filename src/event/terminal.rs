//! Key decoding for terminal sessions.
//!
//! Two entry points yield the same [`EditEvent`]s: [`interpret_key`] for
//! crossterm key structs, [`interpret_raw`] for displays that hand over the
//! xterm byte sequences a key produces.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::EditEvent;

/// Map a key event to an edit event. Unsupported keys and key releases yield `None`.
pub fn interpret_key(key_event: KeyEvent) -> Option<EditEvent> {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = key_event;

    if kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let plain = modifiers.difference(KeyModifiers::SHIFT).is_empty();

    match code {
        KeyCode::Char(c) if ctrl && c.eq_ignore_ascii_case(&'c') => Some(EditEvent::Cancel),
        KeyCode::Char(c) if plain && !c.is_control() => Some(EditEvent::Insert(c)),
        KeyCode::Backspace if plain => Some(EditEvent::Erase),
        KeyCode::Up if plain => Some(EditEvent::RecallPrevious),
        KeyCode::Down if plain => Some(EditEvent::RecallNext),
        KeyCode::Enter if plain => Some(EditEvent::Submit),
        _ => None,
    }
}

/// Map one raw input sequence to an edit event.
pub fn interpret_raw(data: &str) -> Option<EditEvent> {
    match data {
        "\r" | "\n" | "\r\n" => Some(EditEvent::Submit),
        "\x7f" | "\x08" => Some(EditEvent::Erase),
        "\x1b[A" | "\x1bOA" => Some(EditEvent::RecallPrevious),
        "\x1b[B" | "\x1bOB" => Some(EditEvent::RecallNext),
        "\x03" => Some(EditEvent::Cancel),
        _ => {
            let mut chars = data.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !c.is_control() => Some(EditEvent::Insert(c)),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_printable_chars_insert() {
        assert_eq!(
            interpret_key(key(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(EditEvent::Insert('a'))
        );
        assert_eq!(
            interpret_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(EditEvent::Insert('A'))
        );
        assert_eq!(
            interpret_key(key(KeyCode::Char('é'), KeyModifiers::NONE)),
            Some(EditEvent::Insert('é'))
        );
    }

    #[test]
    fn test_modified_chars_are_ignored() {
        assert_eq!(interpret_key(key(KeyCode::Char('x'), KeyModifiers::ALT)), None);
        assert_eq!(interpret_key(key(KeyCode::Char('d'), KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn test_editing_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(interpret_key(key(KeyCode::Backspace, none)), Some(EditEvent::Erase));
        assert_eq!(interpret_key(key(KeyCode::Up, none)), Some(EditEvent::RecallPrevious));
        assert_eq!(interpret_key(key(KeyCode::Down, none)), Some(EditEvent::RecallNext));
        assert_eq!(interpret_key(key(KeyCode::Enter, none)), Some(EditEvent::Submit));
        assert_eq!(
            interpret_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(EditEvent::Cancel)
        );
    }

    #[test]
    fn test_unsupported_keys_are_ignored() {
        let none = KeyModifiers::NONE;
        for code in [KeyCode::Left, KeyCode::Right, KeyCode::Tab, KeyCode::Esc, KeyCode::F(1)] {
            assert_eq!(interpret_key(key(code, none)), None);
        }
    }

    #[test]
    fn test_key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(interpret_key(release), None);
    }

    #[test]
    fn test_raw_sequences() {
        assert_eq!(interpret_raw("\r"), Some(EditEvent::Submit));
        assert_eq!(interpret_raw("\x7f"), Some(EditEvent::Erase));
        assert_eq!(interpret_raw("\x08"), Some(EditEvent::Erase));
        assert_eq!(interpret_raw("\x1b[A"), Some(EditEvent::RecallPrevious));
        assert_eq!(interpret_raw("\x1b[B"), Some(EditEvent::RecallNext));
        assert_eq!(interpret_raw("\x03"), Some(EditEvent::Cancel));
        assert_eq!(interpret_raw("q"), Some(EditEvent::Insert('q')));
        assert_eq!(interpret_raw("日"), Some(EditEvent::Insert('日')));
    }

    #[test]
    fn test_raw_unknown_sequences_are_ignored() {
        assert_eq!(interpret_raw(""), None);
        assert_eq!(interpret_raw("\x1b[C"), None);
        assert_eq!(interpret_raw("ab"), None);
        assert_eq!(interpret_raw("\t"), None);
    }
}
