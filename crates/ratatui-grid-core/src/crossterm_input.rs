use crate::input::GridEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyModifiers;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;

use crossterm::event as ct;

/// Converts one crossterm event. Key releases and events the grid has no use for map to `None`.
pub fn grid_event_from_crossterm(ev: ct::Event) -> Option<GridEvent> {
    Some(match ev {
        ct::Event::Key(key) if key.kind == ct::KeyEventKind::Release => return None,
        ct::Event::Key(key) => GridEvent::Key(key_event_from_crossterm(key)?),
        ct::Event::Mouse(m) => GridEvent::Mouse(mouse_event_from_crossterm(m)?),
        ct::Event::Paste(text) => GridEvent::Paste(text),
        ct::Event::Resize(width, height) => GridEvent::Resize { width, height },
        _ => return None,
    })
}

/// `BackTab` arrives as `Tab` with shift held.
pub fn key_event_from_crossterm(key: ct::KeyEvent) -> Option<KeyEvent> {
    let mut modifiers = modifiers_from_crossterm(key.modifiers);
    if key.code == ct::KeyCode::BackTab {
        modifiers.shift = true;
    }
    Some(KeyEvent::new(key_code_from_crossterm(key.code)?).with_modifiers(modifiers))
}

fn key_code_from_crossterm(code: ct::KeyCode) -> Option<KeyCode> {
    use ct::KeyCode as C;
    Some(match code {
        C::Char(c) => KeyCode::Char(c),
        C::F(n) => KeyCode::F(n),
        C::Tab | C::BackTab => KeyCode::Tab,
        C::Enter => KeyCode::Enter,
        C::Esc => KeyCode::Esc,
        C::Backspace => KeyCode::Backspace,
        C::Delete => KeyCode::Delete,
        C::Up => KeyCode::Up,
        C::Down => KeyCode::Down,
        C::Left => KeyCode::Left,
        C::Right => KeyCode::Right,
        C::Home => KeyCode::Home,
        C::End => KeyCode::End,
        C::PageUp => KeyCode::PageUp,
        C::PageDown => KeyCode::PageDown,
        _ => return None,
    })
}

pub fn mouse_event_from_crossterm(m: ct::MouseEvent) -> Option<MouseEvent> {
    use ct::MouseEventKind as K;
    let kind = match m.kind {
        K::Down(b) => MouseEventKind::Down(mouse_button_from_crossterm(b)),
        K::Up(b) => MouseEventKind::Up(mouse_button_from_crossterm(b)),
        K::Drag(b) => MouseEventKind::Drag(mouse_button_from_crossterm(b)),
        K::Moved => MouseEventKind::Moved,
        K::ScrollUp => MouseEventKind::ScrollUp,
        K::ScrollDown => MouseEventKind::ScrollDown,
        K::ScrollLeft => MouseEventKind::ScrollLeft,
        K::ScrollRight => MouseEventKind::ScrollRight,
    };
    let mut ev = MouseEvent::new(m.column, m.row, kind);
    ev.modifiers = modifiers_from_crossterm(m.modifiers);
    Some(ev)
}

fn modifiers_from_crossterm(m: ct::KeyModifiers) -> KeyModifiers {
    KeyModifiers {
        shift: m.intersects(ct::KeyModifiers::SHIFT),
        ctrl: m.intersects(ct::KeyModifiers::CONTROL),
        alt: m.intersects(ct::KeyModifiers::ALT),
    }
}

fn mouse_button_from_crossterm(b: ct::MouseButton) -> MouseButton {
    match b {
        ct::MouseButton::Left => MouseButton::Left,
        ct::MouseButton::Right => MouseButton::Right,
        ct::MouseButton::Middle => MouseButton::Middle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::Event;
    use crossterm::event::KeyEventKind;

    #[test]
    fn back_tab_is_shift_tab() {
        let key = ct::KeyEvent::new(ct::KeyCode::BackTab, ct::KeyModifiers::NONE);
        let ev = key_event_from_crossterm(key).unwrap();
        assert_eq!(ev.code, KeyCode::Tab);
        assert!(ev.modifiers.shift);
        assert!(!ev.modifiers.ctrl);
    }

    #[test]
    fn release_events_are_dropped() {
        let mut key = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('j'),
            crossterm::event::KeyModifiers::NONE,
        );
        key.kind = KeyEventKind::Release;
        assert_eq!(grid_event_from_crossterm(Event::Key(key)), None);
    }

    #[test]
    fn resize_is_forwarded() {
        assert_eq!(
            grid_event_from_crossterm(Event::Resize(80, 24)),
            Some(GridEvent::Resize {
                width: 80,
                height: 24
            })
        );
    }

    #[test]
    fn shift_wheel_keeps_modifier() {
        let ev = crossterm::event::MouseEvent {
            kind: crossterm::event::MouseEventKind::ScrollDown,
            column: 3,
            row: 4,
            modifiers: crossterm::event::KeyModifiers::SHIFT,
        };
        let m = mouse_event_from_crossterm(ev).unwrap();
        assert_eq!(m.kind, MouseEventKind::ScrollDown);
        assert!(m.modifiers.shift);
    }
}
