use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const ESC: i32 = 27;

// `waitKeyEx` arrow codes for the GTK, Cocoa, Win32 and Qt backends.
const WINDOW_UP: [i32; 4] = [0xFF52, 0xF700, 0x26_0000, 0x0100_0013];
const WINDOW_DOWN: [i32; 4] = [0xFF54, 0xF701, 0x28_0000, 0x0100_0015];

/// What a key press asks the main loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    NextFilter,
    PrevFilter,
    /// Drop the current filter's state so it starts over.
    Reset,
    Snapshot,
    Quit,
}

impl UiCommand {
    /// Map a terminal key event. Releases and repeats are ignored.
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        // Raw mode swallows SIGINT, so Ctrl-C arrives as a key.
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return matches!(event.code, KeyCode::Char('c')).then_some(UiCommand::Quit);
        }
        match event.code {
            KeyCode::Up | KeyCode::Char('j') => Some(UiCommand::NextFilter),
            KeyCode::Down | KeyCode::Char('k') => Some(UiCommand::PrevFilter),
            KeyCode::Char('r') => Some(UiCommand::Reset),
            KeyCode::Char('s') => Some(UiCommand::Snapshot),
            KeyCode::Char('q') | KeyCode::Esc => Some(UiCommand::Quit),
            _ => None,
        }
    }

    /// Map a `waitKeyEx` code from one of the OpenCV windows.
    ///
    /// GTK reports modifier state above bit 16; it is ignored. Any other
    /// non-ASCII key (function keys, keypad) maps to nothing.
    pub fn from_window_key(code: i32) -> Option<Self> {
        if code < 0 {
            return None;
        }
        let key = code & 0xFFFF;
        if WINDOW_UP.contains(&code) || WINDOW_UP.contains(&key) {
            return Some(UiCommand::NextFilter);
        }
        if WINDOW_DOWN.contains(&code) || WINDOW_DOWN.contains(&key) {
            return Some(UiCommand::PrevFilter);
        }
        if key >= 0x80 {
            return None;
        }
        if key == ESC {
            return Some(UiCommand::Quit);
        }
        match char::from(key as u8) {
            'j' => Some(UiCommand::NextFilter),
            'k' => Some(UiCommand::PrevFilter),
            'r' => Some(UiCommand::Reset),
            's' => Some(UiCommand::Snapshot),
            'q' => Some(UiCommand::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_letters() {
        assert_eq!(UiCommand::from_key_event(&press(KeyCode::Up)), Some(UiCommand::NextFilter));
        assert_eq!(UiCommand::from_key_event(&press(KeyCode::Char('j'))), Some(UiCommand::NextFilter));
        assert_eq!(UiCommand::from_key_event(&press(KeyCode::Down)), Some(UiCommand::PrevFilter));
        assert_eq!(UiCommand::from_key_event(&press(KeyCode::Char('k'))), Some(UiCommand::PrevFilter));
        assert_eq!(UiCommand::from_key_event(&press(KeyCode::Char('r'))), Some(UiCommand::Reset));
        assert_eq!(UiCommand::from_key_event(&press(KeyCode::Char('s'))), Some(UiCommand::Snapshot));
        assert_eq!(UiCommand::from_key_event(&press(KeyCode::Esc)), Some(UiCommand::Quit));
        assert_eq!(UiCommand::from_key_event(&press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(UiCommand::from_key_event(&event), Some(UiCommand::Quit));
        let event = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL);
        assert_eq!(UiCommand::from_key_event(&event), None);
    }

    #[test]
    fn release_ignored() {
        let event = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(UiCommand::from_key_event(&event), None);
    }

    #[test]
    fn window_keys() {
        assert_eq!(UiCommand::from_window_key(-1), None);
        assert_eq!(UiCommand::from_window_key(27), Some(UiCommand::Quit));
        assert_eq!(UiCommand::from_window_key('q' as i32), Some(UiCommand::Quit));
        assert_eq!(UiCommand::from_window_key('j' as i32), Some(UiCommand::NextFilter));
        // Some backends set high bits on plain keys.
        assert_eq!(UiCommand::from_window_key(0x100000 | 'k' as i32), Some(UiCommand::PrevFilter));
        assert_eq!(UiCommand::from_window_key('z' as i32), None);
    }

    #[test]
    fn window_arrows_per_backend() {
        for code in WINDOW_UP {
            assert_eq!(UiCommand::from_window_key(code), Some(UiCommand::NextFilter));
        }
        for code in WINDOW_DOWN {
            assert_eq!(UiCommand::from_window_key(code), Some(UiCommand::PrevFilter));
        }
        // GTK up arrow with NumLock held.
        assert_eq!(UiCommand::from_window_key(0x10_FF52), Some(UiCommand::NextFilter));
    }

    #[test]
    fn window_function_keys_ignored() {
        // GTK Help and Break share their low byte with 'j' and 'k'.
        assert_eq!(UiCommand::from_window_key(0xFF6A), None);
        assert_eq!(UiCommand::from_window_key(0xFF6B), None);
        // F1
        assert_eq!(UiCommand::from_window_key(0xFFBE), None);
    }
}
