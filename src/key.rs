//! Translation from structured key/mouse input into the byte strings a PTY
//! expects, per spec §6's wire-format table.

use crate::modes::{DecModes, Modes};

/// A non-printable key, independent of any particular keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Function(u8),
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    #[must_use]
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }
}

/// Encode a key event into the bytes the host should write to the PTY,
/// honoring application-cursor-keys and application-keypad mode.
#[must_use]
pub fn encode_key(event: KeyEvent, modes: &Modes) -> Vec<u8> {
    let app_cursor = modes.dec.contains(DecModes::APPLICATION_CURSOR_KEYS);
    let ctrl = event.modifiers.contains(KeyModifiers::CTRL);

    match event.code {
        KeyCode::Char(c) if ctrl && c.is_ascii_alphabetic() => {
            vec![(c.to_ascii_uppercase() as u8) & 0x1f]
        }
        KeyCode::Char(c) => c.to_string().into_bytes(),
        KeyCode::Enter => b"\r".to_vec(),
        KeyCode::Tab => b"\t".to_vec(),
        KeyCode::Backspace => b"\x7f".to_vec(),
        KeyCode::Escape => b"\x1b".to_vec(),
        KeyCode::Up => arrow(app_cursor, b'A'),
        KeyCode::Down => arrow(app_cursor, b'B'),
        KeyCode::Right => arrow(app_cursor, b'C'),
        KeyCode::Left => arrow(app_cursor, b'D'),
        KeyCode::Home => arrow(app_cursor, b'H'),
        KeyCode::End => arrow(app_cursor, b'F'),
        KeyCode::PageUp => b"\x1b[5~".to_vec(),
        KeyCode::PageDown => b"\x1b[6~".to_vec(),
        KeyCode::Insert => b"\x1b[2~".to_vec(),
        KeyCode::Delete => b"\x1b[3~".to_vec(),
        KeyCode::Function(n) => function_key(n),
    }
}

fn arrow(app_cursor: bool, final_byte: u8) -> Vec<u8> {
    let lead = if app_cursor { b'O' } else { b'[' };
    vec![0x1b, lead, final_byte]
}

fn function_key(n: u8) -> Vec<u8> {
    let code = match n {
        1 => 11,
        2 => 12,
        3 => 13,
        4 => 14,
        5 => 15,
        6 => 17,
        7 => 18,
        8 => 19,
        9 => 20,
        10 => 21,
        11 => 23,
        12 => 24,
        _ => return Vec::new(),
    };
    format!("\x1b[{code}~").into_bytes()
}

/// Wrap pasted text in bracketed-paste markers if mode 2004 is enabled.
#[must_use]
pub fn encode_paste(text: &str, modes: &Modes) -> Vec<u8> {
    if modes.dec.contains(DecModes::BRACKETED_PASTE) {
        let mut out = b"\x1b[200~".to_vec();
        out.extend_from_slice(text.as_bytes());
        out.extend_from_slice(b"\x1b[201~");
        out
    } else {
        text.as_bytes().to_vec()
    }
}

/// Mouse button/event kind for encoding, independent of wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    Release,
}

/// Encode a mouse event using whichever protocol the mode registry selects,
/// preferring SGR (1006) when enabled, per spec §6 ("mode 1006 is recommended").
#[must_use]
pub fn encode_mouse(button: MouseButton, col: u16, row: u16, modes: &Modes) -> Vec<u8> {
    let code = mouse_button_code(button);
    if modes.dec.contains(DecModes::MOUSE_SGR) {
        let final_byte = if matches!(button, MouseButton::Release) { 'm' } else { 'M' };
        return format!("\x1b[<{code};{};{}{final_byte}", col + 1, row + 1).into_bytes();
    }
    if modes.dec.contains(DecModes::MOUSE_URXVT) {
        return format!("\x1b[{};{};{}M", code + 32, col + 1, row + 1).into_bytes();
    }
    // Legacy X10/normal encoding: button + 32, column + 32, row + 32, each
    // clamped to stay within a single byte (coordinates above 223 saturate).
    let cb = (code + 32).min(255) as u8;
    let cx = (col + 1 + 32).min(255) as u8;
    let cy = (row + 1 + 32).min(255) as u8;
    vec![0x1b, b'[', b'M', cb, cx, cy]
}

fn mouse_button_code(button: MouseButton) -> u16 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::Release => 3,
        MouseButton::WheelUp => 64,
        MouseButton::WheelDown => 65,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_letter_produces_control_code() {
        let modes = Modes::new();
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CTRL);
        assert_eq!(encode_key(event, &modes), vec![0x03]);
    }

    #[test]
    fn arrow_key_uses_csi_by_default_and_ss3_in_app_mode() {
        let mut modes = Modes::new();
        let event = KeyEvent::new(KeyCode::Up, KeyModifiers::empty());
        assert_eq!(encode_key(event, &modes), b"\x1b[A".to_vec());
        modes.dec.insert(DecModes::APPLICATION_CURSOR_KEYS);
        assert_eq!(encode_key(event, &modes), b"\x1bOA".to_vec());
    }

    #[test]
    fn paste_wraps_in_bracketed_markers_when_enabled() {
        let mut modes = Modes::new();
        modes.dec.insert(DecModes::BRACKETED_PASTE);
        assert_eq!(encode_paste("hi", &modes), b"\x1b[200~hi\x1b[201~".to_vec());
        modes.dec.remove(DecModes::BRACKETED_PASTE);
        assert_eq!(encode_paste("hi", &modes), b"hi".to_vec());
    }

    #[test]
    fn sgr_mouse_encoding_is_preferred_when_enabled() {
        let mut modes = Modes::new();
        modes.dec.insert(DecModes::MOUSE_SGR);
        let bytes = encode_mouse(MouseButton::Left, 4, 2, &modes);
        assert_eq!(bytes, b"\x1b[<0;5;3M".to_vec());
    }

    #[test]
    fn legacy_mouse_encoding_is_used_without_sgr() {
        let modes = Modes::new();
        let bytes = encode_mouse(MouseButton::Left, 0, 0, &modes);
        assert_eq!(bytes, vec![0x1b, b'[', b'M', 32, 33, 33]);
    }
}
