//! DEC private (`CSI ? Pn h/l`) and ANSI (`CSI Pn h/l`) mode registry.
//!
//! The common, frequently-toggled modes get dedicated bitflags so callers
//! can query them without a lookup; any DEC mode number not in the known set
//! is still tracked (set/reset/query) via a side table, per the redesign
//! note in spec §9 calling for an open-ended registry instead of silently
//! dropping unrecognized codes.

use bitflags::bitflags;
use std::collections::BTreeSet;

bitflags! {
    /// ANSI (non-DEC-private) modes, `CSI Pn h`/`CSI Pn l`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnsiModes: u32 {
        /// IRM (mode 4): insert vs. replace when printing.
        const INSERT           = 1 << 0;
        /// LNM (mode 20): linefeed also performs a carriage return.
        const LINEFEED_NEWLINE = 1 << 1;
    }
}

bitflags! {
    /// Well-known DEC private modes, `CSI ? Pn h`/`CSI ? Pn l`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DecModes: u32 {
        /// DECCKM (1): cursor keys send application sequences.
        const APPLICATION_CURSOR_KEYS = 1 << 0;
        /// DECOM (6): origin mode, addressing relative to the scroll region.
        const ORIGIN                  = 1 << 1;
        /// DECAWM (7): auto-wrap at the right margin.
        const AUTO_WRAP               = 1 << 2;
        /// Text cursor visibility (25).
        const CURSOR_VISIBLE          = 1 << 3;
        /// Alternate screen buffer selection (47/1047/1049).
        const ALTERNATE_SCREEN        = 1 << 4;
        /// Save/restore cursor bundled with 1049's buffer switch.
        const ALTERNATE_SCREEN_SAVE   = 1 << 5;
        /// Application keypad mode (DECKPAM/DECKPNM, 66).
        const APPLICATION_KEYPAD      = 1 << 6;
        /// Bracketed paste mode (2004).
        const BRACKETED_PASTE         = 1 << 7;
        /// X10 mouse reporting (9).
        const MOUSE_X10               = 1 << 8;
        /// Normal (press/release) mouse reporting (1000).
        const MOUSE_NORMAL            = 1 << 9;
        /// Button-event mouse reporting (1002).
        const MOUSE_BUTTON_EVENT      = 1 << 10;
        /// Any-event mouse reporting (1003).
        const MOUSE_ANY_EVENT         = 1 << 11;
        /// UTF-8 mouse coordinate encoding (1005).
        const MOUSE_UTF8              = 1 << 12;
        /// SGR mouse coordinate encoding (1006).
        const MOUSE_SGR               = 1 << 13;
        /// URXVT mouse coordinate encoding (1015).
        const MOUSE_URXVT             = 1 << 14;
        /// Focus in/out reporting (1004).
        const FOCUS_EVENTS            = 1 << 15;
        /// Synchronized output (2026): damage is withheld until reset.
        const SYNCHRONIZED_OUTPUT     = 1 << 16;
    }
}

/// The DEC mode codes mapped to each [`DecModes`] flag, used to translate a
/// `CSI ? Pn h/l` parameter into its bit and back for `DSR`/`DECRQM` replies.
const KNOWN_DEC_CODES: &[(u16, DecModes)] = &[
    (1, DecModes::APPLICATION_CURSOR_KEYS),
    (6, DecModes::ORIGIN),
    (7, DecModes::AUTO_WRAP),
    (9, DecModes::MOUSE_X10),
    (25, DecModes::CURSOR_VISIBLE),
    (47, DecModes::ALTERNATE_SCREEN),
    (66, DecModes::APPLICATION_KEYPAD),
    (1000, DecModes::MOUSE_NORMAL),
    (1002, DecModes::MOUSE_BUTTON_EVENT),
    (1003, DecModes::MOUSE_ANY_EVENT),
    (1004, DecModes::FOCUS_EVENTS),
    (1005, DecModes::MOUSE_UTF8),
    (1006, DecModes::MOUSE_SGR),
    (1015, DecModes::MOUSE_URXVT),
    (1047, DecModes::ALTERNATE_SCREEN),
    (1049, DecModes::ALTERNATE_SCREEN_SAVE),
    (2004, DecModes::BRACKETED_PASTE),
    (2026, DecModes::SYNCHRONIZED_OUTPUT),
];

const KNOWN_ANSI_CODES: &[(u16, AnsiModes)] = &[(4, AnsiModes::INSERT), (20, AnsiModes::LINEFEED_NEWLINE)];

/// Full mode state: the fast-path bitflags plus an overflow set for any DEC
/// private mode number this registry doesn't name explicitly.
#[derive(Debug, Clone, Default)]
pub struct Modes {
    pub dec: DecModes,
    pub ansi: AnsiModes,
    /// DEC private codes not covered by [`DecModes`], tracked as "set" by number.
    other_dec: BTreeSet<u16>,
}

impl Modes {
    /// Power-on defaults: auto-wrap and cursor-visible on, everything else off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dec: DecModes::AUTO_WRAP | DecModes::CURSOR_VISIBLE,
            ansi: AnsiModes::empty(),
            other_dec: BTreeSet::new(),
        }
    }

    /// RIS: restore power-on defaults.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// `CSI ? code h` (`on = true`) / `CSI ? code l` (`on = false`).
    pub fn set_dec_mode(&mut self, code: u16, on: bool) {
        if let Some(&(_, flag)) = KNOWN_DEC_CODES.iter().find(|&&(c, _)| c == code) {
            self.dec.set(flag, on);
            return;
        }
        if on {
            self.other_dec.insert(code);
        } else {
            self.other_dec.remove(&code);
        }
    }

    /// `CSI code h` (`on = true`) / `CSI code l` (`on = false`).
    pub fn set_ansi_mode(&mut self, code: u16, on: bool) {
        if let Some(&(_, flag)) = KNOWN_ANSI_CODES.iter().find(|&&(c, _)| c == code) {
            self.ansi.set(flag, on);
        }
    }

    /// Query a DEC private mode by its numeric code, known or not.
    #[must_use]
    pub fn dec_mode(&self, code: u16) -> bool {
        if let Some(&(_, flag)) = KNOWN_DEC_CODES.iter().find(|&&(c, _)| c == code) {
            return self.dec.contains(flag);
        }
        self.other_dec.contains(&code)
    }

    #[must_use]
    pub fn ansi_mode(&self, code: u16) -> bool {
        KNOWN_ANSI_CODES
            .iter()
            .find(|&&(c, _)| c == code)
            .is_some_and(|&(_, flag)| self.ansi.contains(flag))
    }
}
