//! G0-G3 character-set designation and translation.
//!
//! A terminal designates up to four 96/94-character sets into slots G0-G3
//! (`ESC ( charset` for G0, `ESC ) charset` for G1, ...), selects one of
//! them as the active "GL" set via locking shift (SI/SO/LS2/LS3), and may
//! override the next single graphic character via single-shift (SS2/SS3).
//!
//! Only `DecSpecialGraphics` actually remaps bytes; the others are modeled
//! for designation-state completeness but pass characters through
//! unchanged (no published, stable mapping tables for DEC Technical/UK
//! are bundled).

/// A designatable character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// US-ASCII: no translation.
    #[default]
    Ascii,
    /// UK national: identical to ASCII except `#` maps to `£`.
    Uk,
    /// DEC Special Graphics and Line Drawing.
    DecSpecialGraphics,
    /// DEC Technical (pass-through; no glyph remapping table bundled).
    DecTechnical,
    /// Any other designation the parser recognized but this translator
    /// doesn't have a mapping table for.
    Unknown,
}

impl Charset {
    /// Parse the single intermediate+final byte pair used by `ESC ( F`-style
    /// charset designation sequences into a [`Charset`].
    ///
    /// Returns `None` (caller falls back to US-ASCII and records a warning)
    /// when the final byte is not one of the commonly supported sets.
    #[must_use]
    pub fn from_designator(final_byte: u8) -> Option<Self> {
        match final_byte {
            b'B' => Some(Self::Ascii),
            b'A' => Some(Self::Uk),
            b'0' | b'2' => Some(Self::DecSpecialGraphics),
            b'>' => Some(Self::DecTechnical),
            _ => None,
        }
    }
}

/// Translate one graphic character through the given charset's mapping.
///
/// Only 7-bit graphic bytes (0x20-0x7E) are remapped by `DecSpecialGraphics`
/// and `Uk`; any other scalar value (already-decoded UTF-8 text) passes
/// through unchanged, since multi-byte input is meaningless under a
/// 7-bit-only VT charset designation.
#[must_use]
pub fn translate_charset(ch: char, charset: Charset) -> char {
    if !ch.is_ascii() {
        return ch;
    }
    match charset {
        Charset::Ascii | Charset::DecTechnical | Charset::Unknown => ch,
        Charset::Uk => {
            if ch == '#' {
                '£'
            } else {
                ch
            }
        }
        Charset::DecSpecialGraphics => dec_special_graphics(ch),
    }
}

/// DEC Special Graphics and Line Drawing Set mapping (VT100), 0x5F-0x7E.
fn dec_special_graphics(ch: char) -> char {
    match ch {
        '_' => ' ',
        '`' => '◆',
        'a' => '▒',
        'b' => '\u{2409}',
        'c' => '\u{240c}',
        'd' => '\u{240d}',
        'e' => '\u{240a}',
        'f' => '°',
        'g' => '±',
        'h' => '\u{2424}',
        'i' => '\u{240b}',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'q' => '─',
        'r' => '⎼',
        's' => '⎽',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        other => other,
    }
}

/// Designation state for the four G-set slots plus the active GL/GR slot
/// and any pending single-shift override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharSetState {
    slots: [Charset; 4],
    /// Which slot (0-3) is locked into GL via SI/SO/LS2/LS3.
    gl: u8,
    /// One-shot override from SS2/SS3; consumed by the next printed char.
    single_shift: Option<u8>,
}

impl Default for CharSetState {
    fn default() -> Self {
        Self {
            slots: [Charset::Ascii; 4],
            gl: 0,
            single_shift: None,
        }
    }
}

impl CharSetState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `ESC ( | ) | * | + <final>`: designate a charset into slot 0-3.
    pub fn designate(&mut self, slot: u8, charset: Charset) {
        if let Some(s) = self.slots.get_mut(slot as usize) {
            *s = charset;
        }
    }

    /// Locking shift: make `slot` the active GL set (SI=G0, SO=G1, LS2=G2, LS3=G3).
    pub fn lock_shift(&mut self, slot: u8) {
        if slot < 4 {
            self.gl = slot;
        }
    }

    /// SS2/SS3: the *next* printed character only uses `slot`, then GL reverts.
    pub fn single_shift(&mut self, slot: u8) {
        if slot < 4 {
            self.single_shift = Some(slot);
        }
    }

    /// The charset that should translate the very next printed character.
    #[must_use]
    pub fn effective(&self) -> Charset {
        let slot = self.single_shift.unwrap_or(self.gl);
        self.slots[slot as usize]
    }

    /// Consume any pending single-shift override (call once per printed char).
    pub fn consume_single_shift(&mut self) {
        self.single_shift = None;
    }

    /// Reset to power-on defaults (RIS/DECSTR).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
