//! Host-suppliable color palette: the 16 ANSI colors, the 240 extended
//! indexed colors, and the default foreground/background/cursor colors
//! that `OSC 4`/`OSC 10`/`OSC 11`/`OSC 12` set and query.
//!
//! The grid itself never reads this table; cells only carry a [`Color`]
//! tag (`Named`/`Indexed`/`Rgb`/`Default`), and resolving a tag to RGB for
//! rendering is the host's job. This table exists purely to answer query
//! requests with whatever color the host last configured, since the
//! terminal has no other memory of what a tag currently maps to.

/// RGB triple, 8 bits per channel.
pub type Rgb = (u8, u8, u8);

/// Which slot an `OSC 4`/`10`/`11`/`12` set or query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteSlot {
    /// One of the 256 indexed colors (`OSC 4 ; index ; spec`).
    Indexed(u8),
    /// Default foreground (`OSC 10`).
    DefaultForeground,
    /// Default background (`OSC 11`).
    DefaultBackground,
    /// Text cursor color (`OSC 12`).
    Cursor,
}

/// xterm's stock default fg/bg/cursor, used until the host overrides them.
const DEFAULT_FG: Rgb = (229, 229, 229);
const DEFAULT_BG: Rgb = (0, 0, 0);
const DEFAULT_CURSOR: Rgb = (229, 229, 229);

/// Host-configurable color table backing `OSC 4`/`10`/`11`/`12`.
///
/// Indexed entries start unset (`None`); a query against an unset index
/// falls back to the standard 16-color/216-cube/grayscale-ramp formula so
/// replies are always answerable even before the host configures anything.
#[derive(Debug, Clone)]
pub struct Palette {
    indexed: [Option<Rgb>; 256],
    default_fg: Rgb,
    default_bg: Rgb,
    cursor: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    #[must_use]
    pub fn new() -> Self {
        Self { indexed: [None; 256], default_fg: DEFAULT_FG, default_bg: DEFAULT_BG, cursor: DEFAULT_CURSOR }
    }

    pub fn set(&mut self, slot: PaletteSlot, rgb: Rgb) {
        match slot {
            PaletteSlot::Indexed(i) => self.indexed[i as usize] = Some(rgb),
            PaletteSlot::DefaultForeground => self.default_fg = rgb,
            PaletteSlot::DefaultBackground => self.default_bg = rgb,
            PaletteSlot::Cursor => self.cursor = rgb,
        }
    }

    /// Clear a host override, falling back to the built-in default again.
    /// `None` resets every indexed entry (xterm's `OSC 104` with no index).
    pub fn reset_indexed(&mut self, index: Option<u8>) {
        match index {
            Some(i) => self.indexed[i as usize] = None,
            None => self.indexed = [None; 256],
        }
    }

    #[must_use]
    pub fn resolve(&self, slot: PaletteSlot) -> Rgb {
        match slot {
            PaletteSlot::Indexed(i) => self.indexed[i as usize].unwrap_or_else(|| indexed_default(i)),
            PaletteSlot::DefaultForeground => self.default_fg,
            PaletteSlot::DefaultBackground => self.default_bg,
            PaletteSlot::Cursor => self.cursor,
        }
    }
}

/// The standard xterm 256-color formula: 0-15 named, 16-231 a 6x6x6 cube,
/// 232-255 a 24-step grayscale ramp.
fn indexed_default(index: u8) -> Rgb {
    const NAMED: [Rgb; 16] = [
        (0, 0, 0),
        (205, 0, 0),
        (0, 205, 0),
        (205, 205, 0),
        (0, 0, 238),
        (205, 0, 205),
        (0, 205, 205),
        (229, 229, 229),
        (127, 127, 127),
        (255, 0, 0),
        (0, 255, 0),
        (255, 255, 0),
        (92, 92, 255),
        (255, 0, 255),
        (0, 255, 255),
        (255, 255, 255),
    ];
    if let Some(&rgb) = NAMED.get(index as usize) {
        return rgb;
    }
    if index >= 232 {
        let level = 8 + (index - 232) * 10;
        return (level, level, level);
    }
    let cube = index - 16;
    let steps = [0u8, 95, 135, 175, 215, 255];
    let r = steps[(cube / 36) as usize];
    let g = steps[((cube / 6) % 6) as usize];
    let b = steps[(cube % 6) as usize];
    (r, g, b)
}

/// Format an `OSC 10/11/12` reply: `ESC ] Ps ; rgb:rrrr/gggg/bbbb ST`.
#[must_use]
pub fn format_color_reply(ps: u8, rgb: Rgb) -> Vec<u8> {
    let (r, g, b) = rgb;
    format!("\x1b]{ps};rgb:{r:02x}{r:02x}/{g:02x}{g:02x}/{b:02x}{b:02x}\x1b\\").into_bytes()
}
