//! Side-channel events: things the host needs to react to that aren't
//! expressed as grid damage (spec §6: "side events").

use crate::cell::Color;

/// One side event produced while feeding bytes, drained via
/// [`crate::terminal::Terminal::take_side_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Bell,
    TitleChanged(String),
    HyperlinkActivated { uri: String },
    PaletteChanged { index: u8, color: Color },
    PaletteReset { index: Option<u8> },
    MouseModeChanged,
    BracketedPasteStart,
    BracketedPasteEnd,
    FocusIn,
    FocusOut,
    /// A DCS passthrough payload this crate doesn't decode (e.g. Sixel),
    /// forwarded verbatim for a host renderer that understands it.
    DcsPayload { data: Vec<u8> },
    /// A sequence the parser or interpreter could not act on.
    Unsupported { description: String },
}
