//! VT/ANSI byte-stream parser.
//!
//! Implements Paul Flo Williams' DEC VT500-series state machine (the de
//! facto reference model for terminal parsers): 13 states covering ground,
//! single-character escapes, CSI, OSC, DCS, and the ignored SOS/PM/APC
//! string forms. Bytes are consumed incrementally via [`Parser::feed`] and
//! translated into a stream of [`Action`]s for the command interpreter.

use crate::charset::Charset;

/// One parsed unit of terminal input, ready for the command interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Print(char),
    Newline,
    CarriageReturn,
    Tab,
    Backspace,
    Bell,

    CursorUp(u16),
    CursorDown(u16),
    CursorRight(u16),
    CursorLeft(u16),
    CursorNextLine(u16),
    CursorPrevLine(u16),
    CursorRow(u16),
    CursorColumn(u16),
    CursorPosition { row: u16, col: u16 },

    SetScrollRegion { top: u16, bottom: u16 },
    ScrollUp(u16),
    ScrollDown(u16),
    InsertLines(u16),
    DeleteLines(u16),
    InsertChars(u16),
    DeleteChars(u16),
    EraseChars(u16),
    EraseInDisplay(u8),
    EraseInLine(u8),
    RepeatChar(u16),

    Sgr(Vec<i64>),
    DecSet(Vec<u16>),
    DecRst(Vec<u16>),
    AnsiSet(Vec<u16>),
    AnsiRst(Vec<u16>),

    SaveCursor,
    RestoreCursor,
    Index,
    ReverseIndex,
    NextLine,
    FullReset,
    SoftReset,
    ScreenAlignment,

    SetTitle(String),
    HyperlinkStart(String),
    HyperlinkEnd,

    SetTabStop,
    ClearTabStop(u8),
    BackTab(u16),

    ApplicationKeypad,
    NormalKeypad,
    SetCursorShape(u16),

    EraseScrollback,
    FocusIn,
    FocusOut,
    PasteStart,
    PasteEnd,

    DeviceAttributes,
    DeviceAttributesSecondary,
    DeviceStatusReport,
    CursorPositionReport,

    DesignateCharset { slot: u8, charset: Option<Charset> },
    LockShift(u8),
    SingleShift2,
    SingleShift3,

    MouseEvent { params: Vec<u16>, final_byte: u8 },

    OscSetPalette { index: u8, spec: String },
    OscResetPalette(Option<u8>),
    OscQueryColor(u8),

    DcsHook { params: Vec<u16>, intermediates: Vec<u8>, final_byte: u8 },
    DcsPut(Vec<u8>),
    DcsUnhook,

    /// A recognized-but-unhandled sequence, or one whose final byte this
    /// parser doesn't dispatch. `kind` distinguishes CSI/ESC/OSC/DCS origin.
    Unsupported { kind: &'static str, final_byte: u8, params: Vec<u16> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    OscString,
    DcsEntry,
    DcsParam,
    DcsIntermediate,
    DcsPassthrough,
    DcsIgnore,
    SosPmApcString,
}

/// Parameters are clamped to this value on overflow (spec §7: parameter
/// overflow is handled locally by clamping, never by aborting the sequence).
const MAX_PARAM: u16 = 9999;
const MAX_PARAMS: usize = 32;
const MAX_OSC_LEN: usize = 8192;
const MAX_DCS_LEN: usize = 65536;

/// VT/ANSI parser state and in-flight sequence buffers.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    params: Vec<u16>,
    current_param: Option<u32>,
    intermediates: Vec<u8>,
    private_marker: Option<u8>,
    osc_buf: Vec<u8>,
    dcs_buf: Vec<u8>,
    utf8_pending: Vec<u8>,
    utf8_need: usize,
    /// Set when a string state (OSC/DCS passthrough/SOS-PM-APC) just saw an
    /// ESC and is waiting to see whether `\` follows (ST) or not (abort).
    string_esc_pending: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: Vec::new(),
            current_param: None,
            intermediates: Vec::new(),
            private_marker: None,
            osc_buf: Vec::new(),
            dcs_buf: Vec::new(),
            utf8_pending: Vec::new(),
            utf8_need: 0,
            string_esc_pending: false,
        }
    }

    #[must_use]
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Action> {
        let mut out = Vec::new();
        for &b in bytes {
            self.advance(b, &mut out);
        }
        out
    }

    fn advance(&mut self, b: u8, out: &mut Vec<Action>) {
        // C1 controls (0x80-0x9F) introduce the same transitions as their
        // 7-bit ESC equivalents; only handle the 8th bit here, the rest of
        // ground/escape matching is shared.
        match self.state {
            State::Ground => self.advance_ground(b, out),
            State::Escape => self.advance_escape(b, out),
            State::EscapeIntermediate => self.advance_escape_intermediate(b, out),
            State::CsiEntry => self.advance_csi_entry(b, out),
            State::CsiParam => self.advance_csi_param(b, out),
            State::CsiIntermediate => self.advance_csi_intermediate(b, out),
            State::CsiIgnore => self.advance_csi_ignore(b),
            State::OscString => self.advance_osc_string(b, out),
            State::DcsEntry => self.advance_dcs_entry(b, out),
            State::DcsParam => self.advance_dcs_param(b, out),
            State::DcsIntermediate => self.advance_dcs_intermediate(b, out),
            State::DcsPassthrough => self.advance_dcs_passthrough(b, out),
            State::DcsIgnore => self.advance_dcs_ignore(b),
            State::SosPmApcString => self.advance_sos_pm_apc(b),
        }
    }

    fn to_ground(&mut self) {
        self.state = State::Ground;
        self.params.clear();
        self.current_param = None;
        self.intermediates.clear();
        self.private_marker = None;
        self.osc_buf.clear();
        self.dcs_buf.clear();
        self.string_esc_pending = false;
    }

    // ── Ground: UTF-8 text and C0 controls ─────────────────────────────

    fn advance_ground(&mut self, b: u8, out: &mut Vec<Action>) {
        if self.utf8_need > 0 {
            self.feed_utf8_continuation(b, out);
            return;
        }
        match b {
            0x1b => self.state = State::Escape,
            0x18 | 0x1a => {} // CAN/SUB: abort any sequence, nothing to abort here
            0x07 => out.push(Action::Bell),
            0x08 => out.push(Action::Backspace),
            0x09 => out.push(Action::Tab),
            0x0a..=0x0c => out.push(Action::Newline),
            0x0d => out.push(Action::CarriageReturn),
            0x0e => out.push(Action::LockShift(1)),
            0x0f => out.push(Action::LockShift(0)),
            0x00..=0x1f => {}
            0x20..=0x7e => out.push(Action::Print(b as char)),
            0x7f => {}
            0xc2..=0xdf => self.start_utf8(b, 1),
            0xe0..=0xef => self.start_utf8(b, 2),
            0xf0..=0xf4 => self.start_utf8(b, 3),
            _ => out.push(Action::Print('\u{fffd}')),
        }
    }

    fn start_utf8(&mut self, first: u8, continuation_bytes: usize) {
        self.utf8_pending.clear();
        self.utf8_pending.push(first);
        self.utf8_need = continuation_bytes;
    }

    fn feed_utf8_continuation(&mut self, b: u8, out: &mut Vec<Action>) {
        if b & 0xc0 != 0x80 {
            // Malformed sequence: emit replacement and reprocess `b` fresh.
            self.utf8_need = 0;
            self.utf8_pending.clear();
            out.push(Action::Print('\u{fffd}'));
            self.advance_ground(b, out);
            return;
        }
        self.utf8_pending.push(b);
        self.utf8_need -= 1;
        if self.utf8_need == 0 {
            let ch = core::str::from_utf8(&self.utf8_pending)
                .ok()
                .and_then(|s| s.chars().next())
                .unwrap_or('\u{fffd}');
            out.push(Action::Print(ch));
            self.utf8_pending.clear();
        }
    }

    // ── Escape ──────────────────────────────────────────────────────

    fn advance_escape(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x1b => {} // repeated ESC, stay
            b'[' => self.state = State::CsiEntry,
            b']' => self.state = State::OscString,
            b'P' => self.state = State::DcsEntry,
            b'X' | b'^' | b'_' => self.state = State::SosPmApcString,
            0x20..=0x2f => {
                self.intermediates.push(b);
                self.state = State::EscapeIntermediate;
            }
            b'D' => {
                out.push(Action::Index);
                self.to_ground();
            }
            b'M' => {
                out.push(Action::ReverseIndex);
                self.to_ground();
            }
            b'E' => {
                out.push(Action::NextLine);
                self.to_ground();
            }
            b'H' => {
                out.push(Action::SetTabStop);
                self.to_ground();
            }
            b'c' => {
                out.push(Action::FullReset);
                self.to_ground();
            }
            b'7' => {
                out.push(Action::SaveCursor);
                self.to_ground();
            }
            b'8' => {
                out.push(Action::RestoreCursor);
                self.to_ground();
            }
            b'=' => {
                out.push(Action::ApplicationKeypad);
                self.to_ground();
            }
            b'>' => {
                out.push(Action::NormalKeypad);
                self.to_ground();
            }
            b'N' => {
                out.push(Action::SingleShift2);
                self.to_ground();
            }
            b'O' => {
                out.push(Action::SingleShift3);
                self.to_ground();
            }
            0x30..=0x7e => {
                out.push(Action::Unsupported { kind: "esc", final_byte: b, params: Vec::new() });
                self.to_ground();
            }
            _ => self.to_ground(),
        }
    }

    fn advance_escape_intermediate(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x20..=0x2f => self.intermediates.push(b),
            0x30..=0x7e => {
                self.finish_escape_intermediate(b, out);
                self.to_ground();
            }
            _ => self.to_ground(),
        }
    }

    fn finish_escape_intermediate(&mut self, final_byte: u8, out: &mut Vec<Action>) {
        // Charset designation: ESC ( | ) | * | + <final>, slot by intermediate.
        if let Some(&designator) = self.intermediates.first() {
            let slot = match designator {
                b'(' => Some(0),
                b')' => Some(1),
                b'*' => Some(2),
                b'+' => Some(3),
                _ => None,
            };
            if let Some(slot) = slot {
                out.push(Action::DesignateCharset {
                    slot,
                    charset: Charset::from_designator(final_byte),
                });
                return;
            }
        }
        out.push(Action::Unsupported { kind: "esc", final_byte, params: Vec::new() });
    }

    // ── CSI ──────────────────────────────────────────────────────────

    fn advance_csi_entry(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x18 | 0x1a => self.to_ground(),
            b'0'..=b'9' => {
                self.current_param = Some((b - b'0') as u32);
                self.state = State::CsiParam;
            }
            b';' => {
                self.push_param();
                self.state = State::CsiParam;
            }
            b'?' | b'<' | b'=' | b'>' => {
                self.private_marker = Some(b);
                self.state = State::CsiParam;
            }
            0x20..=0x2f => {
                self.intermediates.push(b);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7e => {
                self.finish_csi(b, out);
                self.to_ground();
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    fn advance_csi_param(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x18 | 0x1a => self.to_ground(),
            b'0'..=b'9' => {
                let digit = (b - b'0') as u32;
                self.current_param = Some(self.current_param.unwrap_or(0) * 10 + digit);
            }
            b';' => self.push_param(),
            b':' => {} // sub-parameters not modeled; ignore separator
            0x20..=0x2f => {
                self.push_param();
                self.intermediates.push(b);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7e => {
                self.push_param();
                self.finish_csi(b, out);
                self.to_ground();
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    fn advance_csi_intermediate(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x18 | 0x1a => self.to_ground(),
            0x20..=0x2f => self.intermediates.push(b),
            0x40..=0x7e => {
                self.finish_csi(b, out);
                self.to_ground();
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    fn advance_csi_ignore(&mut self, b: u8) {
        if b == 0x18 || b == 0x1a || (0x40..=0x7e).contains(&b) {
            self.to_ground();
        }
    }

    fn push_param(&mut self) {
        if self.params.len() >= MAX_PARAMS {
            return;
        }
        let raw = self.current_param.unwrap_or(0);
        let value = raw.min(MAX_PARAM as u32) as u16;
        #[cfg(feature = "tracing")]
        if raw > MAX_PARAM as u32 {
            tracing::debug!(raw, clamped = value, "parameter overflow, clamping");
        }
        self.params.push(value);
        self.current_param = None;
    }

    fn finish_csi(&mut self, final_byte: u8, out: &mut Vec<Action>) {
        self.push_param();
        let params = core::mem::take(&mut self.params);
        let p = |i: usize, default: u16| -> u16 {
            params.get(i).copied().filter(|&v| v != 0).unwrap_or(default)
        };
        let raw = |i: usize| -> u16 { params.get(i).copied().unwrap_or(0) };

        if let Some(marker) = self.private_marker {
            match (marker, final_byte) {
                (b'?', b'h') => return out.push(Action::DecSet(params)),
                (b'?', b'l') => return out.push(Action::DecRst(params)),
                (b'>', b'c') => return out.push(Action::DeviceAttributesSecondary),
                (b'<' | b'=' | b'>', _) => {
                    out.push(Action::Unsupported { kind: "csi", final_byte, params });
                    return;
                }
                _ => {}
            }
        }

        match final_byte {
            b'A' => out.push(Action::CursorUp(p(0, 1))),
            b'B' => out.push(Action::CursorDown(p(0, 1))),
            b'C' => out.push(Action::CursorRight(p(0, 1))),
            b'D' => out.push(Action::CursorLeft(p(0, 1))),
            b'E' => out.push(Action::CursorNextLine(p(0, 1))),
            b'F' => out.push(Action::CursorPrevLine(p(0, 1))),
            b'G' | b'`' => out.push(Action::CursorColumn(p(0, 1).saturating_sub(1))),
            b'd' => out.push(Action::CursorRow(p(0, 1).saturating_sub(1))),
            b'H' | b'f' => out.push(Action::CursorPosition {
                row: p(0, 1).saturating_sub(1),
                col: p(1, 1).saturating_sub(1),
            }),
            b'I' => out.push(Action::Tab), // CHT, n=1; multi-tab handled by interpreter via repeat
            b'Z' => out.push(Action::BackTab(p(0, 1))),
            b'J' => out.push(Action::EraseInDisplay(raw(0) as u8)),
            b'K' => out.push(Action::EraseInLine(raw(0) as u8)),
            b'L' => out.push(Action::InsertLines(p(0, 1))),
            b'M' => out.push(Action::DeleteLines(p(0, 1))),
            b'P' => out.push(Action::DeleteChars(p(0, 1))),
            b'@' => out.push(Action::InsertChars(p(0, 1))),
            b'X' => out.push(Action::EraseChars(p(0, 1))),
            b'S' => out.push(Action::ScrollUp(p(0, 1))),
            b'T' => out.push(Action::ScrollDown(p(0, 1))),
            b'b' => out.push(Action::RepeatChar(p(0, 1))),
            b'r' => out.push(Action::SetScrollRegion {
                top: p(0, 1).saturating_sub(1),
                bottom: raw(1),
            }),
            b'm' => out.push(Action::Sgr(params.iter().map(|&v| v as i64).collect())),
            b'h' => out.push(Action::AnsiSet(params)),
            b'l' => out.push(Action::AnsiRst(params)),
            b's' => out.push(Action::SaveCursor),
            b'u' => out.push(Action::RestoreCursor),
            b'n' => match raw(0) {
                5 => out.push(Action::DeviceStatusReport),
                6 => out.push(Action::CursorPositionReport),
                _ => out.push(Action::Unsupported { kind: "csi", final_byte, params }),
            },
            b'c' => out.push(Action::DeviceAttributes),
            b'q' if self.intermediates == [b' '] => out.push(Action::SetCursorShape(raw(0))),
            b'g' => out.push(Action::ClearTabStop(raw(0) as u8)),
            _ => out.push(Action::Unsupported { kind: "csi", final_byte, params }),
        }
    }

    // ── OSC ──────────────────────────────────────────────────────────

    fn advance_osc_string(&mut self, b: u8, out: &mut Vec<Action>) {
        if self.string_esc_pending {
            self.string_esc_pending = false;
            if b == b'\\' {
                self.finish_osc(out);
                self.to_ground();
            } else {
                // Not a valid ST: abort the string and reprocess `b` fresh.
                self.osc_buf.clear();
                self.to_ground();
                self.advance(b, out);
            }
            return;
        }
        match b {
            0x18 | 0x1a => self.to_ground(),
            0x07 => {
                self.finish_osc(out);
                self.to_ground();
            }
            0x1b => self.string_esc_pending = true,
            0x20..=0xff if self.osc_buf.len() < MAX_OSC_LEN => self.osc_buf.push(b),
            _ => {}
        }
    }

    fn finish_osc(&mut self, out: &mut Vec<Action>) {
        let body = core::mem::take(&mut self.osc_buf);
        let text = String::from_utf8_lossy(&body);
        let mut parts = text.splitn(2, ';');
        let Some(ps) = parts.next() else {
            out.push(Action::Unsupported { kind: "osc", final_byte: 0, params: Vec::new() });
            return;
        };
        let rest = parts.next().unwrap_or("");
        match ps {
            "0" | "2" => out.push(Action::SetTitle(rest.to_string())),
            "8" => {
                // OSC 8 ; params ; uri ST
                let uri = rest.splitn(2, ';').nth(1).unwrap_or("");
                if uri.is_empty() {
                    out.push(Action::HyperlinkEnd);
                } else {
                    out.push(Action::HyperlinkStart(uri.to_string()));
                }
            }
            "4" => {
                let mut fields = rest.splitn(2, ';');
                let index = fields.next().and_then(|s| s.parse::<u8>().ok()).unwrap_or(0);
                let spec = fields.next().unwrap_or("").to_string();
                out.push(Action::OscSetPalette { index, spec });
            }
            "104" => {
                let index = rest.parse::<u8>().ok();
                out.push(Action::OscResetPalette(index));
            }
            "10" | "11" | "12" => {
                out.push(Action::OscQueryColor(ps.parse().unwrap_or(0)));
            }
            _ => out.push(Action::Unsupported { kind: "osc", final_byte: 0, params: Vec::new() }),
        }
    }

    // ── DCS ──────────────────────────────────────────────────────────

    fn advance_dcs_entry(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x18 | 0x1a => self.to_ground(),
            b'0'..=b'9' => {
                self.current_param = Some((b - b'0') as u32);
                self.state = State::DcsParam;
            }
            b';' => {
                self.push_param();
                self.state = State::DcsParam;
            }
            0x20..=0x2f => {
                self.intermediates.push(b);
                self.state = State::DcsIntermediate;
            }
            0x40..=0x7e => {
                self.push_param();
                let params = core::mem::take(&mut self.params);
                let intermediates = core::mem::take(&mut self.intermediates);
                out.push(Action::DcsHook { params, intermediates, final_byte: b });
                self.state = State::DcsPassthrough;
            }
            _ => self.state = State::DcsIgnore,
        }
    }

    fn advance_dcs_param(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x18 | 0x1a => self.to_ground(),
            b'0'..=b'9' => {
                let digit = (b - b'0') as u32;
                self.current_param = Some(self.current_param.unwrap_or(0) * 10 + digit);
            }
            b';' => self.push_param(),
            0x20..=0x2f => {
                self.push_param();
                self.intermediates.push(b);
                self.state = State::DcsIntermediate;
            }
            0x40..=0x7e => {
                self.push_param();
                let params = core::mem::take(&mut self.params);
                let intermediates = core::mem::take(&mut self.intermediates);
                out.push(Action::DcsHook { params, intermediates, final_byte: b });
                self.state = State::DcsPassthrough;
            }
            _ => self.state = State::DcsIgnore,
        }
    }

    fn advance_dcs_intermediate(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x18 | 0x1a => self.to_ground(),
            0x20..=0x2f => self.intermediates.push(b),
            0x40..=0x7e => {
                self.push_param();
                let params = core::mem::take(&mut self.params);
                let intermediates = core::mem::take(&mut self.intermediates);
                out.push(Action::DcsHook { params, intermediates, final_byte: b });
                self.state = State::DcsPassthrough;
            }
            _ => self.state = State::DcsIgnore,
        }
    }

    fn advance_dcs_passthrough(&mut self, b: u8, out: &mut Vec<Action>) {
        if self.string_esc_pending {
            self.string_esc_pending = false;
            if b == b'\\' {
                self.flush_dcs_put(out);
                out.push(Action::DcsUnhook);
                self.to_ground();
            } else {
                self.flush_dcs_put(out);
                out.push(Action::DcsUnhook);
                self.to_ground();
                self.advance(b, out);
            }
            return;
        }
        if b == 0x1b {
            self.string_esc_pending = true;
            return;
        }
        if b == 0x18 || b == 0x1a {
            self.flush_dcs_put(out);
            out.push(Action::DcsUnhook);
            self.to_ground();
            return;
        }
        if self.dcs_buf.len() >= MAX_DCS_LEN {
            // DCS body overflow: abort as CAN, per error taxonomy.
            self.flush_dcs_put(out);
            out.push(Action::DcsUnhook);
            out.push(Action::Unsupported { kind: "dcs", final_byte: 0x18, params: Vec::new() });
            #[cfg(feature = "tracing")]
            tracing::debug!(len = self.dcs_buf.len(), "dcs body overflow, aborting");
            self.to_ground();
            return;
        }
        self.dcs_buf.push(b);
    }

    fn flush_dcs_put(&mut self, out: &mut Vec<Action>) {
        if !self.dcs_buf.is_empty() {
            out.push(Action::DcsPut(core::mem::take(&mut self.dcs_buf)));
        }
    }

    fn advance_dcs_ignore(&mut self, b: u8) {
        if b == 0x18 || b == 0x1a || b == 0x1b {
            self.to_ground();
        }
    }

    // ── SOS/PM/APC: collected and discarded ─────────────────────────────

    fn advance_sos_pm_apc(&mut self, b: u8) {
        if b == 0x18 || b == 0x1a || b == 0x1b {
            self.to_ground();
        }
    }
}
