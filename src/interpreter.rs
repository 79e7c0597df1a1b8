//! Command interpreter: applies parsed [`Action`]s to the cursor, screen
//! buffer, and mode registry, recording damage and side effects as it goes.

use crate::cell::{Cell, Color, HyperlinkRegistry, SgrFlags};
use crate::charset::translate_charset;
use crate::cursor::Cursor;
use crate::event::Event;
use crate::modes::{AnsiModes, DecModes, Modes};
use crate::palette::{Palette, PaletteSlot, format_color_reply};
use crate::parser::{Action, Parser};
use crate::patch::{DirtyTracker, Patch};
use crate::screen::{ActiveBuffer, ScreenBuffer};
use crate::selection::{BufferPos, Selection, SelectionMode};

/// Applies parsed actions and accumulates damage, host replies, and events.
pub struct Interpreter {
    parser: Parser,
    pub cursor: Cursor,
    pub screen: ScreenBuffer,
    pub modes: Modes,
    pub hyperlinks: HyperlinkRegistry,
    pub palette: Palette,
    pending_hyperlink: crate::cell::HyperlinkId,
    damage: DirtyTracker,
    host_replies: Vec<Vec<u8>>,
    side_events: Vec<Event>,
    unsupported_count: u64,
    title: String,
    cols: u16,
    rows: u16,
}

impl Interpreter {
    #[must_use]
    pub fn new(cols: u16, rows: u16, scrollback_capacity: usize) -> Self {
        let mut damage = DirtyTracker::new();
        damage.note_all();
        Self {
            parser: Parser::new(),
            cursor: Cursor::new(cols, rows),
            screen: ScreenBuffer::new(cols, rows, scrollback_capacity),
            modes: Modes::new(),
            hyperlinks: HyperlinkRegistry::new(),
            palette: Palette::new(),
            pending_hyperlink: 0,
            damage,
            host_replies: Vec::new(),
            side_events: Vec::new(),
            unsupported_count: 0,
            title: String::new(),
            cols,
            rows,
        }
    }

    #[must_use]
    pub fn unsupported_count(&self) -> u64 {
        self.unsupported_count
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of lines currently retained in the primary buffer's scrollback.
    #[must_use]
    pub fn scrollback_len(&self) -> usize {
        self.screen.scrollback.len()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        let actions = self.parser.feed(bytes);
        for action in actions {
            self.apply(action);
        }
    }

    pub fn take_damage(&mut self) -> Patch {
        self.damage.take_damage(self.screen.active_grid())
    }

    pub fn take_host_replies(&mut self) -> Vec<Vec<u8>> {
        core::mem::take(&mut self.host_replies)
    }

    pub fn take_side_events(&mut self) -> Vec<Event> {
        core::mem::take(&mut self.side_events)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        let new_row = self.screen.resize(cols, rows, self.cursor.row);
        self.cols = cols;
        self.rows = rows;
        self.cursor.row = new_row.min(rows.saturating_sub(1));
        self.cursor.col = self.cursor.col.min(cols.saturating_sub(1));
        self.cursor.reset_tab_stops(cols);
        self.cursor.reset_scroll_region(rows);
        self.damage.note_all();
    }

    pub fn set_scrollback_capacity(&mut self, capacity: usize) {
        self.screen.set_scrollback_capacity(capacity);
    }

    /// Scroll the viewport (renderer-side, not a grid mutation): positive
    /// `delta` moves the view toward history (up), negative toward the
    /// live tail. Full invalidation, since the visible rectangle changed.
    pub fn scroll_viewport(&mut self, delta: i64) -> i64 {
        let max = self.screen.scrollback.len() as i64;
        let clamped = delta.clamp(0, max);
        self.damage.note_all();
        clamped
    }

    pub fn select(&mut self, start: BufferPos, end: BufferPos, mode: SelectionMode) {
        self.screen.selection = Some(Selection::with_mode(start, end, mode));
    }

    pub fn clear_selection(&mut self) {
        self.screen.selection = None;
    }

    #[must_use]
    pub fn copy_selection(&self) -> String {
        match &self.screen.selection {
            Some(sel) => sel.extract_text(self.screen.active_grid(), &self.screen.scrollback),
            None => String::new(),
        }
    }

    /// Host-side palette override; does not itself touch any cell (spec §6:
    /// color tags on cells are resolved by the host at render time).
    pub fn set_palette(&mut self, slot: PaletteSlot, rgb: (u8, u8, u8)) {
        self.palette.set(slot, rgb);
    }

    // ── Action dispatch ─────────────────────────────────────────────

    fn apply(&mut self, action: Action) {
        match action {
            Action::Print(ch) => self.apply_print(ch),
            Action::Newline => self.apply_newline(),
            Action::CarriageReturn => {
                self.cursor.carriage_return();
                self.damage.note_cursor_moved();
            }
            Action::Tab => {
                let next = self.cursor.next_tab_stop(self.cols);
                self.cursor.col = next;
                self.cursor.pending_wrap = false;
                self.damage.note_cursor_moved();
            }
            Action::BackTab(n) => {
                for _ in 0..n.max(1) {
                    self.cursor.col = self.cursor.prev_tab_stop();
                }
                self.damage.note_cursor_moved();
            }
            Action::Backspace => {
                self.cursor.move_left(1);
                self.damage.note_cursor_moved();
            }
            Action::Bell => self.side_events.push(Event::Bell),

            other => self.apply_rest(other),
        }
    }

    /// Split out of `apply` purely to keep the first match arm list short;
    /// this still runs as part of the same dispatch.
    fn apply_rest(&mut self, action: Action) {
        match action {
            Action::CursorUp(n) => {
                self.cursor.move_up(n.max(1));
                self.damage.note_cursor_moved();
            }
            Action::CursorDown(n) => {
                self.cursor.move_down(n.max(1), self.rows);
                self.damage.note_cursor_moved();
            }
            Action::CursorRight(n) => {
                self.cursor.move_right(n.max(1), self.cols);
                self.damage.note_cursor_moved();
            }
            Action::CursorLeft(n) => {
                self.cursor.move_left(n.max(1));
                self.damage.note_cursor_moved();
            }
            Action::CursorNextLine(n) => {
                self.cursor.move_down(n.max(1), self.rows);
                self.cursor.carriage_return();
                self.damage.note_cursor_moved();
            }
            Action::CursorPrevLine(n) => {
                self.cursor.move_up(n.max(1));
                self.cursor.carriage_return();
                self.damage.note_cursor_moved();
            }
            Action::CursorRow(row) => {
                self.cursor.move_to(row, self.cursor.col, self.rows, self.cols);
                self.damage.note_cursor_moved();
            }
            Action::CursorColumn(col) => {
                self.cursor.move_to(self.cursor.row, col, self.rows, self.cols);
                self.damage.note_cursor_moved();
            }
            Action::CursorPosition { row, col } => {
                self.cursor.move_to(row, col, self.rows, self.cols);
                self.damage.note_cursor_moved();
            }

            Action::SetScrollRegion { top, bottom } => {
                self.cursor.set_scroll_region(top, bottom.max(top + 1), self.rows);
                self.cursor.move_to(0, 0, self.rows, self.cols);
                self.damage.note_cursor_moved();
            }
            Action::ScrollUp(n) => {
                let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
                self.screen.scroll_up(top, bottom, n.max(1), self.cursor.attrs);
                self.damage.note_all();
            }
            Action::ScrollDown(n) => {
                let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
                self.screen.scroll_down(top, bottom, n.max(1), self.cursor.attrs);
                self.damage.note_all();
            }
            Action::InsertLines(n) => {
                let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
                self.screen
                    .active_grid_mut()
                    .insert_lines(self.cursor.row, n.max(1), top, bottom, self.cursor.attrs.bg);
                self.damage.note_all();
            }
            Action::DeleteLines(n) => {
                let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
                self.screen
                    .active_grid_mut()
                    .delete_lines(self.cursor.row, n.max(1), top, bottom, self.cursor.attrs.bg);
                self.damage.note_all();
            }
            Action::InsertChars(n) => {
                self.screen.active_grid_mut().insert_chars(
                    self.cursor.row,
                    self.cursor.col,
                    n.max(1),
                    self.cursor.attrs.bg,
                );
                self.damage.note_row(self.cursor.row, self.cols);
            }
            Action::DeleteChars(n) => {
                self.screen.active_grid_mut().delete_chars(
                    self.cursor.row,
                    self.cursor.col,
                    n.max(1),
                    self.cursor.attrs.bg,
                );
                self.damage.note_row(self.cursor.row, self.cols);
            }
            Action::EraseChars(n) => {
                self.screen.active_grid_mut().erase_chars(
                    self.cursor.row,
                    self.cursor.col,
                    n.max(1),
                    self.cursor.attrs.bg,
                );
                self.damage.note_span(self.cursor.row, self.cursor.col, (self.cursor.col + n.max(1)).min(self.cols));
            }
            Action::EraseInDisplay(mode) => {
                let bg = self.cursor.attrs.bg;
                let grid = self.screen.active_grid_mut();
                match mode {
                    0 => grid.erase_below(self.cursor.row, self.cursor.col, bg),
                    1 => grid.erase_above(self.cursor.row, self.cursor.col, bg),
                    2 | 3 => grid.erase_all(bg),
                    _ => {}
                }
                if mode == 3 {
                    self.screen.scrollback.clear();
                }
                self.damage.note_all();
            }
            Action::EraseInLine(mode) => {
                let bg = self.cursor.attrs.bg;
                let grid = self.screen.active_grid_mut();
                match mode {
                    0 => grid.erase_line_right(self.cursor.row, self.cursor.col, bg),
                    1 => grid.erase_line_left(self.cursor.row, self.cursor.col, bg),
                    2 => grid.erase_line(self.cursor.row, bg),
                    _ => {}
                }
                self.damage.note_row(self.cursor.row, self.cols);
            }
            Action::RepeatChar(n) => {
                if let Some(ch) = self.screen.active_grid().cell(self.cursor.row, self.cursor.col.saturating_sub(1)).map(Cell::content)
                {
                    for _ in 0..n.max(1) {
                        self.apply_print(ch);
                    }
                }
            }

            Action::Sgr(params) => self.cursor.attrs.apply_sgr_params(&params),
            Action::DecSet(params) => self.apply_dec_modes(&params, true),
            Action::DecRst(params) => self.apply_dec_modes(&params, false),
            Action::AnsiSet(params) => {
                for p in params {
                    self.modes.set_ansi_mode(p, true);
                }
            }
            Action::AnsiRst(params) => {
                for p in params {
                    self.modes.set_ansi_mode(p, false);
                }
            }

            Action::SaveCursor => self.cursor.save(),
            Action::RestoreCursor => {
                self.cursor.restore(self.rows, self.cols);
                self.damage.note_cursor_moved();
            }
            Action::Index => self.apply_newline(),
            Action::ReverseIndex => {
                let top = self.cursor.scroll_top();
                if self.cursor.row == top {
                    self.screen.scroll_down(top, self.cursor.scroll_bottom(), 1, self.cursor.attrs);
                    self.damage.note_all();
                } else {
                    self.cursor.move_up(1);
                    self.damage.note_cursor_moved();
                }
            }
            Action::NextLine => {
                self.apply_newline();
                self.cursor.carriage_return();
            }
            Action::FullReset => self.full_reset(),
            Action::SoftReset => self.soft_reset(),
            Action::ScreenAlignment => {
                self.screen.active_grid_mut().fill_all('E');
                self.damage.note_all();
            }

            Action::SetTitle(title) => {
                self.title = title.clone();
                self.side_events.push(Event::TitleChanged(title));
            }
            Action::HyperlinkStart(uri) => {
                self.pending_hyperlink = self.hyperlinks.acquire(&uri);
            }
            Action::HyperlinkEnd => {
                if self.pending_hyperlink != 0 {
                    self.hyperlinks.release_id(self.pending_hyperlink);
                }
                self.pending_hyperlink = 0;
            }

            Action::SetTabStop => self.cursor.set_tab_stop(),
            Action::ClearTabStop(mode) => match mode {
                0 => self.cursor.clear_tab_stop(),
                3 | 5 => self.cursor.clear_all_tab_stops(),
                _ => {}
            },

            Action::ApplicationKeypad => self.modes.dec.insert(DecModes::APPLICATION_KEYPAD),
            Action::NormalKeypad => self.modes.dec.remove(DecModes::APPLICATION_KEYPAD),
            Action::SetCursorShape(shape) => {
                use crate::cursor::CursorStyle;
                self.cursor.style = match shape {
                    0 | 1 | 2 => CursorStyle::Block,
                    3 | 4 => CursorStyle::Underline,
                    5 | 6 => CursorStyle::Bar,
                    _ => self.cursor.style,
                };
                self.cursor.blinking = matches!(shape, 0 | 1 | 3 | 5);
            }

            Action::EraseScrollback => self.screen.scrollback.clear(),
            Action::FocusIn => self.side_events.push(Event::FocusIn),
            Action::FocusOut => self.side_events.push(Event::FocusOut),
            Action::PasteStart => self.side_events.push(Event::BracketedPasteStart),
            Action::PasteEnd => self.side_events.push(Event::BracketedPasteEnd),

            Action::DeviceAttributes => self.host_replies.push(b"\x1b[?62;1;6c".to_vec()),
            Action::DeviceAttributesSecondary => self.host_replies.push(b"\x1b[>0;10;1c".to_vec()),
            Action::DeviceStatusReport => self.host_replies.push(b"\x1b[0n".to_vec()),
            Action::CursorPositionReport => self.host_replies.push(self.cursor_position_report()),

            Action::DesignateCharset { slot, charset } => match charset {
                Some(cs) => self.cursor.designate_charset(slot, cs),
                None => {
                    self.cursor.designate_charset(slot, crate::charset::Charset::Ascii);
                    #[cfg(feature = "tracing")]
                    tracing::debug!(slot, "unknown charset designation, falling back to ascii");
                    self.side_events.push(Event::Unsupported {
                        description: format!("unknown charset designation for slot {slot}"),
                    });
                }
            },
            Action::LockShift(slot) => self.cursor.lock_shift(slot),
            Action::SingleShift2 => self.cursor.single_shift_charset(2),
            Action::SingleShift3 => self.cursor.single_shift_charset(3),

            Action::MouseEvent { .. } => self.note_unsupported("mouse-event"),

            Action::OscSetPalette { index, spec } => {
                if let Some(color) = parse_palette_spec(&spec) {
                    if let Color::Rgb(r, g, b) = color {
                        self.palette.set(PaletteSlot::Indexed(index), (r, g, b));
                    }
                    self.side_events.push(Event::PaletteChanged { index, color });
                }
            }
            Action::OscResetPalette(index) => {
                self.palette.reset_indexed(index);
                self.side_events.push(Event::PaletteReset { index });
            }
            Action::OscQueryColor(ps) => {
                let slot = match ps {
                    10 => Some(PaletteSlot::DefaultForeground),
                    11 => Some(PaletteSlot::DefaultBackground),
                    12 => Some(PaletteSlot::Cursor),
                    _ => None,
                };
                match slot {
                    Some(slot) => self.host_replies.push(format_color_reply(ps, self.palette.resolve(slot))),
                    None => self.note_unsupported("osc-query-color"),
                }
            }

            Action::DcsHook { .. } => {}
            Action::DcsPut(data) => self.side_events.push(Event::DcsPayload { data }),
            Action::DcsUnhook => {}

            Action::Unsupported { kind, final_byte, params: _ } => {
                self.note_unsupported(kind);
                self.side_events.push(Event::Unsupported {
                    description: format!("{kind} sequence, final byte 0x{final_byte:02x}"),
                });
            }

            // Handled in `apply`'s first arm list; unreachable here.
            Action::Print(_) | Action::Newline | Action::CarriageReturn | Action::Tab | Action::Backspace | Action::Bell => {
                unreachable!("handled in apply()")
            }
        }
    }

    fn note_unsupported(&mut self, _kind: &'static str) {
        self.unsupported_count += 1;
        #[cfg(feature = "tracing")]
        tracing::debug!(kind = _kind, "unsupported terminal sequence");
    }

    fn apply_dec_modes(&mut self, params: &[u16], on: bool) {
        for &code in params {
            self.modes.set_dec_mode(code, on);
            match code {
                6 => self.cursor.set_origin_mode(on),
                7 => {}
                25 => self.cursor.visible = on,
                47 | 1047 => self.switch_alt_screen(on),
                1049 => {
                    if on {
                        self.cursor.save();
                    }
                    self.switch_alt_screen(on);
                    if !on {
                        self.cursor.restore(self.rows, self.cols);
                    }
                }
                1000..=1003 | 1005 | 1006 | 1015 => self.side_events.push(Event::MouseModeChanged),
                2004 if !on => self.side_events.push(Event::BracketedPasteEnd),
                _ => {}
            }
        }
    }

    fn switch_alt_screen(&mut self, on: bool) {
        let target = if on { ActiveBuffer::Alternate } else { ActiveBuffer::Primary };
        self.screen.switch_buffer(target, self.cursor.attrs.bg);
        self.damage.note_all();
    }

    fn full_reset(&mut self) {
        let (cols, rows, cap) = (self.cols, self.rows, self.screen.scrollback.capacity());
        let palette = self.palette.clone();
        *self = Self::new(cols, rows, cap);
        self.palette = palette;
    }

    fn soft_reset(&mut self) {
        self.cursor.reset_charset();
        self.cursor.attrs.reset();
        self.cursor.set_origin_mode(false);
        self.cursor.reset_scroll_region(self.rows);
        self.cursor.visible = true;
        self.modes.ansi = AnsiModes::empty();
    }

    fn cursor_position_report(&self) -> Vec<u8> {
        let (row, col) = if self.cursor.origin_mode() {
            (self.cursor.row.saturating_sub(self.cursor.scroll_top()), self.cursor.col)
        } else {
            (self.cursor.row, self.cursor.col)
        };
        format!("\x1b[{};{}R", row + 1, col + 1).into_bytes()
    }

    fn apply_print(&mut self, raw_ch: char) {
        let charset = self.cursor.effective_charset();
        let ch = translate_charset(raw_ch, charset);
        self.cursor.consume_single_shift();

        let width = Cell::display_width(ch);
        if width == 0 {
            self.attach_combining_mark(ch);
            return;
        }
        let auto_wrap = self.modes.dec.contains(DecModes::AUTO_WRAP);
        if self.cursor.pending_wrap && auto_wrap {
            self.wrap_to_next_line();
        }
        if auto_wrap && width == 2 && self.cursor.col + 1 >= self.cols {
            self.wrap_to_next_line();
        }

        let attrs = self.cursor.attrs;
        let (row, col) = (self.cursor.row, self.cursor.col);
        let grid = self.screen.active_grid_mut();
        if self.modes.ansi.contains(AnsiModes::INSERT) {
            grid.insert_chars(row, col, u16::from(width.max(1)), attrs.bg);
        }
        let written = grid.write_printable(row, col, ch, attrs);
        if written == 0 {
            return;
        }
        if self.pending_hyperlink != 0 {
            for dx in 0..written {
                if let Some(cell) = grid.cell_mut(row, col + u16::from(dx)) {
                    cell.hyperlink = self.pending_hyperlink;
                }
            }
        }
        self.damage.note_span(row, col, col + u16::from(written));
        if col + u16::from(written) >= self.cols {
            if auto_wrap {
                self.cursor.pending_wrap = true;
            } else {
                self.cursor.col = col;
                self.cursor.pending_wrap = false;
            }
        } else {
            self.cursor.col = col + u16::from(written);
            self.cursor.pending_wrap = false;
        }
    }

    fn apply_newline(&mut self) {
        let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
        if self.cursor.row + 1 >= bottom {
            self.screen.scroll_up(top, bottom, 1, self.cursor.attrs);
            self.damage.note_all();
        } else if self.cursor.row + 1 < self.rows {
            self.cursor.row += 1;
            self.damage.note_cursor_moved();
        }
        self.cursor.pending_wrap = false;
        if self.modes.ansi.contains(AnsiModes::LINEFEED_NEWLINE) {
            self.cursor.carriage_return();
        }
    }

    fn wrap_to_next_line(&mut self) {
        self.cursor.pending_wrap = false;
        self.apply_newline();
        self.cursor.col = 0;
    }

    /// Attach a zero-width combining mark to the previously printed cell,
    /// per the rule that a width-0 grapheme joins the cell at `x-1` rather
    /// than occupying a cell of its own. Does nothing at the left margin.
    fn attach_combining_mark(&mut self, mark: char) {
        if self.cursor.col == 0 {
            return;
        }
        let row = self.cursor.row;
        let grid = self.screen.active_grid_mut();
        let mut col = self.cursor.col - 1;
        if grid.cell(row, col).is_some_and(Cell::is_wide_continuation) && col > 0 {
            col -= 1;
        }
        if let Some(cell) = grid.cell_mut(row, col) {
            cell.push_combining_mark(mark);
        }
        self.damage.note_span(row, col, col + 1);
    }
}

fn parse_palette_spec(spec: &str) -> Option<Color> {
    let spec = spec.strip_prefix("rgb:")?;
    let mut parts = spec.split('/');
    let r = u8::from_str_radix(parts.next()?.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(parts.next()?.get(0..2)?, 16).ok()?;
    let b = u8::from_str_radix(parts.next()?.get(0..2)?, 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
