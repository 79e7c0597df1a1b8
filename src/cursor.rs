//! Cursor: position, style, visibility, and save/restore stack.
//!
//! The cursor owns the "current style" that the next printed cell inherits
//! (spec §4.G), the scroll-region-relative addressing needed for origin mode,
//! tab stops, and per-slot charset/single-shift state (spec §4.B/§4.C).

use crate::cell::SgrAttrs;
use crate::charset::{CharSetState, Charset};

/// Visual cursor shape (DECSCUSR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Block,
    Underline,
    Bar,
}

/// Maximum depth of the save/restore stack (spec §4.C: "typical cap 10").
const SAVE_STACK_CAP: usize = 10;

/// A full snapshot of cursor state captured by DECSC (`ESC 7`) / CSI `s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedCursor {
    pub row: u16,
    pub col: u16,
    pub pending_wrap: bool,
    pub attrs: SgrAttrs,
    pub charset: CharSetState,
    pub origin_mode: bool,
    pub style: CursorStyle,
}

/// Cursor position, style, and per-terminal transient state.
#[derive(Debug, Clone)]
pub struct Cursor {
    pub row: u16,
    pub col: u16,
    pub style: CursorStyle,
    pub visible: bool,
    pub blinking: bool,
    pub blink_phase: bool,
    /// `x == width` after a print to the last column with auto-wrap on;
    /// the next printable character performs the deferred wrap.
    pub pending_wrap: bool,
    /// SGR attributes applied to the next printed cell.
    pub attrs: SgrAttrs,
    /// `Some(slot)` for one shot after SS2/SS3 until the next printed char
    /// consumes it. Mirrors `CharSetState`'s own field for quick inspection
    /// by callers (kept in sync by `designate_charset`/`consume_single_shift`).
    pub single_shift: Option<u8>,
    charset: CharSetState,
    scroll_top: u16,
    scroll_bottom: u16,
    origin_mode: bool,
    tab_stops: Vec<bool>,
    save_stack: Vec<SavedCursor>,
}

impl Cursor {
    /// Create a cursor at the origin with default tab stops (every 8 columns).
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            row: 0,
            col: 0,
            style: CursorStyle::Block,
            visible: true,
            blinking: true,
            blink_phase: true,
            pending_wrap: false,
            attrs: SgrAttrs::default(),
            single_shift: None,
            charset: CharSetState::new(),
            scroll_top: 0,
            scroll_bottom: rows.max(1),
            origin_mode: false,
            tab_stops: default_tab_stops(cols),
            save_stack: Vec::new(),
        }
    }

    // ── Movement ──────────────────────────────────────────────────────

    /// Absolute move, clamped to `[0, cols-1] x [0, rows-1]`.
    ///
    /// When origin mode is on, `row` is interpreted as scroll-region-relative
    /// and clamped into `[scroll_top, scroll_bottom)`.
    pub fn move_to(&mut self, row: u16, col: u16, rows: u16, cols: u16) {
        self.pending_wrap = false;
        self.col = col.min(cols.saturating_sub(1));
        if self.origin_mode {
            let height = self.scroll_bottom.saturating_sub(self.scroll_top).max(1);
            self.row = self.scroll_top + row.min(height.saturating_sub(1));
        } else {
            self.row = row.min(rows.saturating_sub(1));
        }
    }

    pub fn move_up(&mut self, n: u16) {
        self.pending_wrap = false;
        self.row = self.row.saturating_sub(n).max(self.scroll_top);
    }

    pub fn move_down(&mut self, n: u16, rows: u16) {
        self.pending_wrap = false;
        self.row = (self.row + n).min(rows.saturating_sub(1));
    }

    pub fn move_left(&mut self, n: u16) {
        self.pending_wrap = false;
        self.col = self.col.saturating_sub(n);
    }

    pub fn move_right(&mut self, n: u16, cols: u16) {
        self.pending_wrap = false;
        self.col = (self.col + n).min(cols.saturating_sub(1));
    }

    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }

    // ── Scroll region / origin mode ────────────────────────────────────

    #[must_use]
    pub fn scroll_top(&self) -> u16 {
        self.scroll_top
    }

    #[must_use]
    pub fn scroll_bottom(&self) -> u16 {
        self.scroll_bottom
    }

    /// DECSTBM: `top`/`bottom` are 0-based, `bottom` exclusive.
    pub fn set_scroll_region(&mut self, top: u16, bottom: u16, rows: u16) {
        let bottom = bottom.min(rows).max(top + 1);
        self.scroll_top = top.min(rows.saturating_sub(1));
        self.scroll_bottom = bottom;
    }

    pub fn reset_scroll_region(&mut self, rows: u16) {
        self.scroll_top = 0;
        self.scroll_bottom = rows.max(1);
    }

    pub fn set_origin_mode(&mut self, on: bool) {
        self.origin_mode = on;
    }

    #[must_use]
    pub fn origin_mode(&self) -> bool {
        self.origin_mode
    }

    // ── Tab stops ────────────────────────────────────────────────────

    /// HTS: set a tab stop at the current column.
    pub fn set_tab_stop(&mut self) {
        if let Some(slot) = self.tab_stops.get_mut(self.col as usize) {
            *slot = true;
        }
    }

    /// TBC 0: clear the tab stop at the current column.
    pub fn clear_tab_stop(&mut self) {
        if let Some(slot) = self.tab_stops.get_mut(self.col as usize) {
            *slot = false;
        }
    }

    /// TBC 3/5: clear every tab stop.
    pub fn clear_all_tab_stops(&mut self) {
        for slot in &mut self.tab_stops {
            *slot = false;
        }
    }

    /// CHT/HT: the next tab stop column, or `cols-1` if none remain.
    #[must_use]
    pub fn next_tab_stop(&self, cols: u16) -> u16 {
        let start = self.col as usize + 1;
        for (i, &is_stop) in self.tab_stops.iter().enumerate().skip(start) {
            if is_stop {
                return i as u16;
            }
        }
        cols.saturating_sub(1)
    }

    /// CBT: the previous tab stop column, or 0 if none remain.
    #[must_use]
    pub fn prev_tab_stop(&self) -> u16 {
        if self.col == 0 {
            return 0;
        }
        for i in (0..self.col as usize).rev() {
            if self.tab_stops.get(i).copied().unwrap_or(false) {
                return i as u16;
            }
        }
        0
    }

    /// Rebuild tab stops at default spacing (every 8 columns) for a new width.
    pub fn reset_tab_stops(&mut self, cols: u16) {
        self.tab_stops = default_tab_stops(cols);
    }

    /// Grow or shrink the tab-stop table to match a resized grid, preserving
    /// existing stops where columns survive.
    pub fn resize_tab_stops(&mut self, cols: u16) {
        self.tab_stops.resize(cols as usize, false);
    }

    // ── Charset ──────────────────────────────────────────────────────

    /// `ESC ( | ) | * | + <final>`: designate a charset into slot 0-3.
    pub fn designate_charset(&mut self, slot: u8, charset: Charset) {
        self.charset.designate(slot, charset);
    }

    /// SI/SO/LS2/LS3: lock a slot into GL.
    pub fn lock_shift(&mut self, slot: u8) {
        self.charset.lock_shift(slot);
    }

    /// SS2/SS3: one-shot override for the next printed character.
    pub fn single_shift_charset(&mut self, slot: u8) {
        self.charset.single_shift(slot);
        self.single_shift = Some(slot);
    }

    #[must_use]
    pub fn effective_charset(&self) -> Charset {
        self.charset.effective()
    }

    pub fn consume_single_shift(&mut self) {
        self.charset.consume_single_shift();
        self.single_shift = None;
    }

    pub fn reset_charset(&mut self) {
        self.charset.reset();
        self.single_shift = None;
    }

    // ── Save / restore (DECSC/DECRC) ───────────────────────────────────

    /// Push the current state. The stack is bounded; pushing past the cap
    /// silently drops the oldest (deepest) entry.
    pub fn save(&mut self) {
        let snapshot = SavedCursor {
            row: self.row,
            col: self.col,
            pending_wrap: self.pending_wrap,
            attrs: self.attrs,
            charset: self.charset,
            origin_mode: self.origin_mode,
            style: self.style,
        };
        if self.save_stack.len() >= SAVE_STACK_CAP {
            self.save_stack.remove(0);
        }
        self.save_stack.push(snapshot);
    }

    /// Pop and re-apply the most recent saved state. A no-op if the stack is
    /// empty (matches xterm: DECRC with nothing saved resets to origin).
    pub fn restore(&mut self, rows: u16, cols: u16) {
        let Some(saved) = self.save_stack.pop() else {
            self.move_to(0, 0, rows, cols);
            return;
        };
        self.row = saved.row.min(rows.saturating_sub(1));
        self.col = saved.col.min(cols.saturating_sub(1));
        self.pending_wrap = saved.pending_wrap;
        self.attrs = saved.attrs;
        self.charset = saved.charset;
        self.single_shift = None;
        self.origin_mode = saved.origin_mode;
        self.style = saved.style;
    }
}

fn default_tab_stops(cols: u16) -> Vec<bool> {
    (0..cols).map(|c| c % 8 == 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cursor_is_at_origin() {
        let c = Cursor::new(80, 24);
        assert_eq!((c.row, c.col), (0, 0));
        assert!(c.visible);
        assert!(!c.pending_wrap);
    }

    #[test]
    fn move_to_clamps_to_bounds() {
        let mut c = Cursor::new(10, 5);
        c.move_to(100, 100, 5, 10);
        assert_eq!((c.row, c.col), (4, 9));
    }

    #[test]
    fn move_to_in_origin_mode_is_region_relative() {
        let mut c = Cursor::new(10, 24);
        c.set_scroll_region(5, 15, 24);
        c.set_origin_mode(true);
        c.move_to(0, 0, 24, 10);
        assert_eq!(c.row, 5);
        c.move_to(3, 0, 24, 10);
        assert_eq!(c.row, 8);
    }

    #[test]
    fn move_down_stops_at_bottom_of_screen() {
        let mut c = Cursor::new(10, 5);
        c.move_down(100, 5);
        assert_eq!(c.row, 4);
    }

    #[test]
    fn move_up_stops_at_scroll_top() {
        let mut c = Cursor::new(10, 24);
        c.set_scroll_region(3, 20, 24);
        c.row = 5;
        c.move_up(100);
        assert_eq!(c.row, 3);
    }

    #[test]
    fn tab_stops_default_every_eight_columns() {
        let c = Cursor::new(40, 5);
        assert_eq!(c.next_tab_stop(40), 8);
    }

    #[test]
    fn clear_tab_stop_removes_default_stop() {
        let mut c = Cursor::new(40, 5);
        c.col = 8;
        c.clear_tab_stop();
        assert_eq!(c.next_tab_stop(40), 16);
    }

    #[test]
    fn next_tab_stop_from_before_custom_stop() {
        let mut c = Cursor::new(40, 5);
        c.col = 5;
        c.set_tab_stop();
        c.col = 2;
        assert_eq!(c.next_tab_stop(40), 5);
    }

    #[test]
    fn prev_tab_stop_walks_backward() {
        let mut c = Cursor::new(40, 5);
        c.col = 16;
        assert_eq!(c.prev_tab_stop(), 8);
    }

    #[test]
    fn clear_all_tab_stops_removes_defaults() {
        let mut c = Cursor::new(40, 5);
        c.clear_all_tab_stops();
        assert_eq!(c.next_tab_stop(40), 39);
    }

    #[test]
    fn save_restore_round_trip_is_bit_identical() {
        let mut c = Cursor::new(80, 24);
        c.move_to(10, 19, 24, 80);
        c.attrs.flags.insert(crate::cell::SgrFlags::BOLD);
        c.designate_charset(0, Charset::DecSpecialGraphics);
        c.lock_shift(0);
        c.save();

        c.move_to(0, 0, 24, 80);
        c.attrs = SgrAttrs::default();
        c.reset_charset();

        c.restore(24, 80);
        assert_eq!((c.row, c.col), (10, 19));
        assert!(c.attrs.flags.contains(crate::cell::SgrFlags::BOLD));
        assert_eq!(c.effective_charset(), Charset::DecSpecialGraphics);
    }

    #[test]
    fn save_restore_round_trips_cursor_style() {
        let mut c = Cursor::new(80, 24);
        c.style = CursorStyle::Underline;
        c.save();
        c.style = CursorStyle::Bar;
        c.restore(24, 80);
        assert_eq!(c.style, CursorStyle::Underline);
    }

    #[test]
    fn save_stack_is_bounded() {
        let mut c = Cursor::new(80, 24);
        for i in 0..(SAVE_STACK_CAP + 5) {
            c.col = i as u16 % 80;
            c.save();
        }
        assert_eq!(c.save_stack.len(), SAVE_STACK_CAP);
    }

    #[test]
    fn restore_with_empty_stack_homes_cursor() {
        let mut c = Cursor::new(80, 24);
        c.move_to(5, 5, 24, 80);
        c.restore(24, 80);
        assert_eq!((c.row, c.col), (0, 0));
    }
}
