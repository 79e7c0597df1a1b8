//! Public, host-facing entry point (spec §6).
//!
//! `Terminal` owns the interpreter and exposes the small surface a host
//! embeds: feed bytes in, drain damage/replies/events out, translate key
//! input into PTY bytes.

use crate::cell::Cell;
use crate::cursor::CursorStyle;
use crate::error::TerminalError;
use crate::event::Event;
use crate::interpreter::Interpreter;
use crate::key::{KeyEvent, MouseButton, encode_key, encode_mouse, encode_paste};
use crate::palette::PaletteSlot;
use crate::patch::Patch;
use crate::selection::{BufferPos, SelectionMode};

/// A read-only copy of the visible cells plus cursor state, for a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub cols: u16,
    pub rows: u16,
    pub cells: Vec<Cell>,
    pub cursor_row: u16,
    pub cursor_col: u16,
    pub cursor_visible: bool,
    pub cursor_style: CursorStyle,
}

/// A closed, self-contained VT/ANSI terminal engine.
pub struct Terminal {
    interp: Interpreter,
    blink_accum: core::time::Duration,
}

const BLINK_PERIOD: core::time::Duration = core::time::Duration::from_millis(530);

impl Terminal {
    /// Construct a terminal of the given size with a bounded scrollback.
    ///
    /// # Errors
    /// Returns [`TerminalError::InvalidDimensions`] if `width` or `height` is zero.
    pub fn new(width: u16, height: u16, scrollback_capacity: usize) -> Result<Self, TerminalError> {
        if width == 0 || height == 0 {
            return Err(TerminalError::InvalidDimensions { width, height });
        }
        Ok(Self {
            interp: Interpreter::new(width, height, scrollback_capacity),
            blink_accum: core::time::Duration::ZERO,
        })
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.interp.feed(bytes);
    }

    pub fn take_damage(&mut self) -> Patch {
        self.interp.take_damage()
    }

    pub fn take_host_replies(&mut self) -> Vec<Vec<u8>> {
        self.interp.take_host_replies()
    }

    pub fn take_side_events(&mut self) -> Vec<Event> {
        self.interp.take_side_events()
    }

    /// `(y_top, y_bottom)` of the currently visible rows within the active
    /// buffer's coordinate space.
    #[must_use]
    pub fn visible_region(&self) -> (u16, u16) {
        (0, self.interp.screen.rows())
    }

    /// Copy the cells of `[top, bottom)` together with cursor state.
    ///
    /// # Errors
    /// Returns [`TerminalError::RegionOutOfBounds`] if the region exceeds the
    /// active buffer's dimensions.
    pub fn snapshot(&self, top: u16, bottom: u16) -> Result<Snapshot, TerminalError> {
        let grid = self.interp.screen.active_grid();
        if bottom > grid.rows() || top >= bottom {
            return Err(TerminalError::RegionOutOfBounds {
                requested: (top, bottom),
                bounds: (grid.cols(), grid.rows()),
            });
        }
        let mut cells = Vec::with_capacity(grid.cols() as usize * (bottom - top) as usize);
        for row in top..bottom {
            if let Some(row_cells) = grid.row_cells(row) {
                cells.extend_from_slice(row_cells);
            }
        }
        Ok(Snapshot {
            cols: grid.cols(),
            rows: bottom - top,
            cells,
            cursor_row: self.interp.cursor.row,
            cursor_col: self.interp.cursor.col,
            cursor_visible: self.interp.cursor.visible,
            cursor_style: self.interp.cursor.style,
        })
    }

    /// Resize the terminal.
    ///
    /// # Errors
    /// Returns [`TerminalError::InvalidDimensions`] if `width` or `height` is zero.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<(), TerminalError> {
        if width == 0 || height == 0 {
            return Err(TerminalError::InvalidDimensions { width, height });
        }
        self.interp.resize(width, height);
        Ok(())
    }

    pub fn set_scrollback_capacity(&mut self, capacity: usize) {
        self.interp.set_scrollback_capacity(capacity);
    }

    /// Override a palette entry or default color (spec §6). Takes effect
    /// immediately for subsequent `OSC 10/11/12` queries; does not repaint
    /// any already-written cell, since cells carry color tags, not RGB.
    pub fn set_palette(&mut self, slot: PaletteSlot, rgb: (u8, u8, u8)) {
        self.interp.set_palette(slot, rgb);
    }

    /// Number of lines currently retained in the primary buffer's scrollback.
    #[must_use]
    pub fn scrollback_len(&self) -> usize {
        self.interp.scrollback_len()
    }

    /// Scroll the viewport by `delta_rows` (positive toward history).
    /// Returns the resulting offset from the live tail.
    pub fn scroll(&mut self, delta_rows: i64) -> i64 {
        self.interp.scroll_viewport(delta_rows)
    }

    pub fn select(&mut self, start: BufferPos, end: BufferPos, mode: SelectionMode) {
        self.interp.select(start, end, mode);
    }

    pub fn clear_selection(&mut self) {
        self.interp.clear_selection();
    }

    #[must_use]
    pub fn copy_selection(&self) -> String {
        self.interp.copy_selection()
    }

    /// Translate a key event into the bytes the host should write to the PTY.
    #[must_use]
    pub fn send_key(&self, event: KeyEvent) -> Vec<u8> {
        encode_key(event, &self.interp.modes)
    }

    /// Translate a mouse event into the bytes the host should write to the PTY.
    #[must_use]
    pub fn send_mouse(&self, button: MouseButton, col: u16, row: u16) -> Vec<u8> {
        encode_mouse(button, col, row, &self.interp.modes)
    }

    /// Wrap pasted text in bracketed-paste markers if that mode is active.
    #[must_use]
    pub fn send_paste(&self, text: &str) -> Vec<u8> {
        encode_paste(text, &self.interp.modes)
    }

    /// Advance cursor blink phase by the elapsed time since the last tick.
    /// The core reads no wall clock itself; the host supplies `elapsed`.
    pub fn tick(&mut self, elapsed: core::time::Duration) {
        self.blink_accum += elapsed;
        while self.blink_accum >= BLINK_PERIOD {
            self.blink_accum -= BLINK_PERIOD;
            self.interp.cursor.blink_phase = !self.interp.cursor.blink_phase;
        }
    }

    #[must_use]
    pub fn unsupported_count(&self) -> u64 {
        self.interp.unsupported_count()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.interp.title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyCode, KeyModifiers};

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(Terminal::new(0, 24, 100).is_err());
        assert!(Terminal::new(80, 0, 100).is_err());
    }

    #[test]
    fn snapshot_rejects_out_of_bounds_region() {
        let term = Terminal::new(10, 5, 100).unwrap();
        assert!(term.snapshot(0, 10).is_err());
    }

    #[test]
    fn resize_rejects_zero_dimensions() {
        let mut term = Terminal::new(10, 5, 100).unwrap();
        assert!(term.resize(0, 5).is_err());
    }

    #[test]
    fn feed_and_snapshot_round_trip() {
        let mut term = Terminal::new(10, 5, 100).unwrap();
        term.feed(b"hi");
        let snap = term.snapshot(0, 1).unwrap();
        assert_eq!(snap.cells[0].content(), 'h');
        assert_eq!(snap.cells[1].content(), 'i');
        assert_eq!(snap.cursor_col, 2);
    }

    #[test]
    fn send_key_round_trips_through_modes() {
        let term = Terminal::new(10, 5, 100).unwrap();
        let bytes = term.send_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::empty()));
        assert_eq!(bytes, b"\r".to_vec());
    }

    #[test]
    fn tick_flips_blink_phase_after_one_period() {
        let mut term = Terminal::new(10, 5, 100).unwrap();
        let before = term.interp.cursor.blink_phase;
        term.tick(BLINK_PERIOD);
        assert_ne!(term.interp.cursor.blink_phase, before);
    }

    #[test]
    fn take_damage_starts_with_full_invalidation() {
        let mut term = Terminal::new(10, 5, 100).unwrap();
        let patch = term.take_damage();
        assert_eq!(patch.diff, crate::patch::GridDiff::Full);
    }

    #[test]
    fn osc_query_reports_host_configured_default_background() {
        let mut term = Terminal::new(10, 5, 100).unwrap();
        term.set_palette(PaletteSlot::DefaultBackground, (1, 2, 3));
        term.feed(b"\x1b]11;?\x07");
        let replies = term.take_host_replies();
        assert_eq!(replies, vec![b"\x1b]11;rgb:0101/0202/0303\x1b\\".to_vec()]);
    }
}
