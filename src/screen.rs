//! The screen buffer: primary and alternate grids, the active scroll
//! region, and the current selection, plus the shared scrollback that only
//! the primary buffer feeds.

use crate::cell::{Color, SgrAttrs};
use crate::grid::Grid;
use crate::scrollback::Scrollback;
use crate::selection::Selection;

/// Which grid is currently receiving output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveBuffer {
    #[default]
    Primary,
    Alternate,
}

/// Owns both grids, the scrollback (primary-only), the active scroll
/// region, and the current selection.
#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    pub primary: Grid,
    pub alternate: Grid,
    pub active: ActiveBuffer,
    pub scrollback: Scrollback,
    pub selection: Option<Selection>,
    cols: u16,
    rows: u16,
}

impl ScreenBuffer {
    #[must_use]
    pub fn new(cols: u16, rows: u16, scrollback_capacity: usize) -> Self {
        Self {
            primary: Grid::new(cols, rows),
            alternate: Grid::new(cols, rows),
            active: ActiveBuffer::Primary,
            scrollback: Scrollback::new(scrollback_capacity),
            selection: None,
            cols,
            rows,
        }
    }

    #[must_use]
    pub fn cols(&self) -> u16 {
        self.cols
    }

    #[must_use]
    pub fn rows(&self) -> u16 {
        self.rows
    }

    #[must_use]
    pub fn active_grid(&self) -> &Grid {
        match self.active {
            ActiveBuffer::Primary => &self.primary,
            ActiveBuffer::Alternate => &self.alternate,
        }
    }

    pub fn active_grid_mut(&mut self) -> &mut Grid {
        match self.active {
            ActiveBuffer::Primary => &mut self.primary,
            ActiveBuffer::Alternate => &mut self.alternate,
        }
    }

    /// DECSET/DECRST 47/1047/1049: switch the active buffer.
    ///
    /// Switching to the alternate buffer clears it (xterm behavior); the
    /// selection is dropped since its coordinates no longer address
    /// anything meaningful in the new buffer. Scrollback is untouched:
    /// content scrolled while the alternate buffer is active is never
    /// pushed there, matching real terminal behavior.
    pub fn switch_buffer(&mut self, target: ActiveBuffer, bg: Color) {
        if self.active == target {
            return;
        }
        self.active = target;
        if target == ActiveBuffer::Alternate {
            self.alternate.erase_all(bg);
        }
        self.selection = None;
    }

    /// Resize both grids. Only the primary buffer integrates with
    /// scrollback on a height change (spec §4.D: the alternate buffer
    /// never reads or writes scrollback).
    pub fn resize(&mut self, new_cols: u16, new_rows: u16, cursor_row: u16) -> u16 {
        let new_primary_row =
            self.primary
                .resize_with_scrollback(new_cols, new_rows, cursor_row, &mut self.scrollback);
        self.alternate.resize(new_cols, new_rows);
        self.cols = new_cols;
        self.rows = new_rows;
        self.selection = None;
        match self.active {
            ActiveBuffer::Primary => new_primary_row,
            ActiveBuffer::Alternate => cursor_row.min(new_rows.saturating_sub(1)),
        }
    }

    pub fn set_scrollback_capacity(&mut self, capacity: usize) {
        self.scrollback.set_capacity(capacity);
    }

    /// Scroll the active grid up `count` rows within `[top, bottom)`,
    /// evicting into scrollback only when the primary buffer is active.
    pub fn scroll_up(&mut self, top: u16, bottom: u16, count: u16, bg: SgrAttrs) {
        match self.active {
            ActiveBuffer::Primary => {
                self.primary.scroll_up_into(top, bottom, count, &mut self.scrollback, bg.bg);
            }
            ActiveBuffer::Alternate => {
                self.alternate.scroll_up(top, bottom, count, bg.bg);
            }
        }
    }

    pub fn scroll_down(&mut self, top: u16, bottom: u16, count: u16, bg: SgrAttrs) {
        match self.active {
            ActiveBuffer::Primary => {
                self.primary.scroll_down_from(top, bottom, count, &mut self.scrollback, bg.bg);
            }
            ActiveBuffer::Alternate => {
                self.alternate.scroll_down(top, bottom, count, bg.bg);
            }
        }
    }
}
