//! Damage tracking: accumulate dirty regions during a feed, then hand the
//! caller a minimal description of what changed since the last drain.
//!
//! Coalescing rule (spec §4.H): spans that touch or overlap within the same
//! row merge into one; there is no cross-row merging. A `note_all` collapses
//! the whole tracker into a single full-screen marker, since any finer
//! detail would be discarded by the next full redraw anyway.

/// A half-open run of dirty columns on one row: `[x_start, x_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtySpan {
    pub y: u16,
    pub x_start: u16,
    pub x_end: u16,
}

impl DirtySpan {
    #[must_use]
    pub fn new(y: u16, x_start: u16, x_end: u16) -> Self {
        Self { y, x_start, x_end }
    }

    fn touches(&self, other: &Self) -> bool {
        self.y == other.y && self.x_start <= other.x_end && other.x_start <= self.x_end
    }

    fn merge(&self, other: &Self) -> Self {
        Self {
            y: self.y,
            x_start: self.x_start.min(other.x_start),
            x_end: self.x_end.max(other.x_end),
        }
    }
}

/// One cell's new content and style, addressed by absolute viewport position.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub y: u16,
    pub x: u16,
    pub cell: crate::cell::Cell,
}

/// A contiguous run of updated cells on one row, suitable for a single
/// terminal write without re-positioning the cursor mid-run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRun {
    pub y: u16,
    pub x_start: u16,
    pub cells: Vec<crate::cell::Cell>,
}

/// A renderer-facing diff: either a precise set of runs, or a signal that
/// the whole viewport must be redrawn (after a resize, buffer switch, or
/// scrollback-affecting scroll).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GridDiff {
    #[default]
    None,
    Runs(Vec<ChangeRun>),
    Full,
}

/// The damage produced by one `take_damage` call: the diff plus whether the
/// cursor itself moved or changed visibility/style since the last drain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Patch {
    pub diff: GridDiff,
    pub cursor_moved: bool,
    pub title_changed: bool,
}

/// Accumulates dirty spans during a `feed` call; `take_damage` drains and
/// coalesces them into a [`Patch`].
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    spans: Vec<DirtySpan>,
    full: bool,
    cursor_moved: bool,
    title_changed: bool,
}

impl DirtyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a single cell dirty.
    pub fn note_cell(&mut self, y: u16, x: u16) {
        self.note_span(y, x, x + 1);
    }

    /// Mark `[x_start, x_end)` on row `y` dirty, merging with any touching
    /// span already recorded for that row.
    pub fn note_span(&mut self, y: u16, x_start: u16, x_end: u16) {
        if self.full || x_start >= x_end {
            return;
        }
        let incoming = DirtySpan::new(y, x_start, x_end);
        if let Some(existing) = self.spans.iter_mut().find(|s| s.touches(&incoming)) {
            *existing = existing.merge(&incoming);
            self.coalesce_row(y);
        } else {
            self.spans.push(incoming);
        }
    }

    /// Mark an entire row dirty.
    pub fn note_row(&mut self, y: u16, cols: u16) {
        self.note_span(y, 0, cols);
    }

    /// Mark the whole screen dirty; subsequent `note_*` calls are no-ops
    /// until the next `take_damage`.
    pub fn note_all(&mut self) {
        self.full = true;
        self.spans.clear();
    }

    pub fn note_cursor_moved(&mut self) {
        self.cursor_moved = true;
    }

    pub fn note_title_changed(&mut self) {
        self.title_changed = true;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.full && self.spans.is_empty() && !self.cursor_moved && !self.title_changed
    }

    /// Re-merge all spans on `y` in case a span update now touches another.
    fn coalesce_row(&mut self, y: u16) {
        let mut row_spans: Vec<DirtySpan> = self.spans.iter().copied().filter(|s| s.y == y).collect();
        row_spans.sort_by_key(|s| s.x_start);
        let mut merged: Vec<DirtySpan> = Vec::with_capacity(row_spans.len());
        for span in row_spans {
            match merged.last_mut() {
                Some(last) if last.touches(&span) => *last = last.merge(&span),
                _ => merged.push(span),
            }
        }
        self.spans.retain(|s| s.y != y);
        self.spans.extend(merged);
    }

    /// Drain accumulated damage into a diff over `grid`, resetting tracker
    /// state for the next feed. Spans are resolved against `grid` so the
    /// returned runs carry actual cell content, not just coordinates.
    pub fn take_damage(&mut self, grid: &crate::grid::Grid) -> Patch {
        let diff = if self.full {
            GridDiff::Full
        } else if self.spans.is_empty() {
            GridDiff::None
        } else {
            let mut runs = Vec::with_capacity(self.spans.len());
            for span in &self.spans {
                let cells: Vec<crate::cell::Cell> = (span.x_start..span.x_end)
                    .filter_map(|x| grid.cell(span.y, x).cloned())
                    .collect();
                if !cells.is_empty() {
                    runs.push(ChangeRun {
                        y: span.y,
                        x_start: span.x_start,
                        cells,
                    });
                }
            }
            if runs.is_empty() { GridDiff::None } else { GridDiff::Runs(runs) }
        };
        let patch = Patch {
            diff,
            cursor_moved: self.cursor_moved,
            title_changed: self.title_changed,
        };
        self.full = false;
        self.spans.clear();
        self.cursor_moved = false;
        self.title_changed = false;
        patch
    }
}
