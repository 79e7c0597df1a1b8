//! End-to-end byte-sequence scenarios against the public `Terminal` facade.

use termcore::{Cell, Color, SgrAttrs, SgrFlags, Terminal};

fn cell_at(term: &Terminal, rows: u16, row: u16, col: u16) -> Cell {
    let snap = term.snapshot(0, rows).unwrap();
    snap.cells[(row * snap.cols + col) as usize]
}

#[test]
fn color_and_print() {
    let mut term = Terminal::new(10, 3, 100).unwrap();
    term.feed(b"\x1b[1;31mHi\x1b[0m!");

    let h = cell_at(&term, 3, 0, 0);
    let i = cell_at(&term, 3, 0, 1);
    let bang = cell_at(&term, 3, 0, 2);

    assert_eq!(h.content(), 'H');
    assert!(h.attrs.flags.contains(SgrFlags::BOLD));
    assert_eq!(h.attrs.fg, Color::Named(1));
    assert_eq!(i.content(), 'i');
    assert_eq!(i.attrs, h.attrs);

    assert_eq!(bang.content(), '!');
    assert_eq!(bang.attrs, SgrAttrs::default());

    let snap = term.snapshot(0, 3).unwrap();
    assert_eq!((snap.cursor_col, snap.cursor_row), (3, 0));
}

#[test]
fn cr_lf_moves_to_next_row() {
    let mut term = Terminal::new(10, 3, 100).unwrap();
    term.feed(b"AB\r\nC");

    assert_eq!(cell_at(&term, 3, 0, 0).content(), 'A');
    assert_eq!(cell_at(&term, 3, 0, 1).content(), 'B');
    assert_eq!(cell_at(&term, 3, 1, 0).content(), 'C');

    let snap = term.snapshot(0, 3).unwrap();
    assert_eq!((snap.cursor_col, snap.cursor_row), (1, 1));
}

#[test]
fn erase_in_display_clears_whole_buffer_and_leaves_cursor() {
    let mut term = Terminal::new(5, 3, 100).unwrap();
    term.feed(b"XXXXX\r\nXXXXX\r\nXXXXX\x1b[1;1H");
    term.take_damage();

    term.feed(b"\x1b[2J");

    let snap = term.snapshot(0, 3).unwrap();
    assert!(snap.cells.iter().all(|c| c.content() == ' '));
    assert_eq!((snap.cursor_col, snap.cursor_row), (0, 0));

    let patch = term.take_damage();
    assert_eq!(patch.diff, termcore::GridDiff::Full);
}

#[test]
fn save_restore_cursor_round_trips_position() {
    let mut term = Terminal::new(25, 15, 100).unwrap();
    term.feed(b"\x1b[10;20H\x1b7\x1b[1;1H\x1b8");

    let snap = term.snapshot(0, 15).unwrap();
    assert_eq!((snap.cursor_col, snap.cursor_row), (19, 9));
}

#[test]
fn alternate_screen_preserves_scrollback_and_primary() {
    let mut term = Terminal::new(10, 5, 100).unwrap();
    // Push well past the 5 visible rows so the scrollback fills past capacity.
    for _ in 0..200 {
        term.feed(b"\r\n");
    }
    assert_eq!(term.scrollback_len(), 100);

    let before = term.snapshot(0, 5).unwrap();

    term.feed(b"\x1b[?1049h");
    for _ in 0..10 {
        term.feed(b"Y\r\n");
    }
    term.feed(b"\x1b[?1049l");

    assert_eq!(term.scrollback_len(), 100);
    let after = term.snapshot(0, 5).unwrap();
    assert_eq!(before.cells, after.cells);
    assert_eq!(
        (before.cursor_col, before.cursor_row),
        (after.cursor_col, after.cursor_row)
    );
}

#[test]
fn auto_wrap_splits_wide_char_across_rows() {
    let mut term = Terminal::new(10, 3, 100).unwrap();
    term.feed(b"\x1b[1;10H");
    term.feed("\u{4e2d}".as_bytes());

    let blank = cell_at(&term, 3, 0, 9);
    assert_eq!(blank.content(), ' ');

    let wide = cell_at(&term, 3, 1, 0);
    assert_eq!(wide.content(), '\u{4e2d}');
    assert!(wide.is_wide());

    let continuation = cell_at(&term, 3, 1, 1);
    assert!(continuation.is_wide_continuation());

    let snap = term.snapshot(0, 3).unwrap();
    assert_eq!((snap.cursor_col, snap.cursor_row), (2, 1));
}
