#![forbid(unsafe_code)]
//! Host-agnostic VT/ANSI terminal engine.
//!
//! Covers the parser, screen buffer, cursor, character-set translation, and
//! damage tracking at the core of a terminal emulator. It owns no I/O: a
//! host feeds it bytes from a PTY and drains damage, host replies, and side
//! events back out.

pub mod cell;
pub mod charset;
pub mod cursor;
pub mod error;
pub mod event;
pub mod grid;
pub mod interpreter;
pub mod key;
pub mod modes;
pub mod palette;
pub mod parser;
pub mod patch;
pub mod screen;
pub mod scrollback;
pub mod selection;
pub mod terminal;

pub use cell::{Cell, CellFlags, Color, HyperlinkId, HyperlinkRegistry, SgrAttrs, SgrFlags};
pub use charset::{CharSetState, Charset, translate_charset};
pub use cursor::{Cursor, CursorStyle, SavedCursor};
pub use error::TerminalError;
pub use event::Event;
pub use grid::Grid;
pub use key::{KeyCode, KeyEvent, KeyModifiers, MouseButton, encode_key, encode_mouse, encode_paste};
pub use modes::{AnsiModes, DecModes, Modes};
pub use palette::{Palette, PaletteSlot};
pub use parser::{Action, Parser};
pub use patch::{CellUpdate, ChangeRun, DirtySpan, DirtyTracker, GridDiff, Patch};
pub use screen::{ActiveBuffer, ScreenBuffer};
pub use scrollback::{Scrollback, ScrollbackLine};
pub use selection::{BufferPos, Selection, SelectionMode};
pub use terminal::{Snapshot, Terminal};
