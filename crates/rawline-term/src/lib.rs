// SPDX-License-Identifier: MIT
//
// rawline-term — raw terminal input without a TUI framework.
//
// The bottom half of rawline: put the terminal into raw mode, read bytes,
// and turn them into logical keys by exact lookup in a catalog of escape
// sequences. On top of that sits a tiny cursor protocol (move, clear, ask
// the terminal where the cursor is) and a style formatter for SGR colors.
//
// Layering, bottom to top:
//
//   terminal  → OS calls (termios / Win32 console), panic-safe restore
//   channel   → RawChannel trait, RestoreToken, TTY and scripted channels
//   catalog   → byte sequence ↔ logical key table
//   decoder   → one key per call: sequence framing, ESC timeout, UTF-8
//   cursor    → CUP/CUx/EL/ED emitters and the CPR query
//   ansi      → screen and SGR emitters
//   style     → named colors and attributes, nested painting
//
// Nothing here keeps screen state. The terminal is the source of truth.

pub mod ansi;
pub mod catalog;
pub mod channel;
pub mod cursor;
pub mod decoder;
pub mod error;
pub mod style;
pub mod terminal;

pub use catalog::{Catalog, LogicalKey, Platform, keys};
pub use channel::{RawChannel, RestoreToken, ScriptedChannel, TtyChannel};
pub use cursor::{Direction, Position};
pub use decoder::KeyDecoder;
pub use error::{Error, Result};
pub use style::{Attr, Color, Style, paint};
