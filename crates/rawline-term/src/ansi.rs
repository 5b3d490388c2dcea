// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. This module just knows the byte-level
// encoding of the screen and SGR commands the prompt layer needs; cursor
// movement lives in `cursor.rs` next to the position query.
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to a `Vec<u8>`.
use std::io::{self, Write};

use crate::style::{Attr, Color};

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Carriage return plus line feed.
///
/// Raw mode turns off output post-processing, so a bare `\n` would move
/// down without returning to column 1.
#[inline]
pub fn newline(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\r\n")
}

// ─── SGR ─────────────────────────────────────────────────────────────────────

/// The SGR reset sequence.
pub const RESET: &str = "\x1b[0m";

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(RESET.as_bytes())
}

/// Set the foreground (text) color.
///
/// Uses compact SGR codes for the 16 standard colors (30-37, 90-97), the
/// 256-color extended format for palette indices, and 24-bit `TrueColor`
/// for RGB.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[39m"),
        Color::Ansi(idx) | Color::Indexed(idx) if idx < 8 => {
            write!(w, "\x1b[{}m", 30 + u16::from(idx))
        }
        Color::Ansi(idx) if idx < 16 => write!(w, "\x1b[{}m", 82 + u16::from(idx)),
        Color::Ansi(idx) | Color::Indexed(idx) => write!(w, "\x1b[38;5;{idx}m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[38;2;{r};{g};{b}m"),
    }
}

/// Set the background color.
///
/// Same encoding strategy as [`fg`] with the background codes
/// (40–47, 100–107, 48;5;N, 48;2;R;G;B).
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[49m"),
        Color::Ansi(idx) | Color::Indexed(idx) if idx < 8 => {
            write!(w, "\x1b[{}m", 40 + u16::from(idx))
        }
        Color::Ansi(idx) if idx < 16 => write!(w, "\x1b[{}m", 92 + u16::from(idx)),
        Color::Ansi(idx) | Color::Indexed(idx) => write!(w, "\x1b[48;5;{idx}m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[48;2;{r};{g};{b}m"),
    }
}

/// Emit SGR codes for text attributes as a single CSI sequence.
///
/// Multiple attributes are semicolon-separated: `\x1b[1;3;9m` for
/// bold + italic + strikethrough. Does nothing if no attributes are set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }

    w.write_all(b"\x1b[")?;
    let mut first = true;

    macro_rules! emit {
        ($flag:expr, $code:expr) => {
            if attr.contains($flag) {
                if !first {
                    w.write_all(b";")?;
                }
                w.write_all($code)?;
                first = false;
            }
        };
    }

    emit!(Attr::BOLD, b"1");
    emit!(Attr::DIM, b"2");
    emit!(Attr::ITALIC, b"3");
    emit!(Attr::UNDERLINE, b"4");
    emit!(Attr::BLINK, b"5");
    emit!(Attr::INVERSE, b"7");
    emit!(Attr::HIDDEN, b"8");
    emit!(Attr::STRIKETHROUGH, b"9");
    let _ = first; // Last expansion sets first; suppress dead-write warning.

    w.write_all(b"m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn clear_screen_sequence() {
        assert_eq!(emit(clear_screen), "\x1b[2J");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(cursor_hide), "\x1b[?25l");
        assert_eq!(emit(cursor_show), "\x1b[?25h");
    }

    #[test]
    fn newline_is_crlf() {
        assert_eq!(emit(newline), "\r\n");
    }

    #[test]
    fn reset_sequence() {
        assert_eq!(emit(reset), "\x1b[0m");
    }

    #[test]
    fn fg_default() {
        assert_eq!(emit(|w| fg(w, Color::Default)), "\x1b[39m");
    }

    #[test]
    fn fg_standard_red() {
        assert_eq!(emit(|w| fg(w, Color::Ansi(1))), "\x1b[31m");
    }

    #[test]
    fn fg_bright_white() {
        assert_eq!(emit(|w| fg(w, Color::Ansi(15))), "\x1b[97m");
    }

    #[test]
    fn fg_indexed_low_uses_compact_code() {
        assert_eq!(emit(|w| fg(w, Color::Indexed(2))), "\x1b[32m");
    }

    #[test]
    fn fg_indexed_extended() {
        assert_eq!(emit(|w| fg(w, Color::Indexed(200))), "\x1b[38;5;200m");
    }

    #[test]
    fn fg_rgb() {
        assert_eq!(emit(|w| fg(w, Color::Rgb(255, 128, 0))), "\x1b[38;2;255;128;0m");
    }

    #[test]
    fn bg_standard_and_bright() {
        assert_eq!(emit(|w| bg(w, Color::Ansi(2))), "\x1b[42m");
        assert_eq!(emit(|w| bg(w, Color::Ansi(8))), "\x1b[100m");
    }

    #[test]
    fn bg_default_and_rgb() {
        assert_eq!(emit(|w| bg(w, Color::Default)), "\x1b[49m");
        assert_eq!(emit(|w| bg(w, Color::Rgb(1, 2, 3))), "\x1b[48;2;1;2;3m");
    }

    #[test]
    fn attrs_empty_emits_nothing() {
        assert_eq!(emit(|w| attrs(w, Attr::empty())), "");
    }

    #[test]
    fn attrs_combined() {
        assert_eq!(
            emit(|w| attrs(w, Attr::BOLD | Attr::UNDERLINE | Attr::STRIKETHROUGH)),
            "\x1b[1;4;9m"
        );
    }
}
