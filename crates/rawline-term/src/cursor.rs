// SPDX-License-Identifier: MIT
//
// Cursor protocol — position queries and movement.
//
// The terminal is the only source of truth for where the cursor is. We
// never track it locally: movement functions emit one escape sequence and
// forget about it, and when a caller needs the real position it asks the
// terminal with a cursor position report (CPR):
//
//   → ESC [ 6 n
//   ← ESC [ row ; col R
//
// Coordinates here are the terminal's own: 1-based line and column. A
// position read with `query_position` can be passed straight back to
// `move_to`.
//
// The query only works while the input device is in raw mode; otherwise
// the reply is line-buffered and echoed.

use std::io::Write;

use crate::channel::RawChannel;
use crate::decoder::ESC;
use crate::error::{Error, Result, escape_bytes};

/// Longest reply accepted before giving up: `ESC [ 65535 ; 65535 R` is 14.
const MAX_REPLY_LEN: usize = 16;

// ─── Types ───────────────────────────────────────────────────────────────────

/// A cursor position as reported by the terminal (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Row, 1 = top.
    pub line: u16,
    /// Column, 1 = leftmost.
    pub column: u16,
}

impl Position {
    /// A position at `line`, `column`.
    #[must_use]
    pub const fn new(line: u16, column: u16) -> Self {
        Self { line, column }
    }
}

/// Relative cursor movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// CUU — `ESC [ n A`.
    Up,
    /// CUD — `ESC [ n B`.
    Down,
    /// CUF — `ESC [ n C`.
    Forward,
    /// CUB — `ESC [ n D`.
    Back,
}

impl Direction {
    const fn final_byte(self) -> char {
        match self {
            Self::Up => 'A',
            Self::Down => 'B',
            Self::Forward => 'C',
            Self::Back => 'D',
        }
    }
}

// ─── Movement ────────────────────────────────────────────────────────────────

/// Move the cursor to an absolute position (CUP, `ESC [ line ; column H`).
///
/// # Errors
///
/// Propagates write errors.
pub fn move_to(w: &mut impl Write, line: u16, column: u16) -> Result<()> {
    write!(w, "\x1b[{line};{column}H")?;
    Ok(())
}

/// Move the cursor `count` cells in `direction`.
///
/// A count of 1 uses the bare form (`ESC [ A`); a count of 0 emits nothing,
/// since terminals read an explicit 0 as 1.
///
/// # Errors
///
/// Propagates write errors.
pub fn move_relative(w: &mut impl Write, direction: Direction, count: u16) -> Result<()> {
    let fin = direction.final_byte();
    match count {
        0 => {}
        1 => write!(w, "\x1b[{fin}")?,
        n => write!(w, "\x1b[{n}{fin}")?,
    }
    Ok(())
}

/// Move the cursor to `column` on the current line (CHA, `ESC [ column G`).
///
/// # Errors
///
/// Propagates write errors.
pub fn move_to_column(w: &mut impl Write, column: u16) -> Result<()> {
    write!(w, "\x1b[{column}G")?;
    Ok(())
}

// ─── Clearing ────────────────────────────────────────────────────────────────

/// Erase from the cursor to the end of the line (EL 0, `ESC [ K`).
///
/// # Errors
///
/// Propagates write errors.
pub fn clear_to_end_of_line(w: &mut impl Write) -> Result<()> {
    w.write_all(b"\x1b[K")?;
    Ok(())
}

/// Erase from the start of the line to the cursor (EL 1, `ESC [ 1 K`).
///
/// # Errors
///
/// Propagates write errors.
pub fn clear_to_start_of_line(w: &mut impl Write) -> Result<()> {
    w.write_all(b"\x1b[1K")?;
    Ok(())
}

/// Erase from the cursor to the end of the screen (ED 0, `ESC [ J`).
///
/// # Errors
///
/// Propagates write errors.
pub fn clear_to_end_of_screen(w: &mut impl Write) -> Result<()> {
    w.write_all(b"\x1b[J")?;
    Ok(())
}

// ─── Position Query ──────────────────────────────────────────────────────────

/// Ask the terminal where the cursor is.
///
/// Writes `ESC [ 6 n` to `out`, flushes, then reads the reply from
/// `channel`. Bytes are consumed only up to the first grammar violation.
///
/// # Errors
///
/// [`Error::MalformedReply`] if the reply is not `ESC [ row ; col R`,
/// [`Error::Io`] on read or write failure.
pub fn query_position<C: RawChannel + ?Sized>(
    out: &mut impl Write,
    channel: &mut C,
) -> Result<Position> {
    out.write_all(b"\x1b[6n")?;
    out.flush()?;
    let position = read_reply(channel)?;
    tracing::trace!(line = position.line, column = position.column, "cursor position");
    Ok(position)
}

/// Where in the reply grammar the parser is.
#[derive(Clone, Copy)]
enum ReplyState {
    Escape,
    Bracket,
    Line { digits: usize },
    Column { digits: usize },
}

/// Read and parse one CPR reply.
fn read_reply<C: RawChannel + ?Sized>(channel: &mut C) -> Result<Position> {
    let mut reply = Vec::with_capacity(MAX_REPLY_LEN);
    let mut state = ReplyState::Escape;
    let mut line: u16 = 0;
    let mut column: u16 = 0;

    while reply.len() < MAX_REPLY_LEN {
        let byte = channel.read_byte()?;
        reply.push(byte);

        state = match (state, byte) {
            (ReplyState::Escape, ESC) => ReplyState::Bracket,
            (ReplyState::Bracket, b'[') => ReplyState::Line { digits: 0 },
            (ReplyState::Line { digits }, b'0'..=b'9') => {
                line = push_digit(line, byte).ok_or_else(|| malformed(&reply))?;
                ReplyState::Line { digits: digits + 1 }
            }
            (ReplyState::Line { digits }, b';') if digits > 0 => ReplyState::Column { digits: 0 },
            (ReplyState::Column { digits }, b'0'..=b'9') => {
                column = push_digit(column, byte).ok_or_else(|| malformed(&reply))?;
                ReplyState::Column { digits: digits + 1 }
            }
            (ReplyState::Column { digits }, b'R') if digits > 0 => {
                return Ok(Position { line, column });
            }
            _ => return Err(malformed(&reply)),
        };
    }

    Err(malformed(&reply))
}

fn push_digit(value: u16, digit: u8) -> Option<u16> {
    value.checked_mul(10)?.checked_add(u16::from(digit - b'0'))
}

fn malformed(reply: &[u8]) -> Error {
    tracing::debug!(reply = %escape_bytes(reply), "malformed cursor position reply");
    Error::MalformedReply {
        reply: reply.to_vec(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
