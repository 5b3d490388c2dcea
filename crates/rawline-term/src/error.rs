// SPDX-License-Identifier: MIT
//
// Error taxonomy for terminal input.
//
// Every fallible operation in this crate returns `rawline_term::Result`.
// Callers care about three questions: can the session continue, was this
// a user cancellation, and which bytes were involved. The variants carry
// exactly that.

use std::io;

use thiserror::Error;

/// Errors from raw terminal input, cursor queries, and styling.
#[derive(Debug, Error)]
pub enum Error {
    /// stdin (or stdout) is not an interactive terminal.
    ///
    /// Fatal to the whole input session: key-based reads must not proceed.
    #[error("not attached to an interactive terminal")]
    NotATerminal,

    /// A byte sequence did not resolve to any catalog entry and is not
    /// printable text.
    #[error("unknown key sequence: {}", escape_bytes(sequence))]
    UnknownKey {
        /// The raw bytes as read from the terminal.
        sequence: Vec<u8>,
    },

    /// The terminal did not answer a cursor position query in the
    /// `ESC [ row ; col R` grammar.
    #[error("malformed cursor position reply: {}", escape_bytes(reply))]
    MalformedReply {
        /// The bytes received before the grammar was violated.
        reply: Vec<u8>,
    },

    /// The user pressed the interrupt key (CTRL+C).
    #[error("interrupted")]
    Interrupted,

    /// A color or text style name is not in the style vocabulary.
    #[error("unknown style: {name}")]
    UnknownStyle {
        /// The name as given by the caller.
        name: String,
    },

    /// Underlying device I/O failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true if the input session cannot continue after this error.
    ///
    /// Unknown keys and styles are recoverable; an interrupt is a
    /// cancellation rather than a failure and is reported separately by
    /// [`is_interrupt`](Self::is_interrupt).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::NotATerminal | Self::MalformedReply { .. } | Self::Io(_) => true,
            Self::UnknownKey { .. } | Self::UnknownStyle { .. } | Self::Interrupted => false,
        }
    }

    /// Returns true if this is the user's interrupt key.
    #[must_use]
    pub const fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Render raw bytes for diagnostics: ESC as `^[`, other controls in caret
/// notation, printable ASCII verbatim, everything else as `\xNN`.
#[must_use]
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        match b {
            0x00..=0x1F => {
                out.push('^');
                out.push(char::from(b + 0x40));
            }
            0x7F => out.push_str("^?"),
            0x20..=0x7E => out.push(char::from(b)),
            _ => out.push_str(&format!("\\x{b:02X}")),
        }
    }
    out
}
