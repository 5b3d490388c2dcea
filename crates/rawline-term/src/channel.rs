// SPDX-License-Identifier: MIT
//
// Raw channel — the byte source under the key decoder.
//
// A channel does two things: switch its device into raw mode (returning a
// token that undoes the switch) and hand out one byte at a time. The
// decoder and the cursor protocol only ever see this trait, so the same
// code runs against the real terminal and against a scripted byte queue
// in tests.
//
// Restoration is RAII. `RestoreToken::restore` runs the undo exactly once;
// dropping an unrestored token runs it too, which covers `?` returns,
// interrupts, and panics unwinding through a read.
//
// There is no cancellation primitive. A read blocked in the middle of an
// escape sequence cannot be abandoned without leaving the device in raw
// mode, so a caller that needs a timeout must run the read on its own
// thread and close the device underneath it.

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::terminal::{self, SavedMode};

// ─── Restore Token ──────────────────────────────────────────────────────────

enum Undo {
    Device(SavedMode),
    Callback(Box<dyn FnOnce() + Send>),
}

/// Proof that a channel is in raw mode; restores the prior mode once.
#[must_use = "dropping the token restores the terminal immediately"]
pub struct RestoreToken {
    undo: Option<Undo>,
}

impl RestoreToken {
    /// A token that restores nothing.
    pub const fn noop() -> Self {
        Self { undo: None }
    }

    /// A token that runs `f` on restore. For channels whose device state
    /// lives outside this crate.
    pub fn from_fn(f: impl FnOnce() + Send + 'static) -> Self {
        Self {
            undo: Some(Undo::Callback(Box::new(f))),
        }
    }

    const fn device(saved: SavedMode) -> Self {
        Self {
            undo: Some(Undo::Device(saved)),
        }
    }

    /// Whether the undo step has not run yet.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.undo.is_some()
    }

    /// Restore the prior mode now.
    ///
    /// # Errors
    ///
    /// Propagates the device error if the mode could not be restored.
    pub fn restore(mut self) -> Result<()> {
        self.run().map_err(Error::from)
    }

    fn run(&mut self) -> io::Result<()> {
        match self.undo.take() {
            Some(Undo::Device(saved)) => terminal::restore_mode(&saved),
            Some(Undo::Callback(f)) => {
                f();
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for RestoreToken {
    fn drop(&mut self) {
        if let Err(err) = self.run() {
            tracing::warn!(%err, "failed to restore terminal mode");
        }
    }
}

impl fmt::Debug for RestoreToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestoreToken")
            .field("pending", &self.is_pending())
            .finish()
    }
}

// ─── Channel Trait ──────────────────────────────────────────────────────────

/// A byte-level input device that can be switched into raw mode.
pub trait RawChannel {
    /// Switch into unbuffered, unechoed, signal-suppressed mode.
    ///
    /// # Errors
    ///
    /// [`Error::NotATerminal`] if the device is not interactive.
    fn enter_raw(&mut self) -> Result<RestoreToken>;

    /// Block until one byte is available and return it untransformed.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] on device failure or end of input.
    fn read_byte(&mut self) -> Result<u8>;

    /// Put back one byte so the next [`read_byte`](Self::read_byte) returns
    /// it. The decoder uses this when a byte turns out to start the next
    /// key. At most one byte is pushed back between reads.
    fn unread_byte(&mut self, byte: u8);

    /// Wait up to `timeout` for another byte. Used to tell a lone ESC key
    /// from the start of an escape sequence.
    ///
    /// The default claims a byte is always ready, which makes ESC block for
    /// its follow-up byte.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] on device failure.
    fn byte_ready(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(true)
    }
}

impl<C: RawChannel + ?Sized> RawChannel for &mut C {
    fn enter_raw(&mut self) -> Result<RestoreToken> {
        (**self).enter_raw()
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn unread_byte(&mut self, byte: u8) {
        (**self).unread_byte(byte);
    }

    fn byte_ready(&mut self, timeout: Duration) -> Result<bool> {
        (**self).byte_ready(timeout)
    }
}

// ─── TTY Channel ────────────────────────────────────────────────────────────

/// The process's stdin terminal (termios on unix, console on Windows).
#[derive(Debug, Default)]
pub struct TtyChannel {
    pending: Option<u8>,
}

impl TtyChannel {
    /// Handle to stdin. Does not change any mode until
    /// [`enter_raw`](RawChannel::enter_raw).
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }
}

impl RawChannel for TtyChannel {
    fn enter_raw(&mut self) -> Result<RestoreToken> {
        terminal::enable_raw_mode().map(RestoreToken::device)
    }

    fn read_byte(&mut self) -> Result<u8> {
        match self.pending.take() {
            Some(byte) => Ok(byte),
            None => terminal::read_byte(),
        }
    }

    fn unread_byte(&mut self, byte: u8) {
        self.pending = Some(byte);
    }

    fn byte_ready(&mut self, timeout: Duration) -> Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        terminal::byte_ready(timeout)
    }
}

// ─── Scripted Channel ───────────────────────────────────────────────────────

/// An in-memory channel that replays a fixed byte script.
///
/// Reading past the end fails with `UnexpectedEof`. Raw mode is tracked
/// with a flag so callers can check it was released.
#[derive(Debug, Clone)]
pub struct ScriptedChannel {
    input: VecDeque<u8>,
    raw: Arc<AtomicBool>,
    interactive: bool,
}

impl ScriptedChannel {
    /// A channel that will deliver `bytes` in order.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            input: bytes.as_ref().iter().copied().collect(),
            raw: Arc::new(AtomicBool::new(false)),
            interactive: true,
        }
    }

    /// A channel whose device is not a terminal: `enter_raw` fails.
    #[must_use]
    pub fn not_a_terminal() -> Self {
        Self {
            interactive: false,
            ..Self::new(b"")
        }
    }

    /// Append more bytes to the script.
    pub fn push(&mut self, bytes: impl AsRef<[u8]>) {
        self.input.extend(bytes.as_ref());
    }

    /// Bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// Whether raw mode is currently entered.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.raw.load(Ordering::SeqCst)
    }
}

impl RawChannel for ScriptedChannel {
    fn enter_raw(&mut self) -> Result<RestoreToken> {
        if !self.interactive {
            return Err(Error::NotATerminal);
        }
        self.raw.store(true, Ordering::SeqCst);
        let flag = Arc::clone(&self.raw);
        Ok(RestoreToken::from_fn(move || flag.store(false, Ordering::SeqCst)))
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof).into())
    }

    fn unread_byte(&mut self, byte: u8) {
        self.input.push_front(byte);
    }

    fn byte_ready(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(!self.input.is_empty())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn scripted_reads_in_order_then_eof() {
        let mut ch = ScriptedChannel::new(b"ab");
        assert_eq!(ch.read_byte().unwrap(), b'a');
        assert_eq!(ch.read_byte().unwrap(), b'b');
        assert!(matches!(ch.read_byte(), Err(Error::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn scripted_byte_ready_tracks_queue() {
        let mut ch = ScriptedChannel::new(b"x");
        assert!(ch.byte_ready(Duration::ZERO).unwrap());
        ch.read_byte().unwrap();
        assert!(!ch.byte_ready(Duration::ZERO).unwrap());
    }

    #[test]
    fn scripted_push_appends() {
        let mut ch = ScriptedChannel::new(b"a");
        ch.push(b"bc");
        assert_eq!(ch.remaining(), 3);
    }

    #[test]
    fn scripted_unread_comes_back_first() {
        let mut ch = ScriptedChannel::new(b"b");
        let first = ch.read_byte().unwrap();
        ch.unread_byte(first);
        assert!(ch.byte_ready(Duration::ZERO).unwrap());
        assert_eq!(ch.read_byte().unwrap(), b'b');
        ch.unread_byte(b'a');
        assert_eq!(ch.remaining(), 1);
        assert_eq!(ch.read_byte().unwrap(), b'a');
    }

    #[test]
    fn tty_unread_is_served_without_touching_stdin() {
        let mut ch = TtyChannel::new();
        ch.unread_byte(b'q');
        assert!(ch.byte_ready(Duration::ZERO).unwrap());
        assert_eq!(ch.read_byte().unwrap(), b'q');
    }

    #[test]
    fn restore_token_restores_on_drop() {
        let mut ch = ScriptedChannel::new(b"");
        let token = ch.enter_raw().unwrap();
        assert!(ch.is_raw());
        drop(token);
        assert!(!ch.is_raw());
    }

    #[test]
    fn restore_token_explicit_restore() {
        let mut ch = ScriptedChannel::new(b"");
        let token = ch.enter_raw().unwrap();
        token.restore().unwrap();
        assert!(!ch.is_raw());
    }

    #[test]
    fn restore_runs_exactly_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let token = RestoreToken::from_fn(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(token.is_pending());
        token.restore().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn noop_token_is_not_pending() {
        let token = RestoreToken::noop();
        assert!(!token.is_pending());
        token.restore().unwrap();
    }

    #[test]
    fn not_a_terminal_refuses_raw_mode() {
        let mut ch = ScriptedChannel::not_a_terminal();
        assert!(matches!(ch.enter_raw(), Err(Error::NotATerminal)));
        assert!(!ch.is_raw());
    }

    #[test]
    fn mut_ref_forwards() {
        let mut ch = ScriptedChannel::new(b"z");
        let mut r = &mut ch;
        assert_eq!(RawChannel::read_byte(&mut r).unwrap(), b'z');
    }

    #[test]
    fn default_byte_ready_is_true() {
        struct Silent;
        impl RawChannel for Silent {
            fn enter_raw(&mut self) -> Result<RestoreToken> {
                Ok(RestoreToken::noop())
            }
            fn read_byte(&mut self) -> Result<u8> {
                Ok(0)
            }
            fn unread_byte(&mut self, _byte: u8) {}
        }
        assert!(Silent.byte_ready(Duration::from_millis(1)).unwrap());
    }
}
