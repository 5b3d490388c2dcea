//! Line editor — keys in, edited text out.
//!
//! A [`LineEditor`] runs one read at a time against a [`RawChannel`] and a
//! writer. Each read:
//!
//! 1. enters raw mode (held by a [`RestoreToken`] until the read ends),
//! 2. optionally asks the terminal for the cursor column so the first row
//!    accounts for a prompt,
//! 3. echoes the seed as if it had been typed,
//! 4. loops: decode a key, mutate the [`EditBuffer`], emit the repaint,
//! 5. stops on an exit key (or the line-break key for single-line reads),
//!    restores the terminal and returns the text.
//!
//! Any error aborts the read. The token's drop restores the terminal before
//! the error reaches the caller, and the partial buffer is discarded.
//!
//! Keys the editor has no use for (arrows, function keys, sequences the
//! catalog does not know) are skipped. CTRL+C is not a key at all: the
//! decoder reports it as [`Error::Interrupted`], which propagates.

use std::io::Write;

use rawline_term::ansi;
use rawline_term::catalog::keys;
use rawline_term::cursor::{self, Direction};
use rawline_term::decoder::KeyDecoder;
use rawline_term::error::escape_bytes;
use rawline_term::{Catalog, Error, LogicalKey, RawChannel, RestoreToken, Result, terminal};

use crate::buffer::{Backspace, EditBuffer};
use crate::options::EditorOptions;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Where a read is in its lifecycle.
///
/// `Terminated` is absorbing: once a read has ended no key changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    /// Nothing typed or seeded yet.
    #[default]
    Empty,
    /// At least one key has changed the buffer.
    Editing,
    /// An exit key ended the read.
    Terminated,
}

impl EditorState {
    /// The state after a buffer mutation.
    #[must_use]
    pub const fn edited(self) -> Self {
        match self {
            Self::Terminated => Self::Terminated,
            Self::Empty | Self::Editing => Self::Editing,
        }
    }

    /// Whether the read has ended.
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated)
    }
}

/// Whether the line-break key ends the read or starts a new line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    SingleLine,
    MultiLine,
}

/// What the loop does with one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Insert(char),
    Backspace,
    LineBreak,
    Exit,
    Ignore,
}

// ---------------------------------------------------------------------------
// LineEditor
// ---------------------------------------------------------------------------

/// An in-place text editor over a raw channel.
pub struct LineEditor<'a, C, W> {
    catalog: &'a Catalog,
    channel: C,
    out: W,
    options: EditorOptions,
    line_break: Vec<LogicalKey>,
    exit_keys: Vec<LogicalKey>,
    state: EditorState,
}

impl<'a, C: RawChannel, W: Write> LineEditor<'a, C, W> {
    /// An editor reading keys from `channel` and echoing to `out`.
    ///
    /// Key names in `options` are resolved through `catalog` once, here.
    /// Names the catalog does not know are logged and left out.
    pub fn new(catalog: &'a Catalog, channel: C, out: W, options: EditorOptions) -> Self {
        let line_break = resolve_keys(catalog, &options.line_break);
        let exit_keys = resolve_keys(catalog, &options.exit_keys);
        Self {
            catalog,
            channel,
            out,
            options,
            line_break,
            exit_keys,
            state: EditorState::Empty,
        }
    }

    /// Options in effect.
    pub const fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// State of the most recent read.
    pub const fn state(&self) -> EditorState {
        self.state
    }

    /// Give back the channel and writer.
    pub fn into_parts(self) -> (C, W) {
        (self.channel, self.out)
    }

    // -- reads --

    /// Read one logical line. The line-break key ends the read.
    ///
    /// # Errors
    ///
    /// [`Error::NotATerminal`], [`Error::Interrupted`], [`Error::Io`], and
    /// [`Error::MalformedReply`] when the cursor query fails.
    pub fn read_line(&mut self, seed: &str) -> Result<String> {
        let lines = self.session(&[seed], Mode::SingleLine)?;
        Ok(lines.concat())
    }

    /// Read several logical lines. The line-break key starts a new line;
    /// only an exit key ends the read.
    ///
    /// # Errors
    ///
    /// As for [`read_line`](Self::read_line).
    pub fn read_lines<S: AsRef<str>>(&mut self, seed: &[S]) -> Result<Vec<String>> {
        self.session(seed, Mode::MultiLine)
    }

    /// [`read_lines`](Self::read_lines) with the seed and result as one
    /// `\n`-separated string.
    ///
    /// # Errors
    ///
    /// As for [`read_line`](Self::read_line).
    pub fn read_text(&mut self, seed: &str) -> Result<String> {
        let seed: Vec<&str> = if seed.is_empty() {
            Vec::new()
        } else {
            seed.split('\n').collect()
        };
        Ok(self.session(&seed, Mode::MultiLine)?.join("\n"))
    }

    /// Read a single key in raw mode without echoing it.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownKey`] for unresolvable sequences, plus the errors of
    /// [`read_line`](Self::read_line).
    pub fn read_key(&mut self) -> Result<LogicalKey> {
        let token = self.channel.enter_raw()?;
        let key = KeyDecoder::new(self.catalog).next_key(&mut self.channel);
        finish(token, key)
    }

    // -- session --

    fn session<S: AsRef<str>>(&mut self, seed: &[S], mode: Mode) -> Result<Vec<String>> {
        self.state = EditorState::Empty;
        let token = self.channel.enter_raw()?;
        tracing::debug!(?mode, "read started");
        let result = self.edit(seed, mode);
        if let Err(err) = &result {
            tracing::debug!(%err, "read aborted");
        }
        finish(token, result)
    }

    fn edit<S: AsRef<str>>(&mut self, seed: &[S], mode: Mode) -> Result<Vec<String>> {
        let origin = if self.options.query_cursor {
            cursor::query_position(&mut self.out, &mut self.channel)?.column
        } else {
            1
        };
        let width = self.options.width.unwrap_or_else(terminal::line_width);
        let mut buffer = EditBuffer::with_origin(usize::from(width), usize::from(origin));

        self.echo_seed(&mut buffer, seed)?;
        self.out.flush()?;

        let decoder = KeyDecoder::new(self.catalog);
        while !self.state.is_terminated() {
            let key = match decoder.next_key(&mut self.channel) {
                Ok(key) => key,
                Err(Error::UnknownKey { sequence }) => {
                    tracing::debug!(sequence = %escape_bytes(&sequence), "unknown key ignored");
                    continue;
                }
                Err(err) => return Err(err),
            };

            match self.classify(key, mode) {
                Action::Insert(ch) => self.insert(&mut buffer, ch)?,
                Action::Backspace => self.backspace(&mut buffer)?,
                Action::LineBreak => self.line_break(&mut buffer)?,
                Action::Exit => {
                    self.state = EditorState::Terminated;
                    tracing::debug!(%key, "read terminated");
                }
                Action::Ignore => tracing::trace!(%key, "key ignored"),
            }
            self.out.flush()?;
        }

        if self.options.echo_newline {
            ansi::newline(&mut self.out)?;
            self.out.flush()?;
        }
        Ok(buffer.lines())
    }

    fn classify(&self, key: LogicalKey, mode: Mode) -> Action {
        if self.exit_keys.contains(&key) {
            return Action::Exit;
        }
        if self.line_break.contains(&key) {
            return match mode {
                Mode::SingleLine => Action::Exit,
                Mode::MultiLine => Action::LineBreak,
            };
        }
        if key == keys::BACKSPACE {
            return Action::Backspace;
        }
        match key.as_char() {
            Some(ch) if key.is_printable() => Action::Insert(ch),
            _ => Action::Ignore,
        }
    }

    /// Type the seed into the buffer, echoing it exactly as keystrokes
    /// would be.
    fn echo_seed<S: AsRef<str>>(&mut self, buffer: &mut EditBuffer, seed: &[S]) -> Result<()> {
        for (i, line) in seed.iter().enumerate() {
            if i > 0 {
                self.line_break(buffer)?;
            }
            for ch in line.as_ref().chars().filter(|c| !c.is_control()) {
                self.insert(buffer, ch)?;
            }
        }
        Ok(())
    }

    // -- repaint --

    fn insert(&mut self, buffer: &mut EditBuffer, ch: char) -> Result<()> {
        let effect = buffer.insert(ch);
        if effect.wrapped_before {
            ansi::newline(&mut self.out)?;
        }
        let mut utf8 = [0u8; 4];
        self.out.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;
        if effect.wrapped_after {
            ansi::newline(&mut self.out)?;
        }
        self.state = self.state.edited();
        Ok(())
    }

    fn backspace(&mut self, buffer: &mut EditBuffer) -> Result<()> {
        match buffer.backspace() {
            Backspace::Nothing => return Ok(()),
            Backspace::Erased { column } => {
                cursor::move_to_column(&mut self.out, to_column(column))?;
                cursor::clear_to_end_of_line(&mut self.out)?;
            }
            Backspace::Merged { column, full } => {
                // Hidden while it jumps rows, so it never flashes at column 1.
                ansi::cursor_hide(&mut self.out)?;
                cursor::move_relative(&mut self.out, Direction::Up, 1)?;
                cursor::move_to_column(&mut self.out, to_column(column))?;
                if !full {
                    cursor::clear_to_end_of_line(&mut self.out)?;
                }
                ansi::cursor_show(&mut self.out)?;
            }
        }
        self.state = self.state.edited();
        Ok(())
    }

    fn line_break(&mut self, buffer: &mut EditBuffer) -> Result<()> {
        buffer.line_break();
        ansi::newline(&mut self.out)?;
        self.state = self.state.edited();
        Ok(())
    }
}

/// Release raw mode, keeping the read's error if both fail.
fn finish<T>(token: RestoreToken, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            token.restore()?;
            Ok(value)
        }
        Err(err) => {
            drop(token);
            Err(err)
        }
    }
}

fn resolve_keys(catalog: &Catalog, names: &[String]) -> Vec<LogicalKey> {
    names
        .iter()
        .filter_map(|name| {
            let key = catalog.key_named(name);
            if key.is_none() {
                tracing::warn!(name = %name, "key name not in catalog, ignored");
            }
            key
        })
        .collect()
}

fn to_column(column: usize) -> u16 {
    u16::try_from(column).unwrap_or(u16::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
