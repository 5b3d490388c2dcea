//! Console — the caller-facing surface.
//!
//! One value that owns the key catalog, the input channel, the output
//! writer, and the editor options, and exposes the handful of operations a
//! prompt-driven program needs: clear, read a key, read a line / lines /
//! text, write styled text, move and query the cursor.
//!
//! [`Console::stdio`] wires it to the real terminal. Tests build one over a
//! [`ScriptedChannel`](rawline_term::ScriptedChannel) and a `Vec<u8>`.

use std::io::{self, Stdout, Write};

use rawline_term::cursor::{self, Position};
use rawline_term::decoder::KeyDecoder;
use rawline_term::style::Style;
use rawline_term::{Catalog, LogicalKey, Platform, RawChannel, Result, TtyChannel, ansi, terminal};

use crate::editor::LineEditor;
use crate::options::EditorOptions;

/// Terminal input and output behind one handle.
pub struct Console<C, W> {
    catalog: Catalog,
    channel: C,
    out: W,
    options: EditorOptions,
}

impl Console<TtyChannel, Stdout> {
    /// A console on stdin/stdout with the catalog for this platform.
    #[must_use]
    pub fn stdio(options: EditorOptions) -> Self {
        Self::new(
            Catalog::build(Platform::current()),
            TtyChannel::new(),
            io::stdout(),
            options,
        )
    }
}

impl<C: RawChannel, W: Write> Console<C, W> {
    /// A console over any channel and writer.
    pub const fn new(catalog: Catalog, channel: C, out: W, options: EditorOptions) -> Self {
        Self {
            catalog,
            channel,
            out,
            options,
        }
    }

    /// The key catalog.
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Editor options used by every read.
    pub const fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Mutable access to the options, for `:set`-style changes between reads.
    pub const fn options_mut(&mut self) -> &mut EditorOptions {
        &mut self.options
    }

    /// Give back the channel and writer.
    pub fn into_parts(self) -> (C, W) {
        (self.channel, self.out)
    }

    fn editor(&mut self) -> LineEditor<'_, &mut C, &mut W> {
        LineEditor::new(
            &self.catalog,
            &mut self.channel,
            &mut self.out,
            self.options.clone(),
        )
    }

    // -- screen --

    /// Clear the screen and home the cursor.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn clear(&mut self) -> Result<()> {
        ansi::clear_screen(&mut self.out)?;
        cursor::move_to(&mut self.out, 1, 1)?;
        self.out.flush()?;
        Ok(())
    }

    /// Terminal width in columns: the `width` option if set, else the
    /// terminal's own, else 80.
    #[must_use]
    pub fn line_width(&self) -> u16 {
        self.options.width.unwrap_or_else(terminal::line_width)
    }

    // -- input --

    /// Read one key.
    ///
    /// # Errors
    ///
    /// See [`LineEditor::read_key`].
    pub fn read_key(&mut self) -> Result<LogicalKey> {
        self.editor().read_key()
    }

    /// Read the bytes of one key without resolving them, for diagnostics.
    ///
    /// CTRL+C comes back as its byte; resolve it with
    /// [`KeyDecoder::resolve`] to get the interrupt.
    ///
    /// # Errors
    ///
    /// [`Error::NotATerminal`](rawline_term::Error::NotATerminal) or I/O
    /// failure.
    pub fn read_raw_sequence(&mut self) -> Result<Vec<u8>> {
        let token = self.channel.enter_raw()?;
        let sequence = KeyDecoder::new(&self.catalog).read_sequence(&mut self.channel)?;
        token.restore()?;
        Ok(sequence)
    }

    /// Read one line, starting from `seed`.
    ///
    /// # Errors
    ///
    /// See [`LineEditor::read_line`].
    pub fn read_line(&mut self, seed: &str) -> Result<String> {
        self.editor().read_line(seed)
    }

    /// Read several lines, starting from `seed`.
    ///
    /// # Errors
    ///
    /// See [`LineEditor::read_lines`].
    pub fn read_lines<S: AsRef<str>>(&mut self, seed: &[S]) -> Result<Vec<String>> {
        self.editor().read_lines(seed)
    }

    /// Read multi-line text, starting from `seed`.
    ///
    /// # Errors
    ///
    /// See [`LineEditor::read_text`].
    pub fn read_text(&mut self, seed: &str) -> Result<String> {
        self.editor().read_text(seed)
    }

    // -- output --

    /// Write `text` in the given colors and styles.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownStyle`](rawline_term::Error::UnknownStyle) for names
    /// outside the vocabulary (nothing is written), or a write error.
    pub fn write(
        &mut self,
        text: &str,
        fg: Option<&str>,
        bg: Option<&str>,
        styles: &[&str],
    ) -> Result<()> {
        let style = Style::parse(fg, bg, styles)?;
        style.write_to(&mut self.out, text)?;
        self.out.flush()?;
        Ok(())
    }

    /// [`write`](Self::write) followed by a newline.
    ///
    /// # Errors
    ///
    /// As for [`write`](Self::write).
    pub fn write_line(
        &mut self,
        text: &str,
        fg: Option<&str>,
        bg: Option<&str>,
        styles: &[&str],
    ) -> Result<()> {
        let style = Style::parse(fg, bg, styles)?;
        style.write_to(&mut self.out, text)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    // -- cursor --

    /// Move the cursor to `line`, `column` (1-based).
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn set_cursor_position(&mut self, line: u16, column: u16) -> Result<()> {
        cursor::move_to(&mut self.out, line, column)?;
        self.out.flush()?;
        Ok(())
    }

    /// Ask the terminal where the cursor is (1-based).
    ///
    /// Enters raw mode for the duration of the query.
    ///
    /// # Errors
    ///
    /// [`Error::NotATerminal`](rawline_term::Error::NotATerminal),
    /// [`Error::MalformedReply`](rawline_term::Error::MalformedReply), or
    /// I/O failure.
    pub fn get_cursor_position(&mut self) -> Result<Position> {
        let token = self.channel.enter_raw()?;
        let position = cursor::query_position(&mut self.out, &mut self.channel)?;
        token.restore()?;
        Ok(position)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
