//! Edit buffer — logical lines split into physical rows.
//!
//! The buffer is a list of [`Segment`]s, one per terminal row the input
//! occupies. Every segment ends in one of three ways:
//!
//! - [`SegmentEnd::Wrap`] — the row filled up and text continues below.
//! - [`SegmentEnd::Line`] — the user broke the line here.
//! - [`SegmentEnd::Open`] — the last segment, still being typed into.
//!
//! Exactly one segment is open and it is always the last one. Joining the
//! segments and turning `Line` ends into line breaks reconstructs the text;
//! `Wrap` ends contribute nothing.
//!
//! The buffer knows nothing about escape codes. Each mutation returns a
//! small description of what changed on screen ([`Inserted`],
//! [`Backspace`]) and the editor turns that into terminal output.
//!
//! Widths are terminal columns, not chars: `unicode-width` for measuring
//! and `unicode-segmentation` so a backspace removes a whole grapheme
//! (`e` + combining accent goes in one keystroke).

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// How a segment ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEnd {
    /// Still being edited (always the last segment).
    Open,
    /// Filled its row; the logical line continues in the next segment.
    Wrap,
    /// Terminated by a line-break key.
    Line,
}

/// One physical row of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    text: String,
    width: usize,
    end: SegmentEnd,
}

impl Segment {
    const fn open() -> Self {
        Self {
            text: String::new(),
            width: 0,
            end: SegmentEnd::Open,
        }
    }

    /// The characters on this row.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Columns occupied.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// How the row ends.
    #[must_use]
    pub const fn end(&self) -> SegmentEnd {
        self.end
    }
}

// ---------------------------------------------------------------------------
// Screen effects
// ---------------------------------------------------------------------------

/// What inserting a character did to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    /// The character did not fit; a new row was started before it.
    pub wrapped_before: bool,
    /// The character filled its row; a new row was started after it.
    pub wrapped_after: bool,
}

/// What a backspace did to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backspace {
    /// Nothing to delete.
    Nothing,
    /// A grapheme was removed from the current row. The cursor belongs at
    /// `column` (1-based) with the rest of the row cleared.
    Erased {
        /// Column where the removed grapheme started.
        column: usize,
    },
    /// The empty current row was dropped and the previous row reopened.
    /// The cursor moves up one row to `column`.
    Merged {
        /// Column just past the previous row's text, or its last column
        /// when that row is full.
        column: usize,
        /// Whether the previous row was full. A full row has no free cell
        /// after its text, so nothing may be cleared.
        full: bool,
    },
}

// ---------------------------------------------------------------------------
// EditBuffer
// ---------------------------------------------------------------------------

/// Segments of the text being edited, wrapped at a fixed width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    segments: Vec<Segment>,
    width: usize,
    origin: usize,
}

impl EditBuffer {
    /// An empty buffer wrapping at `width` columns whose first row starts
    /// at column 1.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self::with_origin(width, 1)
    }

    /// An empty buffer whose first row starts at column `origin` (1-based),
    /// after a prompt. Later rows start at column 1.
    #[must_use]
    pub fn with_origin(width: usize, origin: usize) -> Self {
        Self {
            segments: vec![Segment::open()],
            width: width.max(1),
            origin: origin.max(1),
        }
    }

    /// Wrap width in columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// All segments, the open one last.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether no text has been entered (line breaks count as text).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].text.is_empty()
    }

    /// Logical lines, with wrap boundaries removed.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for segment in &self.segments {
            current.push_str(&segment.text);
            if segment.end == SegmentEnd::Line {
                lines.push(std::mem::take(&mut current));
            }
        }
        lines.push(current);
        lines
    }

    /// The text with logical lines joined by `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines().join("\n")
    }

    // -- geometry --

    fn start_column(&self, index: usize) -> usize {
        if index == 0 { self.origin } else { 1 }
    }

    /// Columns available to segment `index`. The first row loses the
    /// prompt's width but always keeps at least one column.
    fn capacity(&self, index: usize) -> usize {
        let prompt = self.start_column(index) - 1;
        self.width.saturating_sub(prompt).max(1)
    }

    fn current_index(&self) -> usize {
        self.segments.len() - 1
    }

    fn current(&mut self) -> &mut Segment {
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }

    fn close_current(&mut self, end: SegmentEnd) {
        self.current().end = end;
        self.segments.push(Segment::open());
    }

    // -- mutation --

    /// Append a printable character to the open row.
    ///
    /// A character that does not fit in what is left of the row starts a
    /// new row first. A row that becomes exactly full is closed as a wrap
    /// immediately, so the cursor is always on a row with room.
    pub fn insert(&mut self, ch: char) -> Inserted {
        let w = ch.width().unwrap_or(0);
        let index = self.current_index();
        let capacity = self.capacity(index);

        let current = &self.segments[index];
        let wrapped_before = !current.text.is_empty() && current.width + w > capacity;
        if wrapped_before {
            self.close_current(SegmentEnd::Wrap);
        }

        let index = self.current_index();
        let capacity = self.capacity(index);
        let segment = self.current();
        segment.text.push(ch);
        segment.width += w;

        let wrapped_after = segment.width >= capacity;
        if wrapped_after {
            self.close_current(SegmentEnd::Wrap);
        }

        Inserted {
            wrapped_before,
            wrapped_after,
        }
    }

    /// Close the open row as the end of a logical line.
    pub fn line_break(&mut self) {
        self.close_current(SegmentEnd::Line);
    }

    /// Delete backwards.
    ///
    /// On a non-empty row the last grapheme goes. On an empty row the row
    /// itself goes and the previous one is reopened; its wrap or line
    /// marker is stripped but none of its text is removed, so the next
    /// backspace continues into it.
    pub fn backspace(&mut self) -> Backspace {
        let index = self.current_index();
        let start = self.start_column(index);
        let segment = self.current();

        let last = segment
            .text
            .graphemes(true)
            .next_back()
            .map(|g| (g.len(), g.width()));
        if let Some((len, w)) = last {
            let keep = segment.text.len() - len;
            segment.text.truncate(keep);
            segment.width -= w.min(segment.width);
            return Backspace::Erased {
                column: start + segment.width,
            };
        }

        if index == 0 {
            return Backspace::Nothing;
        }

        self.segments.pop();
        let index = self.current_index();
        let start = self.start_column(index);
        let capacity = self.capacity(index);
        let previous = self.current();
        previous.end = SegmentEnd::Open;

        let full = previous.width >= capacity;
        let column = if full {
            start + capacity - 1
        } else {
            start + previous.width
        };
        Backspace::Merged { column, full }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
