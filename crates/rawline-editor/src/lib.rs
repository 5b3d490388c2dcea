//! # rawline-editor — in-place line editing for rawline
//!
//! Built on `rawline-term`'s key decoder and cursor protocol:
//!
//! - **[`buffer`]** — `EditBuffer`: logical lines split into terminal rows,
//!   width-aware wrapping, grapheme backspace
//! - **[`editor`]** — `LineEditor`: the read loop, echo and repaint
//! - **[`options`]** — `EditorOptions` and the `:set` directive parser
//! - **[`console`]** — `Console`: the caller-facing facade over stdin/stdout

pub mod buffer;
pub mod console;
pub mod editor;
pub mod options;

pub use buffer::{EditBuffer, Segment, SegmentEnd};
pub use console::Console;
pub use editor::{EditorState, LineEditor};
pub use options::{EditorOptions, OptionError, SetDirective};
