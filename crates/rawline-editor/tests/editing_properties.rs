//! Property-based tests for the edit buffer and line editor
//!
//! 1. **Wrap round-trip**: joined segments reproduce the typed text, and a
//!    length that is not a multiple of the width yields `ceil(len / width)`
//!    segments.
//! 2. **Row bound**: no segment is ever wider than its row.
//! 3. **read_line round-trip**: printable text followed by ENTER comes back
//!    unchanged.
//! 4. **Backspace inverse**: typing then backspacing everything leaves an
//!    empty buffer.

use proptest::prelude::*;
use rawline_editor::{EditBuffer, EditorOptions, LineEditor};
use rawline_term::{Catalog, Platform, ScriptedChannel};

fn type_into(buffer: &mut EditBuffer, text: &str) {
    for ch in text.chars() {
        buffer.insert(ch);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn wrap_round_trip(text in "[ -~]{1,200}", width in 1usize..40) {
        let mut buffer = EditBuffer::new(width);
        type_into(&mut buffer, &text);

        let joined: String = buffer.segments().iter().map(|s| s.text()).collect();
        prop_assert_eq!(&joined, &text);
        prop_assert_eq!(buffer.text(), text.clone());

        let len = text.len();
        if len % width != 0 {
            prop_assert_eq!(buffer.segments().len(), len.div_ceil(width));
        } else {
            prop_assert_eq!(buffer.segments().len(), len / width + 1);
        }
    }

    #[test]
    fn segments_never_exceed_row(text in "\\PC{0,80}", width in 2usize..30, origin in 1usize..10) {
        let mut buffer = EditBuffer::with_origin(width, origin);
        type_into(&mut buffer, &text);
        for (i, segment) in buffer.segments().iter().enumerate() {
            let capacity = if i == 0 { width.saturating_sub(origin - 1).max(1) } else { width };
            prop_assert!(
                segment.width() <= capacity || segment.text().chars().count() == 1,
                "segment {i} is {} wide, capacity {capacity}",
                segment.width()
            );
        }
    }

    #[test]
    fn read_line_round_trip(text in "[ -~]{0,120}", width in 5u16..100) {
        let catalog = Catalog::build(Platform::Posix);
        let mut channel = ScriptedChannel::new(format!("{text}\r"));
        let mut out = Vec::new();
        let mut editor = LineEditor::new(
            &catalog,
            &mut channel,
            &mut out,
            EditorOptions::fixed_width(width),
        );
        prop_assert_eq!(editor.read_line("").unwrap(), text);
        drop(editor);
        prop_assert!(!channel.is_raw());
    }

    #[test]
    fn backspacing_everything_empties(text in "[ -~\n]{0,100}", width in 1usize..20) {
        let mut buffer = EditBuffer::new(width);
        for ch in text.chars() {
            if ch == '\n' { buffer.line_break(); } else { buffer.insert(ch); }
        }
        let mut presses = 0;
        while buffer.backspace() != rawline_editor::buffer::Backspace::Nothing {
            presses += 1;
            prop_assert!(presses <= 2 * text.len() + 1);
        }
        prop_assert!(buffer.is_empty());
    }
}
