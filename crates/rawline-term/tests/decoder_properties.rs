//! Property-based tests for the key catalog and decoder.
//!
//! 1. **Determinism**: every registered encoding decodes to the same key,
//!    no matter what input follows it.
//! 2. **Naming**: every registered key has a non-empty display name that
//!    starts with its canonical name.
//! 3. **Text**: printable characters decode to themselves.
//! 4. **Cursor replies**: any in-range `ESC [ r ; c R` parses exactly.

use std::io;

use proptest::prelude::*;
use rawline_term::{
    Catalog, Error, KeyDecoder, LogicalKey, Platform, Position, ScriptedChannel,
    cursor::query_position,
};

fn catalog_for(console: bool) -> Catalog {
    Catalog::build(if console { Platform::Console } else { Platform::Posix })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn registered_sequences_decode_deterministically(
        index in any::<prop::sample::Index>(),
        trailer in "[a-z]{0,4}",
    ) {
        let catalog = catalog_for(false);
        let (sequence, key) = catalog.iter().nth(index.index(catalog.len())).unwrap();
        prop_assume!(sequence != [0x03]);
        // A lone ESC followed by a letter is ALT+letter, not ESC, and
        // ESC O followed by a letter is an SS3 key.
        prop_assume!((sequence != [0x1b] && sequence != b"\x1bO") || trailer.is_empty());

        let mut bytes = sequence.to_vec();
        bytes.extend_from_slice(trailer.as_bytes());
        let mut channel = ScriptedChannel::new(&bytes);
        let decoder = KeyDecoder::new(&catalog);

        prop_assert_eq!(decoder.next_key(&mut channel).unwrap(), key);
        prop_assert_eq!(channel.remaining(), trailer.len());
    }

    #[test]
    fn display_names_are_nonempty(console in any::<bool>(), index in any::<prop::sample::Index>()) {
        let catalog = catalog_for(console);
        let (_, key) = catalog.iter().nth(index.index(catalog.len())).unwrap();
        let display = catalog.display_name(key);
        prop_assert!(!display.is_empty());
        prop_assert!(display.starts_with(key.name().unwrap()));
    }

    #[test]
    fn printable_chars_decode_to_themselves(ch in any::<char>().prop_filter("printable", |c| !c.is_control())) {
        let catalog = catalog_for(false);
        let decoder = KeyDecoder::new(&catalog);
        let mut buf = [0u8; 4];
        let mut channel = ScriptedChannel::new(ch.encode_utf8(&mut buf).as_bytes());
        let key = decoder.next_key(&mut channel).unwrap();
        prop_assert_eq!(key.as_char(), Some(ch));
        prop_assert!(key.is_printable());
    }

    #[test]
    fn cursor_reply_round_trip(line in 1u16..=u16::MAX, column in 1u16..=u16::MAX) {
        let mut out = io::sink();
        let mut channel = ScriptedChannel::new(format!("\x1b[{line};{column}R"));
        let position = query_position(&mut out, &mut channel).unwrap();
        prop_assert_eq!(position, Position::new(line, column));
    }
}

#[test]
fn interrupt_is_never_a_key() {
    for platform in [Platform::Posix, Platform::Console] {
        let catalog = Catalog::build(platform);
        let mut channel = ScriptedChannel::new(b"\x03");
        let err = KeyDecoder::new(&catalog).next_key(&mut channel).unwrap_err();
        assert!(matches!(err, Error::Interrupted));
        assert!(!matches!(
            catalog.resolve(b"\x03"),
            Ok(LogicalKey::Char(_))
        ));
    }
}
