// SPDX-License-Identifier: MIT
//
// Key catalog — raw byte sequences ↔ logical key names.
//
// Terminals disagree about how keys are encoded. UP is `ESC [ A` on most
// emulators and `ESC O A` in application cursor mode; HOME has four
// spellings; Windows consoles report arrows as `0xE0 H`. The catalog
// flattens all of that into one vocabulary of logical keys, each with a
// single canonical name.
//
// The tables below are data, not code. `Catalog::build` walks them once
// at startup and the result is immutable from then on, so it can be shared
// by reference with any number of readers.
//
// Registration rules:
//
//   - A new sequence with a new name creates a key.
//   - A new sequence with a known name adds an encoding to that key
//     (`ESC O A` → UP after `ESC [ A` → UP).
//   - A known sequence with a new name appends a display alias
//     (`\n` → CTRL J after `\n` → CTRL ENTER shows "CTRL ENTER | CTRL J").
//   - A known sequence with a name that already belongs to some key is
//     ignored: first registration wins.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

// ─── Logical Key ────────────────────────────────────────────────────────────

/// A semantic key press, independent of its raw encoding.
///
/// Named keys carry their canonical catalog name, so two keys compare equal
/// exactly when they mean the same thing. Printable text that is not in the
/// catalog becomes [`Char`](LogicalKey::Char).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    /// A catalog key, identified by its canonical name.
    Named(&'static str),
    /// A literal printable character.
    Char(char),
}

impl LogicalKey {
    /// The canonical name of a named key.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Char(_) => None,
        }
    }

    /// The character of a printable key.
    #[must_use]
    pub const fn as_char(self) -> Option<char> {
        match self {
            Self::Char(ch) => Some(ch),
            Self::Named(_) => None,
        }
    }

    /// Whether this key inserts visible text.
    #[must_use]
    pub fn is_printable(self) -> bool {
        matches!(self, Self::Char(ch) if !ch.is_control())
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Char(ch) => write!(f, "{ch}"),
        }
    }
}

/// Canonical names of the keys the editor and most prompts care about.
pub mod keys {
    use super::LogicalKey;

    pub const ENTER: LogicalKey = LogicalKey::Named("ENTER");
    pub const CTRL_ENTER: LogicalKey = LogicalKey::Named("CTRL ENTER");
    pub const TAB: LogicalKey = LogicalKey::Named("TAB");
    pub const SHIFT_TAB: LogicalKey = LogicalKey::Named("SHIFT TAB");
    pub const BACKSPACE: LogicalKey = LogicalKey::Named("BACKSPACE");
    pub const ESC: LogicalKey = LogicalKey::Named("ESC");
    pub const CTRL_C: LogicalKey = LogicalKey::Named("CTRL C");
    pub const CTRL_D: LogicalKey = LogicalKey::Named("CTRL D");
    pub const UP: LogicalKey = LogicalKey::Named("UP");
    pub const DOWN: LogicalKey = LogicalKey::Named("DOWN");
    pub const LEFT: LogicalKey = LogicalKey::Named("LEFT");
    pub const RIGHT: LogicalKey = LogicalKey::Named("RIGHT");
    pub const HOME: LogicalKey = LogicalKey::Named("HOME");
    pub const END: LogicalKey = LogicalKey::Named("END");
    pub const INSERT: LogicalKey = LogicalKey::Named("INSERT");
    pub const DELETE: LogicalKey = LogicalKey::Named("DELETE");
    pub const PAGE_UP: LogicalKey = LogicalKey::Named("PAGE UP");
    pub const PAGE_DOWN: LogicalKey = LogicalKey::Named("PAGE DOWN");
}

// ─── Platform ───────────────────────────────────────────────────────────────

/// Which raw encoding family the input device speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// VT/xterm sequences over a termios device.
    #[default]
    Posix,
    /// Windows console: VT sequences plus `0x00`/`0xE0`-prefixed extended
    /// codes from the raw character API.
    Console,
}

impl Platform {
    /// The platform this binary was built for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) { Self::Console } else { Self::Posix }
    }

    /// Whether `byte` introduces a two-byte console extended code.
    #[must_use]
    pub const fn is_extended_prefix(self, byte: u8) -> bool {
        matches!(self, Self::Console) && matches!(byte, 0x00 | 0xE0)
    }
}

// ─── Tables ─────────────────────────────────────────────────────────────────

/// One table row: raw sequence and the name to register it under.
type Entry = (&'static [u8], &'static str);

/// Control bytes. Order matters: the first name registered for a byte is
/// its canonical name, later ones become aliases.
#[rustfmt::skip]
const CONTROL_KEYS: &[Entry] = &[
    (b"\r", "ENTER"),       (b"\r", "CTRL M"),
    (b"\n", "CTRL ENTER"),  (b"\n", "CTRL J"),
    (b"\t", "TAB"),         (b"\t", "CTRL I"),
    (b"\x7f", "BACKSPACE"), (b"\x08", "BACKSPACE"), (b"\x08", "CTRL H"),
    (b"\x1b", "ESC"),       (b"\x1b", "CTRL ["),
    (b"\x00", "CTRL SPACE"), (b"\x00", "CTRL @"),
    (b"\x01", "CTRL A"), (b"\x02", "CTRL B"), (b"\x03", "CTRL C"),
    (b"\x04", "CTRL D"), (b"\x05", "CTRL E"), (b"\x06", "CTRL F"),
    (b"\x07", "CTRL G"), (b"\x0b", "CTRL K"), (b"\x0c", "CTRL L"),
    (b"\x0e", "CTRL N"), (b"\x0f", "CTRL O"), (b"\x10", "CTRL P"),
    (b"\x11", "CTRL Q"), (b"\x12", "CTRL R"), (b"\x13", "CTRL S"),
    (b"\x14", "CTRL T"), (b"\x15", "CTRL U"), (b"\x16", "CTRL V"),
    (b"\x17", "CTRL W"), (b"\x18", "CTRL X"), (b"\x19", "CTRL Y"),
    (b"\x1a", "CTRL Z"),
    (b"\x1c", "CTRL \\"), (b"\x1d", "CTRL ]"), (b"\x1e", "CTRL ^"), (b"\x1f", "CTRL _"),
];

/// Unmodified VT navigation, editing, and function keys, with the common
/// emulator variants as extra encodings.
#[rustfmt::skip]
const VT_KEYS: &[Entry] = &[
    (b"\x1b[A", "UP"),    (b"\x1bOA", "UP"),
    (b"\x1b[B", "DOWN"),  (b"\x1bOB", "DOWN"),
    (b"\x1b[C", "RIGHT"), (b"\x1bOC", "RIGHT"),
    (b"\x1b[D", "LEFT"),  (b"\x1bOD", "LEFT"),
    (b"\x1b[H", "HOME"),  (b"\x1bOH", "HOME"), (b"\x1b[1~", "HOME"), (b"\x1b[7~", "HOME"),
    (b"\x1b[F", "END"),   (b"\x1bOF", "END"),  (b"\x1b[4~", "END"),  (b"\x1b[8~", "END"),
    (b"\x1b[2~", "INSERT"),
    (b"\x1b[3~", "DELETE"),
    (b"\x1b[5~", "PAGE UP"),
    (b"\x1b[6~", "PAGE DOWN"),
    (b"\x1b[Z", "SHIFT TAB"),
    (b"\x1bOP", "F1"),  (b"\x1b[11~", "F1"),
    (b"\x1bOQ", "F2"),  (b"\x1b[12~", "F2"),
    (b"\x1bOR", "F3"),  (b"\x1b[13~", "F3"),
    (b"\x1bOS", "F4"),  (b"\x1b[14~", "F4"),
    (b"\x1b[15~", "F5"),  (b"\x1b[17~", "F6"),  (b"\x1b[18~", "F7"),
    (b"\x1b[19~", "F8"),  (b"\x1b[20~", "F9"),  (b"\x1b[21~", "F10"),
    (b"\x1b[23~", "F11"), (b"\x1b[24~", "F12"),
    (b"\x1b\x1b", "ALT ESC"),
    (b"\x1b\r", "ALT ENTER"),
    (b"\x1b\x7f", "ALT BACKSPACE"),
];

/// Alt+letter as sent by terminals with "meta sends escape".
#[rustfmt::skip]
const ALT_KEYS: &[Entry] = &[
    (b"\x1ba", "ALT A"), (b"\x1bb", "ALT B"), (b"\x1bc", "ALT C"), (b"\x1bd", "ALT D"),
    (b"\x1be", "ALT E"), (b"\x1bf", "ALT F"), (b"\x1bg", "ALT G"), (b"\x1bh", "ALT H"),
    (b"\x1bi", "ALT I"), (b"\x1bj", "ALT J"), (b"\x1bk", "ALT K"), (b"\x1bl", "ALT L"),
    (b"\x1bm", "ALT M"), (b"\x1bn", "ALT N"), (b"\x1bo", "ALT O"), (b"\x1bp", "ALT P"),
    (b"\x1bq", "ALT Q"), (b"\x1br", "ALT R"), (b"\x1bs", "ALT S"), (b"\x1bt", "ALT T"),
    (b"\x1bu", "ALT U"), (b"\x1bv", "ALT V"), (b"\x1bw", "ALT W"), (b"\x1bx", "ALT X"),
    (b"\x1by", "ALT Y"), (b"\x1bz", "ALT Z"),
    (b"\x1bO", "ALT SHIFT O"),
];

/// Expand one key into its seven xterm modifier variants
/// (`CSI prefix ; m final`, m = 2..=8).
macro_rules! modified {
    ($name:literal, $prefix:literal, $fin:literal) => {
        [
            (concat!("\x1b[", $prefix, ";2", $fin).as_bytes(), concat!("SHIFT ", $name)),
            (concat!("\x1b[", $prefix, ";3", $fin).as_bytes(), concat!("ALT ", $name)),
            (concat!("\x1b[", $prefix, ";4", $fin).as_bytes(), concat!("ALT SHIFT ", $name)),
            (concat!("\x1b[", $prefix, ";5", $fin).as_bytes(), concat!("CTRL ", $name)),
            (concat!("\x1b[", $prefix, ";6", $fin).as_bytes(), concat!("CTRL SHIFT ", $name)),
            (concat!("\x1b[", $prefix, ";7", $fin).as_bytes(), concat!("CTRL ALT ", $name)),
            (concat!("\x1b[", $prefix, ";8", $fin).as_bytes(), concat!("CTRL ALT SHIFT ", $name)),
        ]
    };
}

/// Modifier combinations for every key xterm reports with a modifier
/// parameter, up to `ESC [ 24 ; 8 ~`.
const MODIFIED_KEYS: &[[Entry; 7]] = &[
    modified!("UP", "1", "A"),
    modified!("DOWN", "1", "B"),
    modified!("RIGHT", "1", "C"),
    modified!("LEFT", "1", "D"),
    modified!("HOME", "1", "H"),
    modified!("END", "1", "F"),
    modified!("F1", "1", "P"),
    modified!("F2", "1", "Q"),
    modified!("F3", "1", "R"),
    modified!("F4", "1", "S"),
    modified!("INSERT", "2", "~"),
    modified!("DELETE", "3", "~"),
    modified!("PAGE UP", "5", "~"),
    modified!("PAGE DOWN", "6", "~"),
    modified!("F5", "15", "~"),
    modified!("F6", "17", "~"),
    modified!("F7", "18", "~"),
    modified!("F8", "19", "~"),
    modified!("F9", "20", "~"),
    modified!("F10", "21", "~"),
    modified!("F11", "23", "~"),
    modified!("F12", "24", "~"),
];

/// Windows console extended codes (`_getch` returns a `0x00` or `0xE0`
/// prefix followed by a scan code).
#[rustfmt::skip]
const CONSOLE_KEYS: &[Entry] = &[
    (b"\xe0H", "UP"),    (b"\x00H", "UP"),
    (b"\xe0P", "DOWN"),  (b"\x00P", "DOWN"),
    (b"\xe0K", "LEFT"),  (b"\x00K", "LEFT"),
    (b"\xe0M", "RIGHT"), (b"\x00M", "RIGHT"),
    (b"\xe0G", "HOME"),  (b"\x00G", "HOME"),
    (b"\xe0O", "END"),   (b"\x00O", "END"),
    (b"\xe0I", "PAGE UP"),   (b"\x00I", "PAGE UP"),
    (b"\xe0Q", "PAGE DOWN"), (b"\x00Q", "PAGE DOWN"),
    (b"\xe0R", "INSERT"),    (b"\x00R", "INSERT"),
    (b"\xe0S", "DELETE"),    (b"\x00S", "DELETE"),
    (b"\x00;", "F1"), (b"\x00<", "F2"), (b"\x00=", "F3"), (b"\x00>", "F4"),
    (b"\x00?", "F5"), (b"\x00@", "F6"), (b"\x00A", "F7"), (b"\x00B", "F8"),
    (b"\x00C", "F9"), (b"\x00D", "F10"),
    (b"\xe0\x85", "F11"), (b"\xe0\x86", "F12"),
    (b"\xe0\x8d", "CTRL UP"),   (b"\xe0\x91", "CTRL DOWN"),
    (b"\xe0s", "CTRL LEFT"),    (b"\xe0t", "CTRL RIGHT"),
    (b"\xe0w", "CTRL HOME"),    (b"\xe0u", "CTRL END"),
    (b"\xe0\x93", "CTRL DELETE"),
];

// ─── Catalog ────────────────────────────────────────────────────────────────

/// Immutable mapping between raw sequences and logical keys.
///
/// Build it once with [`Catalog::build`] and pass it by reference to every
/// decoder. All lookups take `&self`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    platform: Platform,
    /// Sequence → key.
    by_sequence: HashMap<Vec<u8>, LogicalKey>,
    /// Registered encodings in registration order, for reverse lookup.
    encodings: Vec<(Vec<u8>, LogicalKey)>,
    /// Canonical name → display names (canonical first, then aliases).
    display: HashMap<&'static str, Vec<&'static str>>,
    /// Any registered name → canonical name.
    canonical: HashMap<&'static str, &'static str>,
}

impl Catalog {
    /// An empty catalog for `platform`. Mostly useful for tests; real
    /// callers want [`build`](Self::build).
    #[must_use]
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    /// Build the full catalog for `platform` from the static tables.
    #[must_use]
    pub fn build(platform: Platform) -> Self {
        let mut catalog = Self::empty(platform);
        for &(sequence, name) in CONTROL_KEYS.iter().chain(VT_KEYS).chain(ALT_KEYS) {
            catalog.register(sequence, name);
        }
        for &(sequence, name) in MODIFIED_KEYS.iter().flatten() {
            catalog.register(sequence, name);
        }
        if platform == Platform::Console {
            for &(sequence, name) in CONSOLE_KEYS {
                catalog.register(sequence, name);
            }
        }
        tracing::debug!(
            platform = ?platform,
            encodings = catalog.encodings.len(),
            keys = catalog.display.len(),
            "key catalog built"
        );
        catalog
    }

    /// Register `sequence` under `name` and return the key it resolves to.
    ///
    /// See the module docs for how duplicates and aliases are handled.
    pub fn register(&mut self, sequence: &[u8], name: &'static str) -> LogicalKey {
        if let Some(&existing) = self.by_sequence.get(sequence) {
            if let LogicalKey::Named(canonical) = existing {
                if self.canonical.contains_key(name) {
                    if self.canonical.get(name) != Some(&canonical) {
                        tracing::trace!(name, canonical, "sequence already bound, alias ignored");
                    }
                } else {
                    self.canonical.insert(name, canonical);
                    self.display.entry(canonical).or_default().push(name);
                }
            }
            return existing;
        }

        let canonical = if let Some(&canonical) = self.canonical.get(name) {
            canonical
        } else {
            self.canonical.insert(name, name);
            self.display.insert(name, vec![name]);
            name
        };

        let key = LogicalKey::Named(canonical);
        self.by_sequence.insert(sequence.to_vec(), key);
        self.encodings.push((sequence.to_vec(), key));
        key
    }

    /// Resolve a complete raw sequence.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownKey`] if the sequence was never registered.
    pub fn resolve(&self, sequence: &[u8]) -> Result<LogicalKey> {
        self.by_sequence
            .get(sequence)
            .copied()
            .ok_or_else(|| Error::UnknownKey {
                sequence: sequence.to_vec(),
            })
    }

    /// Human-readable name for `key`: canonical name plus aliases joined
    /// with `" | "`. Printable keys display as themselves.
    #[must_use]
    pub fn display_name(&self, key: LogicalKey) -> String {
        match key {
            LogicalKey::Named(name) => self
                .display
                .get(name)
                .map_or_else(|| name.to_string(), |names| names.join(" | ")),
            LogicalKey::Char(ch) => ch.to_string(),
        }
    }

    /// Look a key up by any of its names (canonical or alias). A single
    /// character that is not a key name yields a printable key.
    #[must_use]
    pub fn key_named(&self, name: &str) -> Option<LogicalKey> {
        if let Some(&canonical) = self.canonical.get(name) {
            return Some(LogicalKey::Named(canonical));
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if !ch.is_control() => Some(LogicalKey::Char(ch)),
            _ => None,
        }
    }

    /// Every raw encoding registered for `key`, in registration order.
    #[must_use]
    pub fn sequences_of(&self, key: LogicalKey) -> Vec<&[u8]> {
        self.encodings
            .iter()
            .filter(|(_, k)| *k == key)
            .map(|(sequence, _)| sequence.as_slice())
            .collect()
    }

    /// Whether `sequence` is registered.
    #[must_use]
    pub fn contains(&self, sequence: &[u8]) -> bool {
        self.by_sequence.contains_key(sequence)
    }

    /// All registered encodings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], LogicalKey)> {
        self.encodings.iter().map(|(s, k)| (s.as_slice(), *k))
    }

    /// Number of registered encodings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.encodings.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encodings.is_empty()
    }

    /// The encoding family this catalog was built for.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn posix() -> Catalog {
        Catalog::build(Platform::Posix)
    }

    // ── Resolution ──────────────────────────────────────────────────

    #[test]
    fn resolves_arrow_keys() {
        let c = posix();
        assert_eq!(c.resolve(b"\x1b[A").unwrap(), keys::UP);
        assert_eq!(c.resolve(b"\x1b[B").unwrap(), keys::DOWN);
        assert_eq!(c.resolve(b"\x1b[C").unwrap(), keys::RIGHT);
        assert_eq!(c.resolve(b"\x1b[D").unwrap(), keys::LEFT);
    }

    #[test]
    fn application_mode_arrows_share_the_key() {
        let c = posix();
        assert_eq!(c.resolve(b"\x1bOA").unwrap(), keys::UP);
    }

    #[test]
    fn home_has_four_encodings() {
        let c = posix();
        assert_eq!(c.sequences_of(keys::HOME).len(), 4);
    }

    #[test]
    fn resolves_last_modified_function_key() {
        let c = posix();
        assert_eq!(
            c.resolve(b"\x1b[24;8~").unwrap(),
            LogicalKey::Named("CTRL ALT SHIFT F12")
        );
    }

    #[test]
    fn resolves_ctrl_arrows() {
        let c = posix();
        assert_eq!(
            c.resolve(b"\x1b[1;5C").unwrap(),
            LogicalKey::Named("CTRL RIGHT")
        );
    }

    #[test]
    fn unknown_sequence_fails() {
        let err = posix().resolve(b"\x1b[99z").unwrap_err();
        assert!(matches!(err, Error::UnknownKey { ref sequence } if sequence == b"\x1b[99z"));
    }

    #[test]
    fn printable_ascii_is_not_registered() {
        assert!(!posix().contains(b"a"));
    }

    // ── Aliases ─────────────────────────────────────────────────────

    #[test]
    fn duplicate_sequence_appends_alias() {
        let c = posix();
        assert_eq!(c.display_name(keys::CTRL_ENTER), "CTRL ENTER | CTRL J");
    }

    #[test]
    fn alias_resolves_to_first_registered_key() {
        let c = posix();
        assert_eq!(c.resolve(b"\n").unwrap(), keys::CTRL_ENTER);
        assert_eq!(c.key_named("CTRL J"), Some(keys::CTRL_ENTER));
    }

    #[test]
    fn backspace_has_both_encodings_and_ctrl_h_alias() {
        let c = posix();
        assert_eq!(c.resolve(b"\x7f").unwrap(), keys::BACKSPACE);
        assert_eq!(c.resolve(b"\x08").unwrap(), keys::BACKSPACE);
        assert_eq!(c.display_name(keys::BACKSPACE), "BACKSPACE | CTRL H");
    }

    #[test]
    fn conflicting_name_on_bound_sequence_is_ignored() {
        let mut c = Catalog::empty(Platform::Posix);
        c.register(b"\r", "ENTER");
        c.register(b"\x7f", "BACKSPACE");
        let key = c.register(b"\r", "BACKSPACE");
        assert_eq!(key, keys::ENTER);
        assert_eq!(c.display_name(keys::ENTER), "ENTER");
        assert_eq!(c.resolve(b"\x7f").unwrap(), keys::BACKSPACE);
    }

    #[test]
    fn register_same_pair_twice_is_idempotent() {
        let mut c = Catalog::empty(Platform::Posix);
        c.register(b"\r", "ENTER");
        c.register(b"\r", "ENTER");
        assert_eq!(c.len(), 1);
        assert_eq!(c.display_name(keys::ENTER), "ENTER");
    }

    // ── Display & reverse lookup ────────────────────────────────────

    #[test]
    fn display_name_for_printable_key() {
        assert_eq!(posix().display_name(LogicalKey::Char('é')), "é");
    }

    #[test]
    fn display_name_for_unregistered_named_key_is_its_name() {
        let c = Catalog::empty(Platform::Posix);
        assert_eq!(c.display_name(keys::UP), "UP");
    }

    #[test]
    fn key_named_single_char() {
        assert_eq!(posix().key_named("x"), Some(LogicalKey::Char('x')));
        assert_eq!(posix().key_named("NOPE"), None);
    }

    #[test]
    fn sequences_of_preserves_registration_order() {
        let c = posix();
        let up: Vec<&[u8]> = vec![b"\x1b[A", b"\x1bOA"];
        assert_eq!(c.sequences_of(keys::UP), up);
    }

    // ── Platform ────────────────────────────────────────────────────

    #[test]
    fn console_codes_only_on_console_platform() {
        assert!(!posix().contains(b"\xe0H"));
        let console = Catalog::build(Platform::Console);
        assert_eq!(console.resolve(b"\xe0H").unwrap(), keys::UP);
        assert_eq!(console.resolve(b"\x00;").unwrap(), LogicalKey::Named("F1"));
    }

    #[test]
    fn extended_prefix_only_on_console() {
        assert!(Platform::Console.is_extended_prefix(0xE0));
        assert!(Platform::Console.is_extended_prefix(0x00));
        assert!(!Platform::Posix.is_extended_prefix(0xE0));
    }

    // ── LogicalKey ──────────────────────────────────────────────────

    #[test]
    fn logical_key_accessors() {
        assert_eq!(keys::ENTER.name(), Some("ENTER"));
        assert_eq!(keys::ENTER.as_char(), None);
        assert_eq!(LogicalKey::Char('a').as_char(), Some('a'));
        assert!(LogicalKey::Char('a').is_printable());
        assert!(!LogicalKey::Char('\u{7}').is_printable());
        assert!(!keys::TAB.is_printable());
    }

    #[test]
    fn catalog_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
