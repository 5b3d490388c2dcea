// SPDX-License-Identifier: MIT
//
// Key decoder — raw bytes in, one logical key out.
//
// The decoder pulls bytes from a `RawChannel` until it holds one complete
// key, then resolves it through the catalog. The interesting part is
// knowing where a key ends:
//
//   ESC [ ...               keep reading while bytes are digits or `;`;
//                           stop on a letter, `~`, or anything else.
//                           `ESC [ 24 ; 8 ~` is eight bytes and must not be
//                           resolved at `ESC [ 2`.
//   ESC O ...               the same, but only if a letter, digit, or `;`
//                           follows within `ESC_TIMEOUT`. Otherwise it is
//                           Alt+Shift+O and the next byte starts a new key.
//   ESC x                   two bytes (Alt+x).
//   ESC alone               the ESC key, if nothing follows within
//                           `ESC_TIMEOUT`.
//   0x00 / 0xE0 x           two bytes on the Windows console.
//   UTF-8 lead byte         the rest of the character. A byte that is not
//                           a continuation byte ends it early and is left
//                           for the next key.
//   anything else           one byte.
//
// Resolution policy:
//
//   - CTRL+C is never a key. It raises `Error::Interrupted` whatever the
//     catalog says.
//   - Catalog hit → that key.
//   - Catalog miss on a single printable character → `LogicalKey::Char`.
//   - Catalog miss on anything else (unknown escape sequences included)
//     → `Error::UnknownKey` with the raw bytes.

use std::time::Duration;

use crate::catalog::{Catalog, LogicalKey};
use crate::channel::RawChannel;
use crate::error::{Error, Result, escape_bytes};

/// The escape-introducer byte.
pub const ESC: u8 = 0x1B;

/// The interrupt byte (CTRL+C).
pub const INTERRUPT: u8 = 0x03;

/// How long a lone ESC waits for a follow-up byte before it counts as the
/// ESC key.
pub const ESC_TIMEOUT: Duration = Duration::from_millis(25);

/// Longest escape sequence the decoder will accumulate. Anything longer is
/// resolved as-is (and will be unknown).
const MAX_SEQUENCE_LEN: usize = 32;

/// Assembles raw bytes into logical keys.
#[derive(Debug, Clone, Copy)]
pub struct KeyDecoder<'c> {
    catalog: &'c Catalog,
    esc_timeout: Duration,
}

impl<'c> KeyDecoder<'c> {
    /// A decoder resolving through `catalog`.
    #[must_use]
    pub const fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            esc_timeout: ESC_TIMEOUT,
        }
    }

    /// Override the lone-ESC timeout.
    #[must_use]
    pub const fn with_esc_timeout(mut self, timeout: Duration) -> Self {
        self.esc_timeout = timeout;
        self
    }

    /// The catalog this decoder resolves through.
    #[must_use]
    pub const fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Read and resolve the next key.
    ///
    /// # Errors
    ///
    /// [`Error::Interrupted`] on CTRL+C, [`Error::UnknownKey`] for
    /// unresolvable sequences, [`Error::Io`] from the channel.
    pub fn next_key<C: RawChannel + ?Sized>(&self, channel: &mut C) -> Result<LogicalKey> {
        let sequence = self.read_sequence(channel)?;
        self.resolve(&sequence)
    }

    /// Read the raw bytes of exactly one key without resolving them.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] from the channel.
    pub fn read_sequence<C: RawChannel + ?Sized>(&self, channel: &mut C) -> Result<Vec<u8>> {
        let first = channel.read_byte()?;
        let mut sequence = Vec::with_capacity(8);
        sequence.push(first);

        if first == ESC {
            if !channel.byte_ready(self.esc_timeout)? {
                return Ok(sequence);
            }
            let second = channel.read_byte()?;
            sequence.push(second);
            if second == b'[' {
                read_escape_body(channel, &mut sequence)?;
            } else if second == b'O' && channel.byte_ready(self.esc_timeout)? {
                let byte = channel.read_byte()?;
                if is_parameter_byte(byte) {
                    sequence.push(byte);
                    read_escape_body(channel, &mut sequence)?;
                } else if byte.is_ascii_alphabetic() {
                    sequence.push(byte);
                } else {
                    channel.unread_byte(byte);
                }
            }
        } else if self.catalog.platform().is_extended_prefix(first) {
            sequence.push(channel.read_byte()?);
        } else if first >= 0xC0 {
            for _ in 1..utf8_char_len(first) {
                let byte = channel.read_byte()?;
                if !is_continuation_byte(byte) {
                    channel.unread_byte(byte);
                    break;
                }
                sequence.push(byte);
            }
        }

        tracing::trace!(sequence = %escape_bytes(&sequence), "key bytes");
        Ok(sequence)
    }

    /// Resolve a complete sequence under the decoder's policy.
    ///
    /// # Errors
    ///
    /// [`Error::Interrupted`] for CTRL+C, [`Error::UnknownKey`] when the
    /// catalog misses and the bytes are not one printable character.
    pub fn resolve(&self, sequence: &[u8]) -> Result<LogicalKey> {
        if sequence == [INTERRUPT] {
            tracing::debug!("interrupt key");
            return Err(Error::Interrupted);
        }

        match self.catalog.resolve(sequence) {
            Ok(key) => Ok(key),
            Err(err) => literal(sequence).ok_or_else(|| {
                tracing::debug!(sequence = %escape_bytes(sequence), "unknown key sequence");
                err
            }),
        }
    }
}

/// Accumulate the rest of a CSI or SS3 sequence.
///
/// Parameter bytes (digits and `;`) continue the sequence; the first byte
/// outside that class ends it and is kept as the final byte.
fn read_escape_body<C: RawChannel + ?Sized>(channel: &mut C, sequence: &mut Vec<u8>) -> Result<()> {
    while sequence.len() < MAX_SEQUENCE_LEN {
        let byte = channel.read_byte()?;
        sequence.push(byte);
        if !is_parameter_byte(byte) {
            break;
        }
    }
    Ok(())
}

/// Digits and `;` continue an escape sequence; letters, `~`, and anything
/// else terminate it.
const fn is_parameter_byte(byte: u8) -> bool {
    byte.is_ascii_digit() || byte == b';'
}

const fn is_continuation_byte(byte: u8) -> bool {
    matches!(byte, 0x80..=0xBF)
}

/// The sequence as a printable character, if it is exactly one.
fn literal(sequence: &[u8]) -> Option<LogicalKey> {
    let text = std::str::from_utf8(sequence).ok()?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if !ch.is_control() => Some(LogicalKey::Char(ch)),
        _ => None,
    }
}

/// Expected byte length of a UTF-8 character from its lead byte.
/// Returns 0 for invalid lead bytes (continuation bytes, 0xF8..=0xFF).
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Platform, keys};
    use crate::channel::ScriptedChannel;
    use pretty_assertions::assert_eq;

    fn decode_all(catalog: &Catalog, bytes: &[u8]) -> Vec<LogicalKey> {
        let decoder = KeyDecoder::new(catalog);
        let mut ch = ScriptedChannel::new(bytes);
        let mut out = Vec::new();
        while ch.remaining() > 0 {
            out.push(decoder.next_key(&mut ch).unwrap());
        }
        out
    }

    fn posix() -> Catalog {
        Catalog::build(Platform::Posix)
    }

    // ── Single bytes ────────────────────────────────────────────────

    #[test]
    fn printable_ascii_falls_back_to_char() {
        assert_eq!(
            decode_all(&posix(), b"hi"),
            vec![LogicalKey::Char('h'), LogicalKey::Char('i')]
        );
    }

    #[test]
    fn enter_and_ctrl_enter() {
        assert_eq!(decode_all(&posix(), b"\r\n"), vec![keys::ENTER, keys::CTRL_ENTER]);
    }

    #[test]
    fn both_backspace_bytes() {
        assert_eq!(decode_all(&posix(), b"\x7f\x08"), vec![keys::BACKSPACE, keys::BACKSPACE]);
    }

    #[test]
    fn ctrl_c_interrupts() {
        let catalog = posix();
        let decoder = KeyDecoder::new(&catalog);
        let mut ch = ScriptedChannel::new(b"\x03");
        assert!(matches!(decoder.next_key(&mut ch), Err(Error::Interrupted)));
    }

    #[test]
    fn ctrl_c_interrupts_even_without_catalog_entry() {
        let catalog = Catalog::empty(Platform::Posix);
        let decoder = KeyDecoder::new(&catalog);
        assert!(matches!(decoder.resolve(b"\x03"), Err(Error::Interrupted)));
    }

    #[test]
    fn unregistered_control_byte_is_unknown() {
        let catalog = Catalog::empty(Platform::Posix);
        let decoder = KeyDecoder::new(&catalog);
        assert!(matches!(decoder.resolve(b"\x01"), Err(Error::UnknownKey { .. })));
    }

    // ── Escape sequences ────────────────────────────────────────────

    #[test]
    fn arrows_in_a_row() {
        assert_eq!(
            decode_all(&posix(), b"\x1b[A\x1b[B\x1bOC\x1b[D"),
            vec![keys::UP, keys::DOWN, keys::RIGHT, keys::LEFT]
        );
    }

    #[test]
    fn long_sequence_is_not_resolved_early() {
        let catalog = posix();
        let decoder = KeyDecoder::new(&catalog);
        let mut ch = ScriptedChannel::new(b"\x1b[24;8~x");
        assert_eq!(decoder.read_sequence(&mut ch).unwrap(), b"\x1b[24;8~".to_vec());
        assert_eq!(ch.remaining(), 1);
    }

    #[test]
    fn modified_arrow_then_text() {
        assert_eq!(
            decode_all(&posix(), b"\x1b[1;5Dz"),
            vec![LogicalKey::Named("CTRL LEFT"), LogicalKey::Char('z')]
        );
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(
            decode_all(&posix(), b"\x1b[3~\x1b[5~\x1b[6~"),
            vec![keys::DELETE, keys::PAGE_UP, keys::PAGE_DOWN]
        );
    }

    #[test]
    fn lone_escape_resolves_after_timeout() {
        assert_eq!(decode_all(&posix(), b"\x1b"), vec![keys::ESC]);
    }

    #[test]
    fn alt_letter() {
        assert_eq!(decode_all(&posix(), b"\x1bx"), vec![LogicalKey::Named("ALT X")]);
    }

    #[test]
    fn alt_shift_o_alone() {
        assert_eq!(decode_all(&posix(), b"\x1bO"), vec![LogicalKey::Named("ALT SHIFT O")]);
    }

    #[test]
    fn alt_shift_o_leaves_the_next_key_alone() {
        assert_eq!(
            decode_all(&posix(), b"\x1bO \x1bO\x7f"),
            vec![
                LogicalKey::Named("ALT SHIFT O"),
                LogicalKey::Char(' '),
                LogicalKey::Named("ALT SHIFT O"),
                keys::BACKSPACE,
            ]
        );
    }

    #[test]
    fn ss3_with_modifier_parameter() {
        let catalog = posix();
        let decoder = KeyDecoder::new(&catalog);
        let mut ch = ScriptedChannel::new(b"\x1bO5Pz");
        assert_eq!(decoder.read_sequence(&mut ch).unwrap(), b"\x1bO5P".to_vec());
        assert_eq!(ch.remaining(), 1);
    }

    #[test]
    fn unknown_three_byte_escape_is_unknown_key() {
        let catalog = posix();
        let decoder = KeyDecoder::new(&catalog);
        let mut ch = ScriptedChannel::new(b"\x1b[z");
        match decoder.next_key(&mut ch) {
            Err(Error::UnknownKey { sequence }) => assert_eq!(sequence, b"\x1b[z".to_vec()),
            other => panic!("expected UnknownKey, got {other:?}"),
        }
        assert_eq!(ch.remaining(), 0);
    }

    #[test]
    fn non_parameter_byte_terminates_sequence() {
        let catalog = posix();
        let decoder = KeyDecoder::new(&catalog);
        let mut ch = ScriptedChannel::new(b"\x1b[<0");
        assert_eq!(decoder.read_sequence(&mut ch).unwrap(), b"\x1b[<".to_vec());
    }

    #[test]
    fn runaway_sequence_is_capped() {
        let catalog = posix();
        let decoder = KeyDecoder::new(&catalog);
        let mut bytes = b"\x1b[".to_vec();
        bytes.extend(std::iter::repeat_n(b'1', 64));
        let mut ch = ScriptedChannel::new(&bytes);
        assert_eq!(decoder.read_sequence(&mut ch).unwrap().len(), MAX_SEQUENCE_LEN);
    }

    // ── UTF-8 ───────────────────────────────────────────────────────

    #[test]
    fn multibyte_characters() {
        assert_eq!(
            decode_all(&posix(), "é世🦀".as_bytes()),
            vec![
                LogicalKey::Char('é'),
                LogicalKey::Char('世'),
                LogicalKey::Char('🦀')
            ]
        );
    }

    #[test]
    fn invalid_utf8_is_unknown() {
        let catalog = posix();
        let decoder = KeyDecoder::new(&catalog);
        let mut ch = ScriptedChannel::new(b"\xc3\x41");
        match decoder.next_key(&mut ch) {
            Err(Error::UnknownKey { sequence }) => assert_eq!(sequence, vec![0xC3]),
            other => panic!("expected UnknownKey, got {other:?}"),
        }
        assert_eq!(decoder.next_key(&mut ch).unwrap(), LogicalKey::Char('A'));
    }

    #[test]
    fn truncated_utf8_keeps_the_following_escape() {
        let catalog = posix();
        let decoder = KeyDecoder::new(&catalog);
        let mut ch = ScriptedChannel::new(b"\xe4\xb8\x1b[A");
        assert!(matches!(decoder.next_key(&mut ch), Err(Error::UnknownKey { .. })));
        assert_eq!(decoder.next_key(&mut ch).unwrap(), keys::UP);
    }

    // ── Console platform ────────────────────────────────────────────

    #[test]
    fn console_extended_codes() {
        let catalog = Catalog::build(Platform::Console);
        assert_eq!(
            decode_all(&catalog, b"\xe0H\x00;\xe0\x86"),
            vec![keys::UP, LogicalKey::Named("F1"), LogicalKey::Named("F12")]
        );
    }

    #[test]
    fn console_still_understands_vt_sequences() {
        let catalog = Catalog::build(Platform::Console);
        assert_eq!(decode_all(&catalog, b"\x1b[A"), vec![keys::UP]);
    }

    // ── Determinism ─────────────────────────────────────────────────

    #[test]
    fn every_registered_sequence_decodes_to_its_key() {
        let catalog = posix();
        let decoder = KeyDecoder::new(&catalog);
        for (sequence, key) in catalog.iter() {
            if sequence == [INTERRUPT] {
                continue;
            }
            let mut ch = ScriptedChannel::new(sequence);
            assert_eq!(decoder.next_key(&mut ch).unwrap(), key, "{}", escape_bytes(sequence));
            assert_eq!(ch.remaining(), 0, "{}", escape_bytes(sequence));
        }
    }

    #[test]
    fn utf8_char_len_table() {
        assert_eq!(utf8_char_len(b'a'), 1);
        assert_eq!(utf8_char_len(0xC3), 2);
        assert_eq!(utf8_char_len(0xE4), 3);
        assert_eq!(utf8_char_len(0xF0), 4);
        assert_eq!(utf8_char_len(0x80), 0);
    }
}
