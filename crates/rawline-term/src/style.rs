// SPDX-License-Identifier: MIT
//
// Style formatter — named colors and text attributes as SGR prefixes.
//
// The vocabulary is small and fixed: the eight ANSI color names with a
// `bright_` variant each, `default`, 256-palette indices, and `#rrggbb`
// hex for true color. Attributes are the SGR 1–9 set. Anything outside
// the vocabulary is an `UnknownStyle` error; we never fall back to plain
// text, because an unstyled result would look exactly like a typo that
// nobody noticed.
//
// Nesting works by re-assertion. A painted string ends with a reset, so
// painting a string that already contains painted pieces would lose the
// outer format after the first inner reset. `paint` re-emits the outer
// prefix after every embedded reset:
//
//   paint("a" + red("b") + "c", bold)
//     = BOLD "a" RED "b" RESET BOLD "c" RESET

use std::fmt;
use std::io::Write;

use crate::ansi;
use crate::error::{Error, Result};

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// These map directly to SGR (Select Graphic Rendition) parameters.
    /// Combine with bitwise OR:
    ///
    /// ```
    /// use rawline_term::style::Attr;
    ///
    /// let style = Attr::BOLD | Attr::ITALIC;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD          = 1 << 0;
        /// SGR 2 — decreased intensity (faint).
        const DIM           = 1 << 1;
        /// SGR 3 — italic or oblique.
        const ITALIC        = 1 << 2;
        /// SGR 4 — single underline.
        const UNDERLINE     = 1 << 3;
        /// SGR 5 — slow blink.
        const BLINK         = 1 << 4;
        /// SGR 7 — swap foreground and background.
        const INVERSE       = 1 << 5;
        /// SGR 8 — invisible text.
        const HIDDEN        = 1 << 6;
        /// SGR 9 — crossed-out text.
        const STRIKETHROUGH = 1 << 7;
    }
}

impl Attr {
    /// Look up one attribute by name (case-insensitive).
    ///
    /// Accepts `bold`, `dim`/`faint`, `italic`, `underline`, `blink`,
    /// `inverse`/`reverse`, `hidden`, `strikethrough`/`strike`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownStyle`] for any other name.
    pub fn parse(name: &str) -> Result<Self> {
        let attr = match name.trim().to_ascii_lowercase().as_str() {
            "bold" => Self::BOLD,
            "dim" | "faint" => Self::DIM,
            "italic" => Self::ITALIC,
            "underline" => Self::UNDERLINE,
            "blink" => Self::BLINK,
            "inverse" | "reverse" => Self::INVERSE,
            "hidden" => Self::HIDDEN,
            "strikethrough" | "strike" => Self::STRIKETHROUGH,
            _ => return Err(unknown(name)),
        };
        Ok(attr)
    }
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// A terminal color as SGR understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// The terminal's default (SGR 39 / 49).
    #[default]
    Default,
    /// One of the 16 named colors: 0–7 standard, 8–15 bright.
    Ansi(u8),
    /// A 256-color palette index.
    Indexed(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

const COLOR_NAMES: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

impl Color {
    /// Parse a color name.
    ///
    /// Accepts the eight ANSI names, their `bright_` forms (also
    /// `bright-red`, `brightred`, `bright red`), `gray`/`grey` for bright
    /// black, `default`, a palette index `0`–`255`, and `#rrggbb` or
    /// `#rgb` hex.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownStyle`] for anything else.
    pub fn parse(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();

        if lower == "default" {
            return Ok(Self::Default);
        }
        if lower == "gray" || lower == "grey" {
            return Ok(Self::Ansi(8));
        }
        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| unknown(name));
        }
        if let Ok(index) = lower.parse::<u8>() {
            return Ok(Self::Indexed(index));
        }

        let (base, offset) = match lower.strip_prefix("bright") {
            Some(rest) => (rest.trim_start_matches(['_', '-', ' ']), 8),
            None => (lower.as_str(), 0),
        };
        COLOR_NAMES
            .iter()
            .position(|&n| n == base)
            .and_then(|i| u8::try_from(i).ok())
            .map(|i| Self::Ansi(i + offset))
            .ok_or_else(|| unknown(name))
    }
}

fn parse_hex(s: &str) -> Option<Color> {
    let b = s.as_bytes();
    match b.len() {
        3 => {
            let r = parse_hex_digit(b[0])?;
            let g = parse_hex_digit(b[1])?;
            let bl = parse_hex_digit(b[2])?;
            Some(Color::Rgb(r << 4 | r, g << 4 | g, bl << 4 | bl))
        }
        6 => Some(Color::Rgb(
            parse_hex_byte(&b[0..2])?,
            parse_hex_byte(&b[2..4])?,
            parse_hex_byte(&b[4..6])?,
        )),
        _ => None,
    }
}

#[inline]
const fn parse_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[inline]
fn parse_hex_byte(bytes: &[u8]) -> Option<u8> {
    let hi = parse_hex_digit(bytes[0])?;
    let lo = parse_hex_digit(bytes[1])?;
    Some(hi << 4 | lo)
}

fn unknown(name: &str) -> Error {
    Error::UnknownStyle {
        name: name.to_owned(),
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// A resolved foreground, background, and attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    /// Foreground color, or leave the terminal's current one.
    pub fg: Option<Color>,
    /// Background color, or leave the terminal's current one.
    pub bg: Option<Color>,
    /// Attributes switched on; empty leaves the terminal's current ones.
    pub attrs: Attr,
}

impl Style {
    /// No color, no attributes.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: Attr::empty(),
        }
    }

    /// Resolve names into a style.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownStyle`] naming the first unknown color or style.
    pub fn parse(fg: Option<&str>, bg: Option<&str>, styles: &[&str]) -> Result<Self> {
        let fg = fg.map(Color::parse).transpose()?;
        let bg = bg.map(Color::parse).transpose()?;
        let attrs = styles
            .iter()
            .try_fold(Attr::empty(), |acc, name| Ok::<_, Error>(acc | Attr::parse(name)?))?;
        Ok(Self { fg, bg, attrs })
    }

    /// Whether painting with this style is a no-op.
    #[must_use]
    pub const fn is_plain(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_empty()
    }

    /// The SGR sequence(s) that switch the terminal into this style.
    #[must_use]
    pub fn prefix(&self) -> String {
        let mut buf = Vec::with_capacity(32);
        // Writing to a Vec cannot fail.
        if let Some(color) = self.fg {
            let _ = ansi::fg(&mut buf, color);
        }
        if let Some(color) = self.bg {
            let _ = ansi::bg(&mut buf, color);
        }
        let _ = ansi::attrs(&mut buf, self.attrs);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Wrap `text` in this style, re-asserting it after embedded resets.
    #[must_use]
    pub fn paint(&self, text: &str) -> String {
        if self.is_plain() {
            return text.to_owned();
        }
        let prefix = self.prefix();
        let mut out = String::with_capacity(text.len() + prefix.len() * 2 + ansi::RESET.len());
        out.push_str(&prefix);

        let mut rest = text;
        while let Some((at, len)) = find_reset(rest) {
            let end = at + len;
            out.push_str(&rest[..end]);
            out.push_str(&prefix);
            rest = &rest[end..];
        }
        out.push_str(rest);
        out.push_str(ansi::RESET);
        out
    }

    /// Write `text` painted with this style.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn write_to(&self, w: &mut impl Write, text: &str) -> Result<()> {
        w.write_all(self.paint(text).as_bytes())?;
        Ok(())
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

/// Locate the first full reset (`ESC [ 0 m` or `ESC [ m`).
fn find_reset(s: &str) -> Option<(usize, usize)> {
    let long = s.find(ansi::RESET).map(|i| (i, ansi::RESET.len()));
    let short = s.find("\x1b[m").map(|i| (i, 3));
    match (long, short) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Paint `text` with named colors and styles.
///
/// ```
/// use rawline_term::style::paint;
///
/// let s = paint("ok", Some("green"), None, &["bold"]).unwrap();
/// assert_eq!(s, "\x1b[32m\x1b[1mok\x1b[0m");
/// ```
///
/// # Errors
///
/// [`Error::UnknownStyle`] if any name is outside the vocabulary.
pub fn paint(text: &str, fg: Option<&str>, bg: Option<&str>, styles: &[&str]) -> Result<String> {
    Ok(Style::parse(fg, bg, styles)?.paint(text))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
