//! Editor options and the `:set` directive syntax.
//!
//! [`EditorOptions`] holds everything that changes how a read behaves. The
//! same `:set` grammar used by modal editors configures it, so options can
//! come from a command line (`--set width=60`) or a config string
//! (`"noqc width=40"`).
//!
//! # Supported syntax
//!
//! | Syntax           | Effect                        |
//! |------------------|-------------------------------|
//! | `option`         | Enable boolean / show value   |
//! | `nooption`       | Disable boolean               |
//! | `option!`        | Toggle boolean                |
//! | `option?`        | Query current value           |
//! | `option=value`   | Assign a value                |
//! | (empty)          | Show changed options          |
//! | `all`            | Show all options              |
//!
//! # Option names
//!
//! | Full name      | Abbrev | Type     | Default              |
//! |----------------|--------|----------|----------------------|
//! | `width`        | `w`    | integer  | `auto` (terminal)    |
//! | `querycursor`  | `qc`   | bool     | true                 |
//! | `echonewline`  | `en`   | bool     | true                 |
//! | `linebreak`    | `lb`   | key list | `ENTER`              |
//! | `exitkeys`     | `ek`   | key list | `CTRL D,CTRL ENTER`  |
//!
//! Key lists are comma-separated catalog names. `+` stands in for a space,
//! so `exitkeys=CTRL+D,ESC` works where spaces would split the argument.

use thiserror::Error;

/// A parsed `:set` directive.
///
/// Produced by [`parse_set`] and applied with [`EditorOptions::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `option` — enable a boolean option.
    On(String),

    /// `nooption` — disable a boolean option.
    Off(String),

    /// `option!` — toggle a boolean option.
    Toggle(String),

    /// `option?` — query the current value.
    Query(String),

    /// `option=value` — assign a value.
    Assign(String, String),

    /// No arguments — show changed options.
    ShowChanged,

    /// `all` — show all options.
    ShowAll,
}

/// Why a directive could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// The name is neither a full option name nor an abbreviation.
    #[error("unknown option: {0}")]
    Unknown(String),

    /// On/off/toggle used on an option that is not boolean.
    #[error("not a boolean option: {0}")]
    NotBoolean(String),

    /// The assigned value does not parse for this option.
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue {
        /// Canonical option name.
        name: &'static str,
        /// The value as given.
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Option names
// ---------------------------------------------------------------------------

const WIDTH: &str = "width";
const QUERY_CURSOR: &str = "querycursor";
const ECHO_NEWLINE: &str = "echonewline";
const LINE_BREAK: &str = "linebreak";
const EXIT_KEYS: &str = "exitkeys";

/// Every option in display order.
const ALL_OPTIONS: [&str; 5] = [WIDTH, QUERY_CURSOR, ECHO_NEWLINE, LINE_BREAK, EXIT_KEYS];

/// Map a full name or abbreviation to the canonical option name.
#[must_use]
pub fn canonical_name(name: &str) -> Option<&'static str> {
    match name {
        "width" | "w" => Some(WIDTH),
        "querycursor" | "qc" => Some(QUERY_CURSOR),
        "echonewline" | "en" => Some(ECHO_NEWLINE),
        "linebreak" | "lb" => Some(LINE_BREAK),
        "exitkeys" | "ek" => Some(EXIT_KEYS),
        _ => None,
    }
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(canonical_name(name), Some(QUERY_CURSOR | ECHO_NEWLINE))
}

/// Returns `true` if `name` is any known option.
#[must_use]
pub fn is_known_option(name: &str) -> bool {
    canonical_name(name).is_some()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a whitespace-separated directive string.
///
/// An empty string produces [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    let arg = arg.trim();
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // `no` prefix only when the remainder is a boolean option, so a future
    // option starting with "no" is not misread.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    // A bare non-boolean name shows its value.
    if is_known_option(arg) && !is_bool_option(arg) {
        return SetDirective::Query(arg.to_string());
    }

    SetDirective::On(arg.to_string())
}

/// Normalize one key name from a key list: `+` becomes a space, and
/// multi-character names are upper-cased to match the catalog.
#[must_use]
pub fn normalize_key_name(name: &str) -> String {
    let name = name.trim().replace('+', " ");
    if name.chars().count() > 1 {
        name.to_ascii_uppercase()
    } else {
        name
    }
}

fn parse_key_list(name: &'static str, value: &str) -> Result<Vec<String>, OptionError> {
    let keys: Vec<String> = value
        .split(',')
        .map(normalize_key_name)
        .filter(|k| !k.is_empty())
        .collect();
    if keys.is_empty() {
        return Err(OptionError::InvalidValue {
            name,
            value: value.to_string(),
        });
    }
    Ok(keys)
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, OptionError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "0" | "off" | "false" | "no" => Ok(false),
        _ => Err(OptionError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

/// Format a boolean option for display.
///
/// Returns `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// EditorOptions
// ---------------------------------------------------------------------------

/// Settings for one line editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    /// Wrap width in columns. `None` asks the terminal (falling back to 80).
    pub width: Option<u16>,

    /// Ask the terminal for the cursor column before reading, so the first
    /// row's capacity accounts for a prompt already on screen.
    pub query_cursor: bool,

    /// Emit CR/LF after the read terminates.
    pub echo_newline: bool,

    /// Keys that break a line. In single-line reads they terminate.
    pub line_break: Vec<String>,

    /// Keys that end a read.
    pub exit_keys: Vec<String>,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            width: None,
            query_cursor: true,
            echo_newline: true,
            line_break: vec!["ENTER".to_string()],
            exit_keys: vec!["CTRL D".to_string(), "CTRL ENTER".to_string()],
        }
    }
}

impl EditorOptions {
    /// Options with a fixed wrap width and no cursor query.
    #[must_use]
    pub fn fixed_width(width: u16) -> Self {
        Self {
            width: Some(width),
            query_cursor: false,
            ..Self::default()
        }
    }

    /// Apply one directive. Queries and listings return the text to show.
    ///
    /// # Errors
    ///
    /// [`OptionError`] for unknown names, boolean operations on non-boolean
    /// options, and values that do not parse.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionError> {
        match directive {
            SetDirective::ShowAll => Ok(Some(self.show_all().join(" "))),
            SetDirective::ShowChanged => Ok(Some(self.changed().join(" "))),
            SetDirective::Query(name) => {
                let name = resolve(name)?;
                Ok(Some(self.show(name)))
            }
            SetDirective::On(name) => self.set_bool(name, |_| true),
            SetDirective::Off(name) => self.set_bool(name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v),
            SetDirective::Assign(name, value) => {
                self.assign(resolve(name)?, value)?;
                Ok(None)
            }
        }
    }

    /// Apply every directive in `args` (whitespace separated), stopping at
    /// the first error.
    ///
    /// # Errors
    ///
    /// The first [`OptionError`] encountered.
    pub fn apply_str(&mut self, args: &str) -> Result<Vec<String>, OptionError> {
        let mut shown = Vec::new();
        for directive in parse_set(args) {
            if let Some(text) = self.apply(&directive)? {
                shown.push(text);
            }
        }
        Ok(shown)
    }

    fn set_bool(
        &mut self,
        name: &str,
        f: impl FnOnce(bool) -> bool,
    ) -> Result<Option<String>, OptionError> {
        let slot = match resolve(name)? {
            QUERY_CURSOR => &mut self.query_cursor,
            ECHO_NEWLINE => &mut self.echo_newline,
            // Bare `width` etc. are parsed as queries; reaching here means
            // `width!` or `nowidth`.
            _ => return Err(OptionError::NotBoolean(name.to_string())),
        };
        *slot = f(*slot);
        Ok(None)
    }

    fn assign(&mut self, name: &'static str, value: &str) -> Result<(), OptionError> {
        match name {
            WIDTH => {
                self.width = if value == "auto" || value == "0" {
                    None
                } else {
                    let width = value.parse::<u16>().map_err(|_| OptionError::InvalidValue {
                        name,
                        value: value.to_string(),
                    })?;
                    Some(width)
                };
            }
            QUERY_CURSOR => self.query_cursor = parse_bool(name, value)?,
            ECHO_NEWLINE => self.echo_newline = parse_bool(name, value)?,
            LINE_BREAK => self.line_break = parse_key_list(name, value)?,
            EXIT_KEYS => self.exit_keys = parse_key_list(name, value)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        tracing::debug!(option = name, value, "option set");
        Ok(())
    }

    /// Current value of a canonical option, in `:set` display form.
    fn show(&self, name: &'static str) -> String {
        match name {
            WIDTH => match self.width {
                Some(w) => format!("{WIDTH}={w}"),
                None => format!("{WIDTH}=auto"),
            },
            QUERY_CURSOR => format_bool(QUERY_CURSOR, self.query_cursor),
            ECHO_NEWLINE => format_bool(ECHO_NEWLINE, self.echo_newline),
            LINE_BREAK => format!("{LINE_BREAK}={}", self.line_break.join(",")),
            EXIT_KEYS => format!("{EXIT_KEYS}={}", self.exit_keys.join(",")),
            _ => String::new(),
        }
    }

    /// Every option in display form.
    #[must_use]
    pub fn show_all(&self) -> Vec<String> {
        ALL_OPTIONS.into_iter().map(|name| self.show(name)).collect()
    }

    /// Options that differ from the defaults, in display form.
    #[must_use]
    pub fn changed(&self) -> Vec<String> {
        let defaults = Self::default();
        ALL_OPTIONS
            .into_iter()
            .map(|name| (self.show(name), defaults.show(name)))
            .filter(|(current, default)| current != default)
            .map(|(current, _)| current)
            .collect()
    }
}

fn resolve(name: &str) -> Result<&'static str, OptionError> {
    canonical_name(name).ok_or_else(|| OptionError::Unknown(name.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── parse_set_arg ─────────────────────────────────────────────────────

    #[test]
    fn parse_boolean_on_off() {
        assert_eq!(parse_set_arg("qc"), SetDirective::On("qc".into()));
        assert_eq!(parse_set_arg("noqc"), SetDirective::Off("qc".into()));
        assert_eq!(
            parse_set_arg("noechonewline"),
            SetDirective::Off("echonewline".into())
        );
    }

    #[test]
    fn parse_toggle_and_query() {
        assert_eq!(parse_set_arg("en!"), SetDirective::Toggle("en".into()));
        assert_eq!(parse_set_arg("width?"), SetDirective::Query("width".into()));
    }

    #[test]
    fn parse_assign_keeps_spaces_in_value() {
        assert_eq!(
            parse_set_arg("exitkeys=CTRL D,ESC"),
            SetDirective::Assign("exitkeys".into(), "CTRL D,ESC".into())
        );
    }

    #[test]
    fn parse_bare_non_boolean_is_query() {
        assert_eq!(parse_set_arg("w"), SetDirective::Query("w".into()));
        assert_eq!(parse_set_arg("exitkeys"), SetDirective::Query("exitkeys".into()));
    }

    #[test]
    fn parse_no_prefix_only_for_booleans() {
        assert_eq!(parse_set_arg("nowidth"), SetDirective::On("nowidth".into()));
    }

    #[test]
    fn parse_empty_and_all() {
        assert_eq!(parse_set("  "), vec![SetDirective::ShowChanged]);
        assert_eq!(parse_set("all"), vec![SetDirective::ShowAll]);
    }

    #[test]
    fn parse_multiple_args() {
        assert_eq!(
            parse_set("noqc w=40"),
            vec![
                SetDirective::Off("qc".into()),
                SetDirective::Assign("w".into(), "40".into()),
            ]
        );
    }

    // ── apply ─────────────────────────────────────────────────────────────

    #[test]
    fn defaults() {
        let opts = EditorOptions::default();
        assert_eq!(opts.width, None);
        assert!(opts.query_cursor);
        assert!(opts.echo_newline);
        assert_eq!(opts.line_break, vec!["ENTER"]);
        assert_eq!(opts.exit_keys, vec!["CTRL D", "CTRL ENTER"]);
    }

    #[test]
    fn apply_width() {
        let mut opts = EditorOptions::default();
        opts.apply_str("width=60").unwrap();
        assert_eq!(opts.width, Some(60));
        opts.apply_str("w=auto").unwrap();
        assert_eq!(opts.width, None);
    }

    #[test]
    fn apply_booleans() {
        let mut opts = EditorOptions::default();
        opts.apply_str("noqc en!").unwrap();
        assert!(!opts.query_cursor);
        assert!(!opts.echo_newline);
        opts.apply_str("querycursor=on").unwrap();
        assert!(opts.query_cursor);
    }

    #[test]
    fn apply_key_lists_normalize_names() {
        let mut opts = EditorOptions::default();
        opts.apply_str("ek=ctrl+d,esc,q lb=ENTER,ctrl+j").unwrap();
        assert_eq!(opts.exit_keys, vec!["CTRL D", "ESC", "q"]);
        assert_eq!(opts.line_break, vec!["ENTER", "CTRL J"]);
    }

    #[test]
    fn query_and_listings() {
        let mut opts = EditorOptions::default();
        assert_eq!(opts.apply_str("w").unwrap(), vec!["width=auto"]);
        opts.apply_str("noen").unwrap();
        assert_eq!(opts.apply_str("").unwrap(), vec!["noechonewline"]);
        assert_eq!(
            opts.show_all(),
            vec![
                "width=auto",
                "querycursor",
                "noechonewline",
                "linebreak=ENTER",
                "exitkeys=CTRL D,CTRL ENTER",
            ]
        );
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn unknown_option() {
        let mut opts = EditorOptions::default();
        assert_eq!(
            opts.apply_str("colour=red"),
            Err(OptionError::Unknown("colour".into()))
        );
        assert_eq!(opts.apply_str("bogus"), Err(OptionError::Unknown("bogus".into())));
    }

    #[test]
    fn toggle_on_non_boolean() {
        let mut opts = EditorOptions::default();
        assert_eq!(
            opts.apply_str("width!"),
            Err(OptionError::NotBoolean("width".into()))
        );
    }

    #[test]
    fn invalid_values() {
        let mut opts = EditorOptions::default();
        assert!(matches!(
            opts.apply_str("width=wide"),
            Err(OptionError::InvalidValue { name: "width", .. })
        ));
        assert!(matches!(
            opts.apply_str("qc=maybe"),
            Err(OptionError::InvalidValue { name: "querycursor", .. })
        ));
        assert!(matches!(
            opts.apply_str("ek=,"),
            Err(OptionError::InvalidValue { name: "exitkeys", .. })
        ));
    }

    #[test]
    fn format_bool_on_off() {
        assert_eq!(format_bool("qc", true), "qc");
        assert_eq!(format_bool("qc", false), "noqc");
    }
}
