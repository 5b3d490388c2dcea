// SPDX-License-Identifier: MIT
//
// rawline — interactive driver for the raw-terminal line editor.
//
// Wires the two crates together behind a small CLI:
//
//   rawline-term   → key catalog, raw mode, decoder, cursor protocol, style
//   rawline-editor → edit buffer, line editor, options, console facade
//
// Every subcommand builds one `Console` on stdin/stdout and performs a
// single kind of read:
//
//   line   one line, ENTER ends it
//   lines  several lines, ENTER breaks, CTRL+D / CTRL+ENTER ends
//   text   like `lines`, printed back as one block
//   key    one key, printed with its catalog name
//   keys   key diagnostics until CTRL+C: name, aliases, raw bytes
//   catalog  dump every registered sequence
//
// Logging goes to a file (`--log`) and nowhere else: anything written to
// the terminal during a raw read would corrupt the echo.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use rawline_editor::options::{self, EditorOptions};
use rawline_editor::Console;
use rawline_term::decoder::KeyDecoder;
use rawline_term::error::escape_bytes;
use rawline_term::{Error, TtyChannel};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for a CTRL+C, as shells report SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

// ─── CLI ────────────────────────────────────────────────────────────────────

/// Raw-terminal key input and in-place line editing
#[derive(Parser, Debug)]
#[command(name = "rawline")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Editor option in `:set` form (`width=60`, `noqc`, `ek=CTRL+D,ESC`).
    /// Queries (`width?`, `all`) print to stderr. Repeatable.
    #[arg(long = "set", value_name = "DIRECTIVE", global = true)]
    set: Vec<String>,

    /// Prompt written before the read starts
    #[arg(short, long, global = true, default_value = "")]
    prompt: String,

    /// Prompt color (any style name: red, bright_blue, #ff8800, ...)
    #[arg(long, global = true)]
    prompt_color: Option<String>,

    /// Write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "debug")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read one line
    Line {
        /// Text the line starts with
        #[arg(long, default_value = "")]
        seed: String,
    },
    /// Read several lines
    Lines {
        /// Starting lines (repeat for more than one)
        #[arg(long)]
        seed: Vec<String>,
    },
    /// Read multi-line text
    Text {
        /// Starting text; `\n` separates lines
        #[arg(long, default_value = "")]
        seed: String,
    },
    /// Read one key and print its name
    Key,
    /// Print every key pressed until CTRL+C
    Keys,
    /// List every registered key sequence
    Catalog,
}

// ─── Setup ──────────────────────────────────────────────────────────────────

fn init_logging(args: &Args) -> io::Result<()> {
    let Some(path) = &args.log else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

/// Apply `--set` directives in order. Queries (`width?`, `all`, an empty
/// directive) don't change anything; their answers come back as report
/// lines.
fn editor_options(
    directives: &[String],
) -> Result<(EditorOptions, Vec<String>), options::OptionError> {
    let mut opts = EditorOptions::default();
    let mut reports = Vec::new();
    for directive in directives {
        reports.extend(opts.apply_str(directive)?);
    }
    Ok((opts, reports))
}

fn print_reports(out: &mut impl Write, reports: &[String]) -> io::Result<()> {
    for report in reports {
        writeln!(out, "{report}")?;
    }
    out.flush()
}

// ─── Commands ───────────────────────────────────────────────────────────────

fn run(args: &Args, console: &mut Console<TtyChannel, io::Stdout>) -> rawline_term::Result<()> {
    if !args.prompt.is_empty() && !matches!(args.command, Command::Catalog) {
        console.write(&args.prompt, args.prompt_color.as_deref(), None, &[])?;
    }

    match &args.command {
        Command::Line { seed } => {
            let line = console.read_line(seed)?;
            console.write_line(&line, None, None, &[])?;
        }
        Command::Lines { seed } => {
            for (i, line) in console.read_lines(seed.as_slice())?.iter().enumerate() {
                console.write_line(&format!("{:>3}: {line}", i + 1), None, None, &["dim"])?;
            }
        }
        Command::Text { seed } => {
            let seed = seed.replace("\\n", "\n");
            let text = console.read_text(&seed)?;
            console.write_line(&text, None, None, &[])?;
        }
        Command::Key => {
            let key = console.read_key()?;
            let name = console.catalog().display_name(key);
            console.write_line(&name, Some("cyan"), None, &["bold"])?;
        }
        Command::Keys => key_diagnostics(console)?,
        Command::Catalog => {
            let catalog = console.catalog();
            let mut out = io::stdout().lock();
            for (sequence, key) in catalog.iter() {
                writeln!(out, "{:<20} {}", escape_bytes(sequence), catalog.display_name(key))?;
            }
            writeln!(out, "{} sequences", catalog.len())?;
        }
    }
    Ok(())
}

/// Print each key's raw bytes, display name, and every other encoding of
/// the same key, until CTRL+C.
fn key_diagnostics(console: &mut Console<TtyChannel, io::Stdout>) -> rawline_term::Result<()> {
    console.write_line("press keys, CTRL+C to stop", None, None, &["dim"])?;
    loop {
        let sequence = console.read_raw_sequence()?;
        let line = match KeyDecoder::new(console.catalog()).resolve(&sequence) {
            Ok(key) => {
                let others: Vec<String> = console
                    .catalog()
                    .sequences_of(key)
                    .into_iter()
                    .filter(|s| *s != sequence.as_slice())
                    .map(escape_bytes)
                    .collect();
                let name = console.catalog().display_name(key);
                if others.is_empty() {
                    format!("{:<16} {name}", escape_bytes(&sequence))
                } else {
                    format!("{:<16} {name}  (also {})", escape_bytes(&sequence), others.join(" "))
                }
            }
            Err(Error::UnknownKey { .. }) => format!("{:<16} ?", escape_bytes(&sequence)),
            Err(err) if err.is_interrupt() => return Ok(()),
            Err(err) => return Err(err),
        };
        console.write_line(&line, None, None, &[])?;
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("rawline: cannot open log file: {e}");
        process::exit(2);
    }

    let (options, reports) = editor_options(&args.set).unwrap_or_else(|e| {
        eprintln!("rawline: {e}");
        process::exit(2);
    });
    // Before the read starts: stderr output mid-read would break the echo.
    let _ = print_reports(&mut io::stderr(), &reports);
    tracing::info!(command = ?args.command, ?options, "rawline starting");

    let mut console = Console::stdio(options);
    match run(&args, &mut console) {
        Ok(()) => {}
        Err(err) if err.is_interrupt() => {
            let _ = console.write_line("", None, None, &[]);
            process::exit(EXIT_INTERRUPTED);
        }
        Err(err) => {
            tracing::error!(%err, "rawline failed");
            eprintln!("rawline: {err}");
            process::exit(1);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
