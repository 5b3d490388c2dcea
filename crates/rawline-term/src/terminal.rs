// SPDX-License-Identifier: MIT
//
// Terminal device control — raw mode, byte reads, and size queries.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, poll, read, and the Windows
// console API. These are the platform interfaces for terminal control;
// there is no safe alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// Exactly two implementations live here, selected at build time:
//
//   unix    → termios on stdin: non-canonical, no echo, no ISIG, VMIN=1.
//   windows → console input mode without line/echo/processed input, bytes
//             from the CRT raw character API (`_getch`).
//
// Both hand back a `SavedMode` describing how to undo the switch. Nothing
// else in the crate touches OS state.
//
// The panic hook restores the saved mode before the panic message prints,
// so a crash mid-read never leaves the shell without echo.

use std::io::{self, Write};
use std::sync::{Mutex, Once};
use std::time::Duration;

use crate::ansi;
use crate::error::{Error, Result};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

/// Width used when the terminal cannot be asked.
pub const FALLBACK_WIDTH: u16 = 80;

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

/// Query the visible console window size.
#[cfg(windows)]
#[must_use]
pub fn get_size() -> Option<Size> {
    use windows_sys::Win32::System::Console::{
        CONSOLE_SCREEN_BUFFER_INFO, GetConsoleScreenBufferInfo, GetStdHandle, STD_OUTPUT_HANDLE,
    };

    let mut info: CONSOLE_SCREEN_BUFFER_INFO = unsafe { std::mem::zeroed() };
    let ok = unsafe { GetConsoleScreenBufferInfo(GetStdHandle(STD_OUTPUT_HANDLE), &mut info) };
    if ok == 0 {
        return None;
    }

    let cols = info.srWindow.Right - info.srWindow.Left + 1;
    let rows = info.srWindow.Bottom - info.srWindow.Top + 1;
    match (u16::try_from(cols), u16::try_from(rows)) {
        (Ok(cols), Ok(rows)) if cols > 0 && rows > 0 => Some(Size { cols, rows }),
        _ => None,
    }
}

#[cfg(not(any(unix, windows)))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Column count of the terminal, or [`FALLBACK_WIDTH`] if unknown.
#[must_use]
pub fn line_width() -> u16 {
    get_size().map_or(FALLBACK_WIDTH, |s| s.cols)
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

/// Check whether stdin is an interactive console.
#[cfg(windows)]
#[must_use]
pub fn is_tty() -> bool {
    use windows_sys::Win32::System::Console::{GetConsoleMode, GetStdHandle, STD_INPUT_HANDLE};

    let mut mode = 0;
    unsafe { GetConsoleMode(GetStdHandle(STD_INPUT_HANDLE), &mut mode) != 0 }
}

#[cfg(not(any(unix, windows)))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Saved Mode ─────────────────────────────────────────────────────────────

/// Device state captured before entering raw mode.
#[derive(Clone, Copy)]
pub(crate) enum SavedMode {
    /// Original termios of stdin.
    #[cfg(unix)]
    Termios(libc::termios),
    /// Original console modes of the input and output handles.
    #[cfg(windows)]
    Console { input: u32, output: Option<u32> },
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// Global backup of the saved mode for panic recovery.
///
/// The restore token owns its own copy, but the panic hook can't reach it.
static MODE_BACKUP: Mutex<Option<SavedMode>> = Mutex::new(None);

/// Reset SGR attributes and show the cursor.
fn emergency_restore(w: &mut impl Write) -> io::Result<()> {
    ansi::reset(w)?;
    ansi::cursor_show(w)?;
    w.flush()
}

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = emergency_restore(&mut io::stdout());
            restore_from_backup();
            original(info);
        }));
    });
}

/// Restore the device from the global backup. Best-effort, ignores errors.
fn restore_from_backup() {
    // Release the lock first: `restore_mode` clears the backup itself.
    let saved = MODE_BACKUP.lock().ok().and_then(|mut guard| guard.take());
    if let Some(saved) = saved {
        let _ = restore_mode(&saved);
    }
}

fn remember(saved: SavedMode) {
    if let Ok(mut guard) = MODE_BACKUP.lock() {
        *guard = Some(saved);
    }
}

fn forget() {
    if let Ok(mut guard) = MODE_BACKUP.lock() {
        *guard = None;
    }
}

// ─── Raw Mode (termios) ─────────────────────────────────────────────────────

/// Switch stdin into raw mode and return what to restore.
///
/// # Errors
///
/// [`Error::NotATerminal`] if stdin is not a TTY, [`Error::Io`] if termios
/// calls fail.
#[cfg(unix)]
pub(crate) fn enable_raw_mode() -> Result<SavedMode> {
    if !is_tty() {
        return Err(Error::NotATerminal);
    }

    install_panic_hook();
    let fd = libc::STDIN_FILENO;

    let original = get_termios(fd)?;
    let saved = SavedMode::Termios(original);
    remember(saved);

    if let Err(err) = set_termios(fd, &raw_termios(original)) {
        forget();
        return Err(err.into());
    }

    tracing::debug!("stdin switched to raw mode");
    Ok(saved)
}

/// Put stdin back the way [`enable_raw_mode`] found it.
#[cfg(unix)]
pub(crate) fn restore_mode(saved: &SavedMode) -> io::Result<()> {
    let SavedMode::Termios(original) = saved;
    set_termios(libc::STDIN_FILENO, original)?;
    forget();
    tracing::debug!("stdin mode restored");
    Ok(())
}

#[cfg(unix)]
fn get_termios(fd: libc::c_int) -> io::Result<libc::termios> {
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &raw mut termios) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(termios)
    }
}

/// Apply `termios` right away. Pending input stays queued: raw mode is
/// entered and left around every read, and keys typed in between must
/// still arrive.
#[cfg(unix)]
fn set_termios(fd: libc::c_int, termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// `cfmakeraw` equivalent: no line processing, no echo, no signals.
#[cfg(unix)]
const fn raw_termios(mut termios: libc::termios) -> libc::termios {
    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    // VMIN=1, VTIME=0: read() blocks until at least 1 byte available.
    termios.c_cc[libc::VMIN] = 1;
    termios.c_cc[libc::VTIME] = 0;
    termios
}

/// Block until one byte arrives on stdin.
///
/// Reads fd 0 directly: `io::stdin()` keeps its own buffer, which would
/// hide pending bytes from [`byte_ready`].
#[cfg(unix)]
pub(crate) fn read_byte() -> Result<u8> {
    let mut byte = 0u8;
    loop {
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };
        match n {
            1 => return Ok(byte),
            0 => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err.into());
                }
            }
        }
    }
}

/// Wait up to `timeout` for stdin to become readable.
#[cfg(unix)]
pub(crate) fn byte_ready(timeout: Duration) -> Result<bool> {
    let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
    let mut pfd = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    let ready = unsafe { libc::poll(&raw mut pfd, 1, millis) };
    if ready < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err.into());
    }
    Ok(ready > 0 && pfd.revents & libc::POLLIN != 0)
}

// ─── Raw Mode (Windows console) ─────────────────────────────────────────────

#[cfg(windows)]
unsafe extern "C" {
    fn _getch() -> i32;
    fn _kbhit() -> i32;
}

/// Switch the console into raw character mode and enable VT output.
///
/// # Errors
///
/// [`Error::NotATerminal`] if stdin is not a console, [`Error::Io`] if the
/// mode cannot be changed.
#[cfg(windows)]
pub(crate) fn enable_raw_mode() -> Result<SavedMode> {
    use windows_sys::Win32::System::Console::{
        ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT, ENABLE_PROCESSED_INPUT,
        ENABLE_VIRTUAL_TERMINAL_INPUT, ENABLE_VIRTUAL_TERMINAL_PROCESSING, GetConsoleMode,
        GetStdHandle, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE, SetConsoleMode,
    };

    install_panic_hook();

    let saved = unsafe {
        let input_handle = GetStdHandle(STD_INPUT_HANDLE);
        let mut input = 0;
        if GetConsoleMode(input_handle, &mut input) == 0 {
            return Err(Error::NotATerminal);
        }

        let output_handle = GetStdHandle(STD_OUTPUT_HANDLE);
        let mut output_mode = 0;
        let output = (GetConsoleMode(output_handle, &mut output_mode) != 0).then_some(output_mode);

        let saved = SavedMode::Console { input, output };
        remember(saved);

        let raw = (input & !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT | ENABLE_PROCESSED_INPUT))
            | ENABLE_VIRTUAL_TERMINAL_INPUT;
        if SetConsoleMode(input_handle, raw) == 0 {
            forget();
            return Err(io::Error::last_os_error().into());
        }
        if let Some(mode) = output {
            // Without VT processing the cursor query is never answered.
            let _ = SetConsoleMode(output_handle, mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING);
        }
        saved
    };

    tracing::debug!("console switched to raw mode");
    Ok(saved)
}

/// Put the console modes back.
#[cfg(windows)]
pub(crate) fn restore_mode(saved: &SavedMode) -> io::Result<()> {
    use windows_sys::Win32::System::Console::{
        GetStdHandle, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE, SetConsoleMode,
    };

    let SavedMode::Console { input, output } = *saved;
    unsafe {
        if SetConsoleMode(GetStdHandle(STD_INPUT_HANDLE), input) == 0 {
            return Err(io::Error::last_os_error());
        }
        if let Some(mode) = output {
            let _ = SetConsoleMode(GetStdHandle(STD_OUTPUT_HANDLE), mode);
        }
    }
    forget();
    tracing::debug!("console mode restored");
    Ok(())
}

/// Block until the console delivers one byte.
#[cfg(windows)]
pub(crate) fn read_byte() -> Result<u8> {
    let code = unsafe { _getch() };
    u8::try_from(code).map_err(|_| {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("console returned out-of-range code {code}"),
        ))
    })
}

/// Wait up to `timeout` for a pending console key.
#[cfg(windows)]
pub(crate) fn byte_ready(timeout: Duration) -> Result<bool> {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        if unsafe { _kbhit() } != 0 {
            return Ok(true);
        }
        if std::time::Instant::now() >= deadline {
            return Ok(false);
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

// ─── Other targets ──────────────────────────────────────────────────────────

#[cfg(not(any(unix, windows)))]
pub(crate) fn enable_raw_mode() -> Result<SavedMode> {
    Err(Error::NotATerminal)
}

#[cfg(not(any(unix, windows)))]
pub(crate) fn restore_mode(saved: &SavedMode) -> io::Result<()> {
    match *saved {}
}

#[cfg(not(any(unix, windows)))]
pub(crate) fn read_byte() -> Result<u8> {
    Err(Error::NotATerminal)
}

#[cfg(not(any(unix, windows)))]
pub(crate) fn byte_ready(_timeout: Duration) -> Result<bool> {
    Ok(false)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
