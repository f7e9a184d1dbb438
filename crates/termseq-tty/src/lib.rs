#![forbid(unsafe_code)]
//! Unix tty collaborators for termseq.
//!
//! - [`TtyInput`]: the keyboard byte source (`poll(2)` plus non-buffered
//!   reads) consumed by [`termseq_core::KeyboardDecoder`].
//! - [`window_size`]: the `TIOCGWINSZ` query behind the ambient terminal
//!   size.
//! - [`RawModeGuard`] and [`CbreakGuard`]: scoped termios changes restored
//!   on every exit path.
//!
//! ## Input Modes
//!
//! | Mode    | Line buffering | Echo | Signals (`^C`, `^Z`) | Output processing |
//! |---------|----------------|------|----------------------|-------------------|
//! | cooked  | on             | on   | on                   | on                |
//! | cbreak  | off            | off  | on                   | on                |
//! | raw     | off            | off  | off                  | off               |
//!
//! Non-Unix targets compile, but every source reports itself
//! non-interactive and the guards fail with [`io::ErrorKind::Unsupported`].

use core::time::Duration;
use std::fs::File;
use std::io::{self, IsTerminal, Read};
#[cfg(unix)]
use std::time::Instant;

use termseq_core::ByteSource;

/// Largest read performed per [`ByteSource::read_available`] call.
const READ_CHUNK: usize = 1024;

/// Path of the controlling terminal.
pub const CONTROLLING_TTY: &str = "/dev/tty";

// ── Keyboard Source ──────────────────────────────────────────────────────

/// Keyboard byte source over a file descriptor.
///
/// A read only happens after [`ByteSource::poll`] reported input, so it never
/// blocks on an idle terminal.
#[derive(Debug)]
pub struct TtyInput {
    file: File,
    interactive: bool,
}

impl TtyInput {
    /// Open the controlling terminal for reading.
    pub fn open() -> io::Result<Self> {
        let file = File::options().read(true).open(CONTROLLING_TTY)?;
        let interactive = file.is_terminal();
        tracing::debug!(path = CONTROLLING_TTY, interactive, "keyboard source opened");
        Ok(Self { file, interactive })
    }

    /// Duplicate standard input as the keyboard.
    #[cfg(unix)]
    pub fn stdin() -> io::Result<Self> {
        use std::os::fd::AsFd;
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        let file: File = stdin.as_fd().try_clone_to_owned()?.into();
        tracing::debug!(interactive, "keyboard source attached to stdin");
        Ok(Self { file, interactive })
    }

    /// Wrap an already opened file, such as one end of a socket pair.
    #[must_use]
    pub fn from_file(file: File, interactive: bool) -> Self {
        Self { file, interactive }
    }

    /// The underlying file.
    #[must_use]
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Size of the terminal behind this source, if it is one.
    #[must_use]
    pub fn window_size(&self) -> Option<(u16, u16)> {
        window_size(&self.file)
    }

    /// One `poll(2)` call of at most `u16::MAX` milliseconds. An interrupted
    /// call reports no input.
    #[cfg(unix)]
    fn poll_once(&self, timeout: nix::poll::PollTimeout) -> io::Result<bool> {
        use std::os::fd::AsFd;
        let mut poll_fds = [nix::poll::PollFd::new(
            self.file.as_fd(),
            nix::poll::PollFlags::POLLIN,
        )];
        match nix::poll::poll(&mut poll_fds, timeout) {
            Ok(n) => Ok(n > 0),
            Err(nix::errno::Errno::EINTR) => Ok(false),
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

impl ByteSource for TtyInput {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Signals caught during the wait (`SIGWINCH` on every resize) restart
    /// it. A timed wait still ends at its deadline.
    #[cfg(unix)]
    fn poll(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
        let Some(timeout) = timeout else {
            while !self.poll_once(nix::poll::PollTimeout::NONE)? {
                tracing::trace!("tty wait interrupted");
            }
            return Ok(true);
        };
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let timeout_ms: u16 = remaining
                .as_nanos()
                .div_ceil(1_000_000)
                .try_into()
                .unwrap_or(u16::MAX);
            if self.poll_once(nix::poll::PollTimeout::from(timeout_ms))? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
        }
    }

    #[cfg(not(unix))]
    fn poll(&mut self, _timeout: Option<Duration>) -> io::Result<bool> {
        Ok(false)
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match self.file.read(&mut buf) {
                Ok(n) => {
                    tracing::trace!(bytes = n, "tty read");
                    return Ok(buf[..n].to_vec());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(Vec::new()),
                Err(e) => return Err(e),
            }
        }
    }
}

// ── Window Size ──────────────────────────────────────────────────────────

/// `(columns, rows)` of the terminal behind `fd`.
///
/// `None` when `fd` is not a terminal or reports a zero dimension.
#[cfg(unix)]
pub fn window_size(fd: impl std::os::fd::AsFd) -> Option<(u16, u16)> {
    let ws = rustix::termios::tcgetwinsize(fd).ok()?;
    (ws.ws_col > 0 && ws.ws_row > 0).then_some((ws.ws_col, ws.ws_row))
}

#[cfg(not(unix))]
pub fn window_size<T>(_fd: T) -> Option<(u16, u16)> {
    None
}

/// Window size of the controlling terminal.
#[must_use]
pub fn controlling_window_size() -> Option<(u16, u16)> {
    let tty = File::open(CONTROLLING_TTY).ok()?;
    window_size(&tty)
}

// ── Mode Guards ──────────────────────────────────────────────────────────

/// Saved termios restored when dropped.
#[cfg(unix)]
struct SavedTermios {
    original: nix::sys::termios::Termios,
    tty: File,
}

#[cfg(unix)]
impl SavedTermios {
    fn apply(tty: File, change: impl FnOnce(&mut nix::sys::termios::Termios)) -> io::Result<Self> {
        use nix::sys::termios::{SetArg, tcgetattr, tcsetattr};

        let original = tcgetattr(&tty).map_err(io::Error::other)?;
        let mut changed = original.clone();
        change(&mut changed);
        tcsetattr(&tty, SetArg::TCSAFLUSH, &changed).map_err(io::Error::other)?;
        Ok(Self { original, tty })
    }
}

#[cfg(unix)]
impl Drop for SavedTermios {
    fn drop(&mut self) {
        let _ = nix::sys::termios::tcsetattr(
            &self.tty,
            nix::sys::termios::SetArg::TCSAFLUSH,
            &self.original,
        );
    }
}

#[cfg(unix)]
fn make_raw(termios: &mut nix::sys::termios::Termios) {
    nix::sys::termios::cfmakeraw(termios);
}

#[cfg(unix)]
fn make_cbreak(termios: &mut nix::sys::termios::Termios) {
    use nix::sys::termios::{LocalFlags, SpecialCharacterIndices};

    termios.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
    termios.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
    termios.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
}

macro_rules! mode_guard {
    ($(#[$meta:meta])* $name:ident, $change:path, $mode:literal) => {
        $(#[$meta])*
        pub struct $name {
            #[cfg(unix)]
            _saved: SavedTermios,
        }

        impl $name {
            /// Enter the mode on the controlling terminal.
            pub fn enter() -> io::Result<Self> {
                Self::on(&File::open(CONTROLLING_TTY)?)
            }

            /// Enter the mode on `tty`. Fails when `tty` is not a terminal.
            #[cfg(unix)]
            pub fn on(tty: &File) -> io::Result<Self> {
                let saved = SavedTermios::apply(tty.try_clone()?, $change)?;
                tracing::debug!(mode = $mode, "terminal mode entered");
                Ok(Self { _saved: saved })
            }

            #[cfg(not(unix))]
            pub fn on(_tty: &File) -> io::Result<Self> {
                Err(io::Error::from(io::ErrorKind::Unsupported))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name)).finish_non_exhaustive()
            }
        }
    };
}

mode_guard!(
    /// Raw mode: every byte is delivered as typed, with no signal keys and
    /// no output post-processing. The saved termios returns on drop, panics
    /// included.
    RawModeGuard,
    make_raw,
    "raw"
);

mode_guard!(
    /// Cbreak mode: keys arrive one at a time without echo while `^C` and
    /// `^Z` still raise signals. The saved termios returns on drop.
    CbreakGuard,
    make_cbreak,
    "cbreak"
);
