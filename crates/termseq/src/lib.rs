#![forbid(unsafe_code)]

//! termseq public facade crate.
//!
//! A [`Terminal`] binds one terminal kind's capabilities and offers styling,
//! sequence-aware text measurement and layout, keyboard decoding, and
//! scoped output modes. The component crates are re-exported for callers
//! who need the lower-level pieces.
//!
//! ```
//! use termseq::prelude::*;
//! use termseq::core::{BuiltinDatabase, RegistryHost};
//!
//! let host = RegistryHost::new(BuiltinDatabase::new());
//! let env = TerminalEnv::from_values(Some("xterm-256color"), Some(40), Some(10));
//! let options = TerminalOptions::new()
//!     .force_styling()
//!     .with_tty(false)
//!     .with_keyboard(false);
//! let term = Terminal::with_host(&host, env, options).unwrap();
//!
//! let warning = term.paint("bold_red", ["careful"]).unwrap();
//! assert_eq!(term.length(&warning), 7);
//! assert_eq!(term.length(&term.center(&warning, None, ' ')), 40);
//! assert_eq!(term.strip_seqs(&warning), "careful");
//! ```

use std::fmt;

mod guard;
mod options;
mod terminal;

// --- Re-exports ------------------------------------------------------------

pub use guard::OutputGuard;
pub use options::{FALLBACK_KIND, FALLBACK_SIZE, StylingPolicy, TerminalEnv, TerminalOptions};
pub use terminal::Terminal;

pub use termseq_core::{KeyCode, KeyEvent};
pub use termseq_style::Formatter;
pub use termseq_text::{Align, Token, WrapOptions};
pub use termseq_tty::{CbreakGuard, RawModeGuard};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for termseq.
#[derive(Debug)]
pub enum Error {
    /// Capability or formatting failure: an unknown name or wrong
    /// parameters.
    Capability(termseq_core::Error),
    /// I/O failure on the keyboard or output stream.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capability(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Capability(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<termseq_core::Error> for Error {
    fn from(err: termseq_core::Error) -> Self {
        match err {
            termseq_core::Error::Io(err) => Self::Io(err),
            other => Self::Capability(other),
        }
    }
}

/// Standard result type for termseq APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Align, Error, Formatter, KeyCode, KeyEvent, OutputGuard, Result, StylingPolicy, Terminal,
        TerminalEnv, TerminalOptions, WrapOptions,
    };

    pub use crate::{core, style, text, tty};
}

pub use termseq_core as core;
pub use termseq_style as style;
pub use termseq_text as text;
pub use termseq_tty as tty;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_io_errors_become_io() {
        let err: Error = termseq_core::Error::Io(std::io::Error::other("gone")).into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn capability_errors_keep_their_name() {
        let err: Error = termseq_core::Error::unknown("boldly").into();
        assert!(matches!(
            err,
            Error::Capability(termseq_core::Error::UnknownCapability { ref name }) if name == "boldly"
        ));
        assert_eq!(err.to_string(), "unknown terminal capability, \"boldly\"");
    }
}
