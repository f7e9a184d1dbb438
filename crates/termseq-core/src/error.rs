#![forbid(unsafe_code)]

//! Error taxonomy for capability resolution and keyboard input.
//!
//! Only caller bugs and I/O failures surface here. Missing capabilities,
//! partially received multi-byte input, and non-interactive streams are
//! absorbed by the components that encounter them.

use std::fmt;
use std::io;

/// Errors produced while resolving capabilities or reading keyboard input.
#[derive(Debug)]
pub enum Error {
    /// The name is not a capability, sugar name, color mnemonic, or a
    /// valid compound of those.
    UnknownCapability {
        /// The offending attribute name.
        name: String,
    },
    /// A parameterized capability was invoked with the wrong number of
    /// numeric arguments.
    ParameterMismatch {
        /// Capability (or attribute) name.
        name: String,
        /// Number of parameters the template accepts.
        expected: usize,
        /// Number of parameters supplied.
        got: usize,
    },
    /// A capability template could not be expanded.
    Template {
        /// Capability name.
        name: String,
        /// Description of the malformed construct.
        message: String,
    },
    /// A matcher pattern failed to compile.
    Pattern {
        /// Capability name.
        name: String,
        /// Compiler diagnostic.
        message: String,
    },
    /// I/O failure on the keyboard stream.
    Io(io::Error),
}

impl Error {
    /// Shorthand for [`Error::UnknownCapability`].
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownCapability { name: name.into() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCapability { name } => {
                write!(f, "unknown terminal capability, {name:?}")
            }
            Self::ParameterMismatch {
                name,
                expected,
                got,
            } => write!(
                f,
                "capability {name:?} takes {expected} parameter(s), received {got}"
            ),
            Self::Template { name, message } => {
                write!(f, "invalid template for {name:?}: {message}")
            }
            Self::Pattern { name, message } => {
                write!(f, "invalid matcher for {name:?}: {message}")
            }
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Standard result type for termseq APIs.
pub type Result<T> = std::result::Result<T, Error>;
