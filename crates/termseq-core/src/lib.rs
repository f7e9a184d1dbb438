#![forbid(unsafe_code)]

//! Core: capability templates, the capability registry, and keyboard decoding.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use termseq_core::database::BuiltinDatabase;
//! use termseq_core::registry::CapabilityRegistry;
//! use termseq_core::tparm::Param;
//!
//! let registry = CapabilityRegistry::new("xterm-256color", Arc::new(BuiltinDatabase::new()));
//! let cup = registry.resolve("move").unwrap();
//! assert_eq!(cup.render(&[Param::Number(0), Param::Number(0)]).unwrap(), "\x1b[1;1H");
//! ```

pub mod database;
pub mod decoder;
pub mod error;
pub mod keyboard;
pub mod registry;
pub mod sequences;
pub mod termcap;
pub mod tparm;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use database::{BuiltinDatabase, CapabilityDatabase, Profile};
pub use decoder::{ByteSource, DEFAULT_ESC_DELAY, KeyboardDecoder, NoInput, Utf8Decoder};
pub use error::{Error, Result};
pub use keyboard::{KeyCode, KeyEvent, Keymap};
pub use registry::{Binding, CapabilityRegistry, RegistryHost};
pub use sequences::{SequenceMatch, SequenceSet};
pub use termcap::{CapMatch, MatchSpec, ParamMatch, Termcap};
pub use tparm::Param;
