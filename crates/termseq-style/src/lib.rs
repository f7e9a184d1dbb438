#![forbid(unsafe_code)]

//! Style names resolved into formatting values.
//!
//! - [`FormatterResolver`] - turns `"bold"`, `"on_bright_red"`, or
//!   `"bold_underline_green"` into a [`Formatter`], caching by name
//! - [`Formatter`] - a fixed, parameterized, compound, or null style that can
//!   wrap text
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use termseq_core::{BuiltinDatabase, CapabilityRegistry};
//! use termseq_style::FormatterResolver;
//!
//! let registry = CapabilityRegistry::new("xterm-256color", Arc::new(BuiltinDatabase::new()));
//! let styles = FormatterResolver::new(Arc::new(registry), true);
//!
//! let bold_red = styles.resolve("bold_red").unwrap();
//! assert_eq!(bold_red.paint(["alert"]).unwrap(), "\x1b[1m\x1b[31malert\x1b(B\x1b[m");
//! ```

pub mod cache;
pub mod color;
pub mod formatter;
pub mod resolve;

pub use cache::FormatterCache;
pub use color::{BaseColor, ColorName};
pub use formatter::Formatter;
pub use resolve::{COMPOUNDABLES, FormatterResolver, split_compound};
