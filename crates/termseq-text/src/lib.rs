#![forbid(unsafe_code)]

//! Text operations that treat escape sequences as atomic units.
//!
//! Every function takes the terminal's [`SequenceSet`] so that sequences the
//! program did not produce itself are still recognized and preserved:
//! - [`split`] - tokenize into sequences and printable units
//! - [`printable_width`] - column count, honoring cursor motion
//! - [`pad`] - align within a width
//! - [`truncate`] - cut to a width without breaking sequences or glyphs
//! - [`wrap`] - word wrap by printable width
//!
//! # Example
//! ```
//! use termseq_core::SequenceSet;
//! use termseq_text::{printable_width, truncate};
//!
//! let set = SequenceSet::build(|_| None).unwrap();
//! let styled = "\x1b[1mbold\x1b[m text";
//! assert_eq!(printable_width(styled, &set), 9);
//! assert_eq!(truncate(styled, &set, 2), "\x1b[1mbo\x1b[m");
//! ```

pub mod split;
pub mod width;
pub mod wrap;

pub use split::{Split, Token, split};
pub use termseq_core::SequenceSet;
pub use width::{Align, literal_width, pad, padd, printable_width, strip, strip_seqs, truncate};
pub use wrap::{WrapOptions, wrap};
