#![forbid(unsafe_code)]

//! Tokenizing text into escape sequences and printable units.
//!
//! At every offset the longest recognized sequence wins; otherwise the next
//! grapheme cluster is emitted as one literal. A cluster containing a control
//! character is split to its first `char` so that a stray control byte never
//! glues itself to the text around it.
//!
//! # Example
//! ```
//! use termseq_core::SequenceSet;
//! use termseq_text::split::{split, Token};
//!
//! let set = SequenceSet::build(|_| None).unwrap();
//! let tokens: Vec<_> = split("\x1b[1mhi", &set, None).map(|t| t.as_str()).collect();
//! assert_eq!(tokens, vec!["\x1b[1m", "h", "i"]);
//! ```

use termseq_core::SequenceSet;
use unicode_segmentation::UnicodeSegmentation;

/// One unit of tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A recognized escape sequence and the horizontal cursor movement it
    /// causes.
    Sequence { text: &'a str, distance: i64 },
    /// A single printable unit (one grapheme, or one control `char`).
    Literal(&'a str),
    /// Undecomposed remainder after the split limit was reached.
    Rest(&'a str),
}

impl<'a> Token<'a> {
    /// The original text of this token.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Sequence { text, .. } | Self::Literal(text) | Self::Rest(text) => text,
        }
    }

    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence { .. })
    }

    /// True for a literal made only of whitespace.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        match self {
            Self::Literal(text) => text.chars().all(char::is_whitespace),
            Self::Sequence { text, .. } => *text == "\t",
            Self::Rest(_) => false,
        }
    }
}

/// Lazy left-to-right tokenizer returned by [`split`].
#[derive(Debug, Clone)]
pub struct Split<'a> {
    set: &'a SequenceSet,
    rest: &'a str,
    splits_left: Option<usize>,
}

/// Tokenize `text` against a terminal's recognition set.
///
/// With `max_splits = Some(n)`, at most `n` tokens are produced by
/// tokenizing, then whatever remains is yielded as one [`Token::Rest`].
/// Concatenating every token's text reproduces `text` exactly.
pub fn split<'a>(text: &'a str, set: &'a SequenceSet, max_splits: Option<usize>) -> Split<'a> {
    Split {
        set,
        rest: text,
        splits_left: max_splits,
    }
}

impl<'a> Iterator for Split<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        if self.splits_left == Some(0) {
            let rest = std::mem::take(&mut self.rest);
            return Some(Token::Rest(rest));
        }
        if let Some(left) = self.splits_left.as_mut() {
            *left -= 1;
        }

        let rest = self.rest;
        let token = match self.set.match_at(rest) {
            Some(found) => Token::Sequence {
                text: found.text,
                distance: found.horizontal_distance(),
            },
            None => Token::Literal(&rest[..literal_len(rest)]),
        };
        self.rest = &rest[token.as_str().len()..];
        Some(token)
    }
}

/// Byte length of the literal unit at the start of non-empty `text`.
fn literal_len(text: &str) -> usize {
    let first = text.chars().next().map_or(0, char::len_utf8);
    match text.graphemes(true).next() {
        Some(grapheme) if !grapheme.chars().any(char::is_control) => grapheme.len(),
        _ => first,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use termseq_core::{BuiltinDatabase, CapabilityDatabase};

    fn styled_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                "[a-z ]{0,6}",
                Just("\x1b[1m".to_string()),
                Just("\x1b(B\x1b[m".to_string()),
                Just("\x1b[38;5;12m".to_string()),
                Just("\x1b[".to_string()),
                Just("\u{4e2d}".to_string()),
                Just("e\u{301}".to_string()),
                Just("\x08".to_string()),
            ],
            0..12,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn tokens_reconstruct_input(text in styled_text(), limit in prop::option::of(0usize..8)) {
            let db = BuiltinDatabase::new();
            let set = SequenceSet::build(|cap| db.lookup("xterm-256color", cap)).unwrap();
            let rebuilt: String = split(&text, &set, limit).map(|t| t.as_str()).collect();
            prop_assert_eq!(rebuilt, text);
        }

        #[test]
        fn limit_bounds_token_count(text in styled_text(), limit in 0usize..8) {
            let set = SequenceSet::default();
            prop_assert!(split(&text, &set, Some(limit)).count() <= limit + 1);
        }
    }
}
