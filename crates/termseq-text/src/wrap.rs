#![forbid(unsafe_code)]

//! Word wrapping measured in printable columns.
//!
//! Lines are filled greedily with whole words. Escape sequences stay glued
//! to the word they style: a sequence directly after whitespace opens the
//! next word, a sequence directly after a word closes it. Words wider than
//! the line are cut between printable units, never inside a sequence or a
//! grapheme cluster.
//!
//! # Example
//! ```
//! use termseq_core::SequenceSet;
//! use termseq_text::wrap::{wrap, WrapOptions};
//!
//! let set = SequenceSet::build(|_| None).unwrap();
//! let lines = wrap("\x1b[1mhello\x1b[m world", &set, &WrapOptions::new(6));
//! assert_eq!(lines, vec!["\x1b[1mhello\x1b[m", "world"]);
//! ```

use termseq_core::SequenceSet;

use crate::split::{Token, split};
use crate::width::{literal_width, printable_width, strip};

/// Options for [`wrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapOptions {
    /// Maximum printable width of each line, indent included.
    pub width: usize,
    /// Prefix of the first line of each paragraph.
    pub initial_indent: String,
    /// Prefix of every following line.
    pub subsequent_indent: String,
    /// Drop whitespace at the edges of wrapped lines.
    pub drop_whitespace: bool,
}

impl WrapOptions {
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            width,
            initial_indent: String::new(),
            subsequent_indent: String::new(),
            drop_whitespace: true,
        }
    }

    #[must_use]
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn initial_indent(mut self, indent: impl Into<String>) -> Self {
        self.initial_indent = indent.into();
        self
    }

    #[must_use]
    pub fn subsequent_indent(mut self, indent: impl Into<String>) -> Self {
        self.subsequent_indent = indent.into();
        self
    }

    #[must_use]
    pub fn drop_whitespace(mut self, drop: bool) -> Self {
        self.drop_whitespace = drop;
        self
    }
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self::new(80)
    }
}

/// A run of words or of whitespace, with the sequences attached to it.
#[derive(Debug, Clone, Copy)]
struct Chunk<'a> {
    text: &'a str,
    space: bool,
}

/// Wrap `text` into lines no wider than `options.width`.
///
/// Hard line breaks are kept; a blank line comes back as an empty string.
/// A zero width disables wrapping.
#[must_use]
pub fn wrap(text: &str, set: &SequenceSet, options: &WrapOptions) -> Vec<String> {
    if options.width == 0 {
        tracing::debug!("wrap width is zero, lines left unwrapped");
        return text.lines().map(str::to_string).collect();
    }
    let mut lines = Vec::new();
    for line in text.lines() {
        if strip(line, set).is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(wrap_line(line, set, options));
    }
    lines
}

fn chunks<'a>(line: &'a str, set: &'a SequenceSet) -> Vec<Chunk<'a>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    // None while the open chunk holds only sequences.
    let mut open: Option<bool> = None;

    for token in split(line, set, None) {
        let is_space = token.is_whitespace();
        let closes = match (token, open) {
            (Token::Sequence { .. }, Some(space)) if !is_space => space,
            (Token::Sequence { .. }, _) if !is_space => false,
            (_, Some(space)) => space != is_space,
            (_, None) => is_space && start < pos,
        };
        if closes {
            chunks.push(Chunk {
                text: &line[start..pos],
                space: open.unwrap_or(false),
            });
            start = pos;
            open = None;
        }
        if is_space || !token.is_sequence() {
            open = Some(is_space);
        }
        pos += token.as_str().len();
    }
    if start < pos {
        chunks.push(Chunk {
            text: &line[start..pos],
            space: open.unwrap_or(false),
        });
    }
    chunks
}

/// Byte offset where `text` must be cut to fit `room` columns. With `force`,
/// at least one printable token is taken along with any sequences before it.
fn cut_point(text: &str, set: &SequenceSet, room: usize, force: bool) -> usize {
    let mut used = 0;
    let mut end = 0;
    let mut printed = false;
    for token in split(text, set, None) {
        let width = match token {
            Token::Sequence { distance, .. } => usize::try_from(distance).unwrap_or(0),
            other => literal_width(other.as_str()),
        };
        if used + width > room {
            if force && !printed {
                end += token.as_str().len();
            }
            break;
        }
        used += width;
        end += token.as_str().len();
        printed |= width > 0 || !token.is_sequence();
    }
    // Sequences closing the word stay with the part that is kept.
    let tail = &text[end..];
    if split(tail, set, None).all(|token| token.is_sequence()) {
        return text.len();
    }
    end
}

fn wrap_line(line: &str, set: &SequenceSet, options: &WrapOptions) -> Vec<String> {
    let mut pending: Vec<Chunk<'_>> = chunks(line, set);
    pending.reverse();
    let mut lines: Vec<String> = Vec::new();

    while !pending.is_empty() {
        let indent = if lines.is_empty() {
            &options.initial_indent
        } else {
            &options.subsequent_indent
        };
        let avail = options
            .width
            .saturating_sub(printable_width(indent, set))
            .max(1);

        if options.drop_whitespace
            && !lines.is_empty()
            && pending.last().is_some_and(|chunk| chunk.space)
        {
            pending.pop();
            continue;
        }

        let mut current: Vec<Chunk<'_>> = Vec::new();
        let mut used = 0;
        while let Some(chunk) = pending.last().copied() {
            let width = printable_width(chunk.text, set);
            if used + width > avail {
                break;
            }
            current.push(chunk);
            used += width;
            pending.pop();
        }

        if let Some(chunk) = pending.last().copied()
            && printable_width(chunk.text, set) > avail
        {
            let end = cut_point(chunk.text, set, avail - used, current.is_empty());
            if end > 0 {
                pending.pop();
                current.push(Chunk {
                    text: &chunk.text[..end],
                    space: chunk.space,
                });
                if end < chunk.text.len() {
                    pending.push(Chunk {
                        text: &chunk.text[end..],
                        space: chunk.space,
                    });
                }
            }
        }

        if options.drop_whitespace && current.last().is_some_and(|chunk| chunk.space) {
            current.pop();
        }
        if !current.is_empty() {
            let mut out = String::from(indent.as_str());
            out.extend(current.iter().map(|chunk| chunk.text));
            lines.push(out);
        }
    }

    tracing::trace!(lines = lines.len(), width = options.width, "wrapped line");
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
