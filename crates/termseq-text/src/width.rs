#![forbid(unsafe_code)]

//! Measuring, padding, and truncating text that carries escape sequences.
//!
//! Widths follow the terminal's view of the text: sequences occupy no
//! columns except for horizontal cursor motion, which advances (or retreats)
//! by the distance the sequence encodes. A backspace retreats one column and
//! the running width never goes below zero.

use termseq_core::SequenceSet;
use unicode_width::UnicodeWidthStr;

use crate::split::{Token, split};

/// Display width of one literal unit. Control characters take no columns.
#[must_use]
pub fn literal_width(unit: &str) -> usize {
    if unit.chars().any(char::is_control) {
        0
    } else {
        unit.width()
    }
}

/// Farthest a single motion sequence can move the cursor. Terminal
/// coordinates are 16-bit.
pub const MAX_MOTION: i64 = u16::MAX as i64;

/// Horizontal motion of a token, or `None` if it only adds columns.
fn motion(token: &Token<'_>) -> Option<i64> {
    match token {
        Token::Sequence { distance, .. } => Some((*distance).clamp(-MAX_MOTION, MAX_MOTION)),
        Token::Literal("\x08") => Some(-1),
        _ => None,
    }
}

fn advance(width: usize, distance: i64) -> usize {
    let step = usize::try_from(distance.unsigned_abs()).unwrap_or(usize::MAX);
    if distance < 0 {
        width.saturating_sub(step)
    } else {
        width.saturating_add(step)
    }
}

/// Printable column count of `text`.
#[must_use]
pub fn printable_width(text: &str, set: &SequenceSet) -> usize {
    split(text, set, None).fold(0, |width, token| match motion(&token) {
        Some(distance) => advance(width, distance),
        None => width + literal_width(token.as_str()),
    })
}

/// A token of `text` after cursor motion is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Sequence(&'a str),
    Blank(usize),
}

/// Tokens of `text` with cursor motion applied: rightward motion becomes
/// blanks and leftward motion removes previously emitted columns.
fn padded_pieces<'a>(text: &'a str, set: &'a SequenceSet) -> Vec<Piece<'a>> {
    let mut pieces: Vec<Piece<'a>> = Vec::new();
    for token in split(text, set, None) {
        match motion(&token) {
            Some(distance) if distance > 0 => {
                let blanks = usize::try_from(distance).unwrap_or(0);
                match pieces.last_mut() {
                    Some(Piece::Blank(n)) => *n += blanks,
                    _ => pieces.push(Piece::Blank(blanks)),
                }
            }
            Some(distance) if distance < 0 => {
                retreat(&mut pieces, usize::try_from(distance.unsigned_abs()).unwrap_or(0));
            }
            Some(_) => pieces.push(Piece::Sequence(token.as_str())),
            None => pieces.push(Piece::Literal(token.as_str())),
        }
    }
    pieces
}

/// Remove the last `steps` literals or blanks, keeping sequences.
fn retreat(pieces: &mut Vec<Piece<'_>>, mut steps: usize) {
    let mut at = pieces.len();
    while steps > 0 && at > 0 {
        at -= 1;
        let left = match pieces[at] {
            Piece::Sequence(_) => continue,
            Piece::Literal(_) => {
                steps -= 1;
                0
            }
            Piece::Blank(n) => {
                let taken = n.min(steps);
                steps -= taken;
                n - taken
            }
        };
        if left == 0 {
            pieces.remove(at);
        } else {
            pieces[at] = Piece::Blank(left);
        }
    }
}

fn resolve(text: &str, set: &SequenceSet, keep_sequences: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for piece in padded_pieces(text, set) {
        match piece {
            Piece::Literal(literal) => out.push_str(literal),
            Piece::Sequence(seq) if keep_sequences => out.push_str(seq),
            Piece::Sequence(_) => {}
            Piece::Blank(n) => out.extend(std::iter::repeat_n(' ', n)),
        }
    }
    out
}

/// Replace horizontal cursor motion with its visible effect.
///
/// Other sequences are kept in place. A single motion expands to at most
/// [`MAX_MOTION`] blanks.
#[must_use]
pub fn padd(text: &str, set: &SequenceSet) -> String {
    resolve(text, set, true)
}

/// [`padd`], then drop every remaining sequence.
#[must_use]
pub fn strip_seqs(text: &str, set: &SequenceSet) -> String {
    resolve(text, set, false)
}

/// [`strip_seqs`], then trim surrounding whitespace.
#[must_use]
pub fn strip(text: &str, set: &SequenceSet) -> String {
    strip_seqs(text, set).trim().to_string()
}

/// Horizontal alignment for [`pad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// Pad `text` with `fill` to `width` printable columns.
///
/// Text already at least `width` wide is returned unchanged. A wide `fill`
/// never overshoots, so the result may fall one column short.
#[must_use]
pub fn pad(text: &str, set: &SequenceSet, width: usize, fill: char, align: Align) -> String {
    let current = printable_width(text, set);
    if current >= width {
        return text.to_string();
    }
    let fill_width = unicode_width::UnicodeWidthChar::width(fill)
        .unwrap_or(0)
        .max(1);
    let count = (width - current) / fill_width;
    let (left, right) = match align {
        Align::Left => (0, count),
        Align::Right => (count, 0),
        Align::Center => (count / 2, count - count / 2),
    };

    let mut out = String::with_capacity(text.len() + count * fill.len_utf8());
    out.extend(std::iter::repeat_n(fill, left));
    out.push_str(text);
    out.extend(std::iter::repeat_n(fill, right));
    out
}

/// Cut `text` down to at most `width` printable columns.
///
/// Text that already fits is returned unchanged. Otherwise cursor motion is
/// resolved as in [`padd`], literals are kept while they fit, and every
/// non-moving sequence is kept wherever it falls, so trailing resets survive.
/// A wide glyph that would straddle the limit is dropped whole.
#[must_use]
pub fn truncate(text: &str, set: &SequenceSet, width: usize) -> String {
    if printable_width(text, set) <= width {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut used = 0;
    let mut full = false;
    for piece in padded_pieces(text, set) {
        match piece {
            Piece::Sequence(seq) => out.push_str(seq),
            _ if full => {}
            Piece::Blank(n) => {
                let room = width - used;
                out.extend(std::iter::repeat_n(' ', n.min(room)));
                used += n.min(room);
                full = n > room;
            }
            Piece::Literal(literal) => {
                let piece_width = literal_width(literal);
                if used + piece_width <= width {
                    out.push_str(literal);
                    used += piece_width;
                } else {
                    full = true;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use termseq_core::{BuiltinDatabase, CapabilityDatabase};

    const BLUE: &str = "\x1b[34m";
    const NORMAL: &str = "\x1b(B\x1b[m";

    fn xterm() -> SequenceSet {
        let db = BuiltinDatabase::new();
        SequenceSet::build(|cap| db.lookup("xterm-256color", cap)).unwrap()
    }

    fn blue(text: &str) -> String {
        format!("{BLUE}{text}{NORMAL}")
    }

    // =========================================================================
    // printable_width
    // =========================================================================

    #[test]
    fn width_ignores_sgr() {
        let set = xterm();
        assert_eq!(printable_width(&blue("hello"), &set), 5);
        assert_eq!(printable_width("\x1b[38;5;200mX\x1b[m", &set), 1);
    }

    #[test]
    fn width_counts_wide_and_combining() {
        let set = xterm();
        assert_eq!(printable_width("\u{4e2d}\u{6587}", &set), 4);
        assert_eq!(printable_width("e\u{301}", &set), 1);
    }

    #[test]
    fn width_applies_motion() {
        let set = xterm();
        assert_eq!(printable_width("ab\x1b[3Ccd", &set), 7);
        assert_eq!(printable_width("abc\x08", &set), 2);
        assert_eq!(printable_width("a\t", &set), 9);
    }

    #[test]
    fn backspace_clamps_at_zero() {
        let set = xterm();
        assert_eq!(printable_width("\x08\x08ab", &set), 2);
        assert_eq!(printable_width("\x1b[9D", &set), 0);
    }

    #[test]
    fn literal_backspace_without_recognition() {
        let set = SequenceSet::default();
        assert_eq!(printable_width("abc\x08", &set), 2);
    }

    #[test]
    fn control_characters_are_zero_width() {
        let set = xterm();
        assert_eq!(printable_width("one\x01two", &set), 6);
    }

    // =========================================================================
    // padd / strip
    // =========================================================================

    #[test]
    fn padd_resolves_motion() {
        let set = xterm();
        assert_eq!(padd("xyz\x08", &set), "xy");
        assert_eq!(padd("xyz\x08-", &set), "xy-");
        assert_eq!(padd("xxxx\x1b[3Dzz", &set), "xzz");
        assert_eq!(padd("\x1b[3D", &set), "");
        assert_eq!(padd(&blue("xxxx\x1b[3Dzz"), &set), blue("xzz"));
        assert_eq!(padd("a\x1b[2Cb", &set), "a  b");
    }

    #[test]
    fn padd_retreats_over_sequences_and_blanks() {
        let set = xterm();
        assert_eq!(padd("a\x1b[1mb\x08", &set), "a\x1b[1m");
        assert_eq!(padd("a\x1b[4C\x1b[2Db", &set), "a  b");
    }

    #[test]
    fn huge_motion_is_bounded() {
        let set = xterm();
        let far = "ab\x1b[4000000000Ccd";
        let max = usize::try_from(MAX_MOTION).unwrap();
        assert_eq!(printable_width(far, &set), max + 4);
        assert_eq!(truncate(far, &set, 3), "ab ");
        assert_eq!(padd(far, &set).len(), max + 4);
        assert_eq!(strip_seqs("\x1b[4000000000Dx", &set), "x");
        assert_eq!(printable_width("x\x1b[4000000000D", &set), 0);
    }

    #[test]
    fn strip_removes_sequences() {
        let set = xterm();
        assert_eq!(strip_seqs(&blue("  hi  "), &set), "  hi  ");
        assert_eq!(strip(&blue("  hi  "), &set), "hi");
        assert_eq!(strip_seqs("\x1b]8;;http://x\x1b\\link\x1b]8;;\x1b\\", &set), "link");
    }

    // =========================================================================
    // pad
    // =========================================================================

    #[test]
    fn pad_alignments() {
        let set = xterm();
        let text = blue("abc");
        assert_eq!(pad(&text, &set, 7, ' ', Align::Left), format!("{text}    "));
        assert_eq!(pad(&text, &set, 7, '-', Align::Right), format!("----{text}"));
        assert_eq!(pad(&text, &set, 7, '*', Align::Center), format!("**{text}**"));
        assert_eq!(pad("abc", &set, 6, '*', Align::Center), "*abc**");
    }

    #[test]
    fn pad_already_wide_enough() {
        let set = xterm();
        assert_eq!(pad("abcdef", &set, 3, ' ', Align::Left), "abcdef");
    }

    #[test]
    fn pad_with_wide_fill() {
        let set = xterm();
        assert_eq!(pad("a", &set, 6, '\u{4e2d}', Align::Left), "a\u{4e2d}\u{4e2d}");
    }

    // =========================================================================
    // truncate
    // =========================================================================

    #[test]
    fn truncate_wide_end() {
        let set = xterm();
        assert_eq!(truncate("AB\u{ff23}", &set, 3), "AB");
    }

    #[test]
    fn truncate_keeps_zero_width_controls() {
        let set = xterm();
        assert_eq!(truncate("", &set, 4), "");
        assert_eq!(truncate(&blue("one\x01two"), &set, 4), blue("one\x01t"));
    }

    #[test]
    fn truncate_expands_motion() {
        let set = xterm();
        let text = blue("one\x1b[5Ctwo");
        assert_eq!(truncate(&text, &set, 9), blue("one     t"));
        assert_eq!(truncate(&text, &set, 6), blue("one   "));
    }

    #[test]
    fn truncate_resolves_backspaces_when_cutting() {
        let set = xterm();
        assert_eq!(truncate(&blue("one\x08\x08\x08twox"), &set, 3), blue("two"));
    }

    #[test]
    fn truncate_keeps_trailing_sequences() {
        let set = xterm();
        let text = format!("\x1b[31mTesting \x1b[33mgood{NORMAL}");
        assert_eq!(
            truncate(&text, &set, 8),
            format!("\x1b[31mTesting \x1b[33m{NORMAL}")
        );
    }

    #[test]
    fn truncate_agrees_with_width() {
        let set = xterm();
        let text = format!("\x1b[31mTesting \x1b[33mmakes \x1b[32mme{NORMAL}");
        let plain = strip_seqs(&text, &set);
        for n in 0..plain.len() {
            assert_eq!(printable_width(&truncate(&text, &set, n), &set), n);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use termseq_core::{BuiltinDatabase, CapabilityDatabase};

    fn set() -> SequenceSet {
        let db = BuiltinDatabase::new();
        SequenceSet::build(|cap| db.lookup("xterm-256color", cap)).unwrap()
    }

    proptest! {
        #[test]
        fn plain_width_is_sum_of_char_widths(text in "[a-zA-Z0-9 \u{4e00}-\u{4e10}\u{ff21}-\u{ff3a}]{0,40}") {
            let expected: usize = text
                .chars()
                .map(|c| unicode_width::UnicodeWidthChar::width(c).unwrap_or(0))
                .sum();
            prop_assert_eq!(printable_width(&text, &set()), expected);
        }

        #[test]
        fn pad_is_idempotent(text in "[a-z\u{4e00}-\u{4e10}]{0,12}", width in 0usize..30, center in any::<bool>()) {
            let set = set();
            let align = if center { Align::Center } else { Align::Right };
            let once = pad(&text, &set, width, '\u{3000}', align);
            prop_assert_eq!(pad(&once, &set, width, '\u{3000}', align), once);
        }
    }
}
